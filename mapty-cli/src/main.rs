//mapty-cli/src/main.rs
mod cli;

use anyhow::{bail, Context, Result};
use chrono::Local;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use log::debug;
use std::io::{self, stdin, stdout, Write};

use mapty_lib::{
    AppService, ConfiguredLocation, Geolocator, KindParams, RawFields, SortOrder, Workout,
    WorkoutKind,
};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli_args = cli::parse_args();
    let export_csv = cli_args.export_csv;

    if let cli::Commands::GenerateCompletion { shell } = cli_args.command {
        let mut cmd = cli::build_cli_command();
        let bin_name = cmd.get_name().to_string();

        eprintln!("Generating completion script for {shell}...");
        clap_complete::generate(shell, &mut cmd, bin_name, &mut stdout());
        return Ok(());
    }

    let mut service =
        AppService::initialize().context("Failed to initialize application service")?;
    // Problems with the saved data are reported but do not stop the command
    while let Some(notice) = service.view.take_notice() {
        eprintln!("Warning: {notice}");
    }

    match cli_args.command {
        cli::Commands::GenerateCompletion { .. } => {
            unreachable!("Completion generation should have exited already");
        }
        cli::Commands::Add {
            at,
            kind,
            distance,
            duration,
            cadence,
            elevation,
            from,
        } => {
            let fix = match from {
                Some(position) => Ok(position),
                None => ConfiguredLocation::from_config(&service.config).current_position(),
            };
            if let Err(e) = service.locate(fix) {
                bail!("{e}");
            }
            if !service.map_click(at) {
                bail!("The map is not ready, cannot place a workout at {at}.");
            }

            let kind = WorkoutKind::from(kind);
            service.toggle_kind(kind);
            let raw = RawFields {
                kind,
                distance,
                duration,
                cadence: cadence.unwrap_or_default(),
                elevation: elevation.unwrap_or_default(),
            };
            debug!("Submitting {raw:?}");

            match service.submit_form(&raw) {
                Ok(workout) => println!(
                    "Added {} {} at {} (ID: {}): {}",
                    workout.kind().icon(),
                    workout.label(),
                    workout.coords(),
                    workout.id(),
                    format_metric(&workout),
                ),
                Err(e) => bail!("Error adding workout: {e}"),
            }
        }
        cli::Commands::List { sort } => {
            let order = sort.map_or(service.config.default_sort, SortOrder::from);
            service.set_sort(order);
            let workouts = service.sorted_workouts();

            if workouts.is_empty() {
                println!("No workouts logged yet.");
            } else if export_csv {
                print_workout_csv(&workouts)?;
            } else {
                let header_color = mapty_lib::parse_color(&service.config.theme.header_color)
                    .map(Color::from)
                    .unwrap_or(Color::Green); // Fallback
                print_workout_table(&workouts, header_color);
                println!("Sorted by: {}", order.label());
            }
        }
        cli::Commands::Delete { id } => match service.delete_workout(id) {
            Ok(Some(workout)) => println!("Deleted {} (ID: {id}).", workout.label()),
            Ok(None) => bail!("Workout with ID {id} not found."),
            Err(e) => bail!("Error deleting workout {id}: {e}"),
        },
        cli::Commands::Clear { yes } => {
            let count = service.store.len();
            if count == 0 {
                println!("Nothing to delete.");
            } else if yes || confirm(&format!("Delete all {count} workout(s)? [y/N] "))? {
                match service.delete_all() {
                    Ok(removed) => println!("Deleted {removed} workout(s)."),
                    Err(e) => bail!("Error deleting workouts: {e}"),
                }
            } else {
                println!("Cancelled.");
            }
        }
        cli::Commands::Bounds => match service.store.bounds() {
            Some(bounds) => {
                println!("South-west: {}", bounds.south_west);
                println!("North-east: {}", bounds.north_east);
                println!("Center:     {}", bounds.center());
            }
            None => println!("No workouts logged yet."),
        },
        // --- Config/Path Commands ---
        cli::Commands::SetHome { location, clear } => {
            let home = if clear { None } else { location };
            match service.set_home_location(home) {
                Ok(()) => match home {
                    Some(home) => println!("Home location set to {home}. Config updated."),
                    None => println!("Home location cleared. Config updated."),
                },
                Err(e) => bail!("Error setting home location: {e}"),
            }
        }
        cli::Commands::SetZoom { level } => match service.set_zoom_level(level) {
            Ok(()) => println!("Set map zoom level to {level}. Config updated."),
            Err(e) => bail!("Error setting zoom level: {e}"),
        },
        cli::Commands::SetFocusRadius { meters } => match service.set_focus_radius(meters) {
            Ok(()) => println!("Set focus radius to {meters} m. Config updated."),
            Err(e) => bail!("Error setting focus radius: {e}"),
        },
        cli::Commands::SetRoute { enabled } => match service.set_show_route(enabled) {
            Ok(()) => println!(
                "Route line {}. Config updated.",
                if enabled { "enabled" } else { "disabled" }
            ),
            Err(e) => bail!("Error updating route setting: {e}"),
        },
        cli::Commands::SetDefaultSort { order } => {
            let order = SortOrder::from(order);
            match service.set_default_sort(order) {
                Ok(()) => println!("Default sort set to '{}'. Config updated.", order.label()),
                Err(e) => bail!("Error setting default sort: {e}"),
            }
        }
        cli::Commands::SetHeaderColor { color } => match service.set_header_color(&color) {
            Ok(()) => println!(
                "Header colour set to {}. Config updated.",
                service.config.theme.header_color
            ),
            Err(e) => bail!("Error setting header colour: {e}"),
        },
        cli::Commands::DbPath => {
            println!("Database file is located at: {:?}", service.get_db_path());
        }
        cli::Commands::ConfigPath => {
            println!("Config file is located at: {:?}", service.get_config_path());
        }
    }

    Ok(())
}

// --- CLI Specific Helper Functions ---

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt}");
    stdout().flush()?;

    let mut input = String::new();
    stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

fn format_metric(workout: &Workout) -> String {
    let metric = workout.metric();
    format!("{:.1} {}", metric.value(), metric.unit())
}

/// Cadence or elevation gain, with its unit.
fn format_kind_value(params: KindParams) -> String {
    let field = params.kind().field();
    format!("{} {}", params.value(), field.unit())
}

fn print_workout_table(workouts: &[Workout], header_color: Color) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").fg(header_color),
            Cell::new("Workout").fg(header_color),
            Cell::new("Logged (Local)").fg(header_color),
            Cell::new("Location").fg(header_color),
            Cell::new("Distance (km)").fg(header_color),
            Cell::new("Duration (min)").fg(header_color),
            Cell::new("Pace / Speed").fg(header_color),
            Cell::new("Cadence / Elevation").fg(header_color),
        ]);

    for workout in workouts {
        table.add_row(vec![
            Cell::new(workout.id().to_string()),
            Cell::new(format!("{} {}", workout.kind().icon(), workout.label())),
            Cell::new(
                workout
                    .created_at()
                    .with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M")
                    .to_string(),
            ),
            Cell::new(workout.coords().to_string()),
            Cell::new(format!("{:.2}", workout.distance_km())),
            Cell::new(workout.duration_min().to_string()),
            Cell::new(format_metric(workout)),
            Cell::new(format_kind_value(workout.params())),
        ]);
    }
    println!("{table}");
}

fn print_workout_csv(workouts: &[Workout]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(io::stdout());

    writer.write_record([
        "ID",
        "Timestamp_Local",
        "Type",
        "Latitude",
        "Longitude",
        "Distance_km",
        "Duration_min",
        "Pace_min_per_km",
        "Speed_km_per_h",
        "Cadence_spm",
        "Elevation_gain_m",
    ])?;

    for workout in workouts {
        let (pace, speed) = match workout.metric() {
            mapty_lib::Metric::Pace(v) => (format!("{v:.2}"), String::new()),
            mapty_lib::Metric::Speed(v) => (String::new(), format!("{v:.2}")),
        };
        let (cadence, elevation) = match workout.params() {
            KindParams::Running { cadence } => (cadence.to_string(), String::new()),
            KindParams::Cycling { elevation_gain } => (String::new(), elevation_gain.to_string()),
        };
        writer.write_record([
            workout.id().to_string(),
            workout.created_at().with_timezone(&Local).to_rfc3339(),
            workout.kind().to_string(),
            workout.coords().lat.to_string(),
            workout.coords().lng.to_string(),
            workout.distance_km().to_string(),
            workout.duration_min().to_string(),
            pace,
            speed,
            cadence,
            elevation,
        ])?;
    }

    writer.flush()?;
    Ok(())
}

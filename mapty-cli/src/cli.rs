// mapty-cli/src/cli.rs
use clap::{ArgAction, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use mapty_lib::{Coordinates, SortOrder, WorkoutId, WorkoutKind};

#[derive(Parser, Debug)]
#[command(author, version, about = "Log runs and rides at the spot on the map where they happened", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Print tables as CSV instead
    #[arg(long, global = true)]
    pub export_csv: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkoutKindCli {
    Running,
    Cycling,
}

impl From<WorkoutKindCli> for WorkoutKind {
    fn from(value: WorkoutKindCli) -> Self {
        match value {
            WorkoutKindCli::Running => Self::Running,
            WorkoutKindCli::Cycling => Self::Cycling,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortCli {
    /// Insertion order
    Default,
    /// Lowest distance first
    DistanceAsc,
    /// Highest distance first
    DistanceDesc,
}

impl From<SortCli> for SortOrder {
    fn from(value: SortCli) -> Self {
        match value {
            SortCli::Default => Self::Default,
            SortCli::DistanceAsc => Self::DistanceAsc,
            SortCli::DistanceDesc => Self::DistanceDesc,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log a workout at a point on the map
    Add {
        /// Where the workout happened, as "LAT,LNG"
        #[arg(short, long, allow_hyphen_values = true)]
        at: Coordinates,

        /// Kind of workout
        #[arg(short = 't', long = "type", value_enum, default_value_t = WorkoutKindCli::Running)]
        kind: WorkoutKindCli,

        /// Distance in km
        #[arg(short, long, allow_hyphen_values = true)]
        distance: String,

        /// Duration in minutes
        #[arg(short = 'm', long, allow_hyphen_values = true)]
        duration: String,

        /// Cadence in steps per minute (running)
        #[arg(short, long, allow_hyphen_values = true)]
        cadence: Option<String>,

        /// Elevation gain in meters (cycling)
        #[arg(short, long, allow_hyphen_values = true)]
        elevation: Option<String>,

        /// Your current position as "LAT,LNG". Defaults to MAPTY_LOCATION or the configured home
        #[arg(long, allow_hyphen_values = true)]
        from: Option<Coordinates>,
    },
    /// List logged workouts
    List {
        /// Order of the rows. Defaults to the configured sort
        #[arg(short, long, value_enum)]
        sort: Option<SortCli>,
    },
    /// Delete one workout by ID
    Delete { id: WorkoutId },
    /// Delete every workout
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Print the box that contains every workout
    Bounds,
    /// Set the position used when no live fix is available
    SetHome {
        /// "LAT,LNG"
        #[arg(allow_hyphen_values = true, required_unless_present = "clear")]
        location: Option<Coordinates>,
        /// Remove the home location
        #[arg(long, conflicts_with = "location")]
        clear: bool,
    },
    /// Set the zoom level used when centring the map (1-18)
    SetZoom { level: u8 },
    /// Set the radius of the highlight around the selected workout, in meters
    SetFocusRadius { meters: f64 },
    /// Draw a line from your position to the selected workout
    SetRoute {
        #[arg(action = ArgAction::Set)]
        enabled: bool,
    },
    /// Set the sort order the list starts with
    SetDefaultSort {
        #[arg(value_enum)]
        order: SortCli,
    },
    /// Set the table header colour (e.g. "Green", "DarkCyan")
    SetHeaderColor { color: String },
    /// Show the path to the config file
    ConfigPath,
    /// Show the path to the database file
    DbPath,
    /// Generate shell completion scripts
    GenerateCompletion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_add_with_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "mapty", "add", "--at", "-33.86,151.2", "-t", "cycling", "-d", "20", "-m", "60", "-e",
            "120",
        ])
        .unwrap();
        match cli.command {
            Commands::Add {
                at,
                kind,
                elevation,
                cadence,
                ..
            } => {
                assert_eq!(at, Coordinates::new(-33.86, 151.2));
                assert_eq!(kind, WorkoutKindCli::Cycling);
                assert_eq!(elevation.as_deref(), Some("120"));
                assert!(cadence.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn export_csv_is_global() {
        let cli = Cli::try_parse_from(["mapty", "list", "--sort", "distance-desc", "--export-csv"])
            .unwrap();
        assert!(cli.export_csv);
        assert!(matches!(
            cli.command,
            Commands::List {
                sort: Some(SortCli::DistanceDesc)
            }
        ));
    }
}

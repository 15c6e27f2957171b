// mapty-tui/src/ui/sidebar.rs
use super::kind_color;
use crate::app::{App, FormField, Pane};
use mapty_lib::{Controls, KindParams, Workout};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

const FORM_HEIGHT: u16 = 7;

pub fn render_sidebar(f: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default().title(" Mapty ").borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let form_height = if app.form_is_open() { FORM_HEIGHT } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(form_height),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(inner);

    if app.form_is_open() {
        render_form(f, app, chunks[0]);
    }
    render_workout_list(f, app, chunks[1]);
    render_controls(f, app, chunks[2]);
}

fn focused(field: FormField, app: &App) -> Style {
    if app.form_field == field {
        Style::default().reversed()
    } else {
        Style::default()
    }
}

fn render_form(f: &mut Frame, app: &App, area: Rect) {
    let kind = app.draft.kind;
    let kind_field = kind.field();
    let location = app
        .service
        .view
        .form
        .map(|form| form.location.to_string())
        .unwrap_or_default();

    let text_row = |label: String, value: &str, unit: &str, field: FormField| {
        Line::from(vec![
            Span::raw(format!("{label:<16}")),
            Span::styled(format!("{value:<8}"), focused(field, app)),
            Span::raw(format!(" {unit}")),
        ])
    };

    let lines = vec![
        Line::from(Span::styled(
            format!("New workout at {location}"),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::raw(format!("{:<16}", "Type")),
            Span::styled(
                format!("< {} >", kind.title()),
                focused(FormField::Kind, app).fg(kind_color(kind)),
            ),
        ]),
        text_row(
            "Distance".to_string(),
            &app.draft.distance,
            mapty_lib::Field::Distance.unit(),
            FormField::Distance,
        ),
        text_row(
            "Duration".to_string(),
            &app.draft.duration,
            mapty_lib::Field::Duration.unit(),
            FormField::Duration,
        ),
        text_row(
            kind_field.to_string(),
            app.draft.text(kind_field),
            kind_field.unit(),
            FormField::KindValue,
        ),
        Line::from(vec![
            Span::styled(" OK ", focused(FormField::Confirm, app)),
            Span::raw("   "),
            Span::styled(" Cancel ", focused(FormField::Cancel, app)),
        ]),
    ];

    f.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::BOTTOM)),
        area,
    );
}

fn workout_item(workout: &Workout) -> ListItem<'static> {
    let color = kind_color(workout.kind());
    let metric = workout.metric();
    let (kind_value, kind_unit) = match workout.params() {
        KindParams::Running { cadence } => (cadence, "spm"),
        KindParams::Cycling { elevation_gain } => (elevation_gain, "m"),
    };
    let title = Line::from(vec![
        Span::raw("▌").fg(color),
        Span::styled(
            workout.label().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ]);
    let details = Line::from(format!(
        " {} {} km  ⏱ {} min  ⚡️ {:.1} {}  {} {}",
        workout.kind().icon(),
        workout.distance_km(),
        workout.duration_min(),
        metric.value(),
        metric.unit(),
        kind_value,
        kind_unit,
    ));
    ListItem::new(vec![title, details])
}

fn render_workout_list(f: &mut Frame, app: &mut App, area: Rect) {
    let scene = &app.service.view;
    let title = format!(" Workouts ({}) ", app.service.sort.label());
    let border_style = if app.pane == Pane::List && !app.form_is_open() {
        Style::new().yellow()
    } else {
        Style::new()
    };

    let items: Vec<ListItem> = if scene.list.is_empty() {
        vec![ListItem::new("Click on the map to log a workout")
            .style(Style::default().add_modifier(Modifier::ITALIC))]
    } else {
        scene.list.iter().map(workout_item).collect()
    };

    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::TOP)
                .border_style(border_style),
        )
        .highlight_style(Style::default().reversed());

    f.render_stateful_widget(list, area, &mut app.list_state);
}

fn control(key: &str, label: &str, enabled: bool) -> Span<'static> {
    let text = format!("[{key}] {label} ");
    if enabled {
        Span::raw(text)
    } else {
        Span::raw(text).dim()
    }
}

fn render_controls(f: &mut Frame, app: &App, area: Rect) {
    let Controls {
        delete_current,
        delete_all,
        show_all,
        recenter,
    } = app.service.view.controls;
    let route = if app.service.config.show_route { "on" } else { "off" };

    let lines = vec![
        Line::from(vec![
            control("d", "Delete", delete_current),
            control("D", "Delete all", delete_all),
        ]),
        Line::from(vec![
            control("a", "Show all", show_all),
            control("u", "Recenter", recenter),
            control("s", "Sort", !app.service.view.list.is_empty()),
            control("r", &format!("Route {route}"), true),
        ]),
    ];
    f.render_widget(Paragraph::new(lines), area);
}

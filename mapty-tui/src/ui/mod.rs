mod layout;
mod map;
mod modals;
mod sidebar;
mod status_bar;

pub use layout::render_ui;

use mapty_lib::WorkoutKind;
use ratatui::style::Color;

// Marker and list accent for each kind
const fn kind_color(kind: WorkoutKind) -> Color {
    match kind {
        WorkoutKind::Running => Color::Green,
        WorkoutKind::Cycling => Color::Rgb(255, 165, 0),
    }
}

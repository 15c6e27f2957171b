// mapty-tui/src/ui/status_bar.rs
use crate::app::{ActiveModal, App, Pane};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

pub fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let status_text = match app.active_modal {
        ActiveModal::None if app.form_is_open() => {
            " [Tab/↑↓] Field | [Space] Type | [Enter] Save | [Esc] Close "
        }
        ActiveModal::None => match app.pane {
            Pane::Map => " [hjkl] Move | [+/-] Zoom | [Enter] Log/Select | [Tab] List | [a]ll | [u] Me | [?] Help | [q]uit ",
            Pane::List => " [↑↓/jk] Nav | [Enter] Select | [d]elete | [s]ort | [Tab] Map | [?] Help | [q]uit ",
        },
        ActiveModal::Help | ActiveModal::Notice(_) => " [Esc/Enter] Close ",
        ActiveModal::ConfirmDeleteAll => " [y] Delete everything | [n/Esc] Cancel ",
    };

    let error_text = app.last_error.as_deref().unwrap_or("");

    let status_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(75), Constraint::Percentage(25)])
        .split(area);

    let status_paragraph =
        Paragraph::new(status_text).style(Style::default().bg(Color::DarkGray).fg(Color::White));
    f.render_widget(status_paragraph, status_chunks[0]);

    let error_paragraph = Paragraph::new(error_text)
        .style(Style::default().bg(Color::DarkGray).fg(Color::Red))
        .alignment(Alignment::Right);
    f.render_widget(error_paragraph, status_chunks[1]);
}

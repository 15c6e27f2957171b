// mapty-tui/src/ui/modals.rs
use crate::{
    app::{ActiveModal, App},
    ui::layout::centered_rect,
};
use ratatui::{
    layout::Margin,
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

pub fn render_modal(f: &mut Frame, app: &App) {
    match &app.active_modal {
        ActiveModal::Help => render_help_modal(f),
        ActiveModal::Notice(message) => render_notice_modal(f, message),
        ActiveModal::ConfirmDeleteAll => render_confirm_delete_all_modal(f, app),
        ActiveModal::None => {} // Should not happen if called correctly
    }
}

fn render_help_modal(f: &mut Frame) {
    let block = Block::default()
        .title("Help (?)")
        .borders(Borders::ALL)
        .title_style(Style::new().bold())
        .border_style(Style::new().yellow());
    let area = centered_rect(60, 70, f.size());
    f.render_widget(Clear, area);
    f.render_widget(block, area);

    let help_text = vec![
        Line::from("--- Global ---").style(Style::new().bold().underlined()),
        Line::from(" q: Quit"),
        Line::from(" ?: Show/Hide This Help"),
        Line::from(" Tab: Switch Focus (Map <=> Workout List)"),
        Line::from(" d / Delete: Delete Selected Workout"),
        Line::from(" D: Delete All Workouts"),
        Line::from(" a: Show All Workouts"),
        Line::from(" u: Back To Your Position"),
        Line::from(" s: Cycle Sort (Default > Distance Asc > Distance Desc)"),
        Line::from(" r: Toggle Route Line To The Selected Workout"),
        Line::from(""),
        Line::from("--- Map ---").style(Style::new().bold().underlined()),
        Line::from(" h/j/k/l / ←↓↑→: Move Crosshair"),
        Line::from(" + / -: Zoom In / Out"),
        Line::from(" Enter: Select Marker Under Crosshair, Or Log A Workout Here"),
        Line::from(""),
        Line::from("--- Workout List ---").style(Style::new().bold().underlined()),
        Line::from(" k/j / ↑/↓: Navigate"),
        Line::from(" Enter: Select (Again To Deselect)"),
        Line::from(""),
        Line::from("--- Form ---").style(Style::new().bold().underlined()),
        Line::from(" Tab / ↑↓: Next / Previous Field"),
        Line::from(" Space / ←→: Switch Running <=> Cycling"),
        Line::from(" Enter: Save Workout"),
        Line::from(" Esc: Close (Input Is Kept)"),
        Line::from(""),
        Line::from(Span::styled(
            " Press Esc, ?, or Enter to close ",
            Style::new().italic().yellow(),
        )),
    ];

    let paragraph = Paragraph::new(help_text).wrap(Wrap { trim: false });
    f.render_widget(
        paragraph,
        area.inner(&Margin {
            vertical: 1,
            horizontal: 1,
        }),
    );
}

fn render_notice_modal(f: &mut Frame, message: &str) {
    let block = Block::default()
        .title("Notice")
        .borders(Borders::ALL)
        .border_style(Style::new().red());
    let area = centered_rect(50, 25, f.size());
    f.render_widget(Clear, area);
    f.render_widget(block, area);

    let mut lines: Vec<Line> = message.lines().map(Line::from).collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " [Enter/Esc] OK ",
        Style::new().italic().yellow(),
    )));

    f.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: true }),
        area.inner(&Margin {
            vertical: 1,
            horizontal: 2,
        }),
    );
}

fn render_confirm_delete_all_modal(f: &mut Frame, app: &App) {
    let block = Block::default()
        .title("Delete All Workouts")
        .borders(Borders::ALL)
        .border_style(Style::new().red());
    let area = centered_rect(50, 20, f.size());
    f.render_widget(Clear, area);
    f.render_widget(block, area);

    let lines = vec![
        Line::from(format!(
            "Delete all {} workout(s)? This cannot be undone.",
            app.service.store.len()
        )),
        Line::from(""),
        Line::from(Span::styled(
            " [y] Yes   [n/Esc] No ",
            Style::new().italic().yellow(),
        )),
    ];
    f.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: true }),
        area.inner(&Margin {
            vertical: 1,
            horizontal: 2,
        }),
    );
}

// mapty-tui/src/ui/map.rs
use super::kind_color;
use crate::app::{App, Pane};
use ratatui::{
    layout::Rect,
    style::{Color, Style, Stylize},
    symbols,
    text::Line,
    widgets::{
        canvas::{Canvas, Circle, Line as Segment, Map, MapResolution, Points},
        Block, Borders,
    },
    Frame,
};

const METERS_PER_DEGREE: f64 = 111_320.0;
/// Radius of the ring drawn around the user's position.
const USER_RING_M: f64 = 200.0;

fn meters_to_degrees(meters: f64) -> f64 {
    meters / METERS_PER_DEGREE
}

pub fn render_map(f: &mut Frame, app: &App, area: Rect) {
    let scene = &app.service.view;
    let viewport = app.viewport;
    let cursor = app.cursor;

    let title = if app.service.is_map_ready() {
        format!(" Map  {cursor}  zoom {:.0} ", viewport.zoom)
    } else {
        " Map (waiting for a position fix) ".to_string()
    };
    let border_style = if app.pane == Pane::Map && !app.form_is_open() {
        Style::new().yellow()
    } else {
        Style::new()
    };

    let canvas = Canvas::default()
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(border_style),
        )
        .marker(symbols::Marker::Braille)
        .x_bounds(viewport.x_bounds())
        .y_bounds(viewport.y_bounds())
        .paint(move |ctx| {
            ctx.draw(&Map {
                color: Color::DarkGray,
                resolution: MapResolution::High,
            });
            ctx.layer();

            if let Some(user) = scene.user {
                ctx.draw(&Circle {
                    x: user.lng,
                    y: user.lat,
                    radius: meters_to_degrees(USER_RING_M),
                    color: Color::Blue,
                });
                ctx.print(user.lng, user.lat, "You".blue().bold());
            }

            if let Some(focus) = scene.focus {
                if let Some((from, to)) = focus.route {
                    ctx.draw(&Segment {
                        x1: from.lng,
                        y1: from.lat,
                        x2: to.lng,
                        y2: to.lat,
                        color: Color::Red,
                    });
                }
                ctx.draw(&Circle {
                    x: focus.center.lng,
                    y: focus.center.lat,
                    radius: meters_to_degrees(focus.radius_m),
                    color: Color::Red,
                });
            }

            for marker in scene.markers.values() {
                let color = kind_color(marker.kind);
                ctx.draw(&Points {
                    coords: &[(marker.coords.lng, marker.coords.lat)],
                    color,
                });
                ctx.print(
                    marker.coords.lng,
                    marker.coords.lat,
                    Line::styled(marker.popup.clone(), Style::new().fg(color)),
                );
            }

            if let Some(form) = scene.form {
                ctx.print(form.location.lng, form.location.lat, "◆".yellow());
            }
            ctx.print(cursor.lng, cursor.lat, "+".bold());
        });

    f.render_widget(canvas, area);
}

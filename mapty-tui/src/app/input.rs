// src/app/input.rs
use super::{
    navigation_helpers::{list_next, list_previous},
    state::{ActiveModal, App, FormField, Pane},
};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

const ZOOM_STEP: f64 = 1.0;

impl App {
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        // Handle based on active modal first
        if self.active_modal != ActiveModal::None {
            self.handle_modal_input(key);
            return Ok(());
        }
        // The open form owns the keyboard until it closes
        if self.form_is_open() {
            self.handle_form_input(key);
            return Ok(());
        }

        // Global keys
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.active_modal = ActiveModal::Help,
            KeyCode::Tab => {
                self.pane = match self.pane {
                    Pane::Map => Pane::List,
                    Pane::List => Pane::Map,
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => self.delete_current(),
            KeyCode::Char('D') => self.open_delete_all_confirmation(),
            KeyCode::Char('a') => self.show_all(),
            KeyCode::Char('u') => self.recenter(),
            KeyCode::Char('s') => self.cycle_sort(),
            KeyCode::Char('r') => self.toggle_route(),
            _ => match self.pane {
                Pane::Map => self.handle_map_input(key),
                Pane::List => self.handle_list_input(key),
            },
        }
        Ok(())
    }

    fn handle_modal_input(&mut self, key: KeyEvent) {
        match self.active_modal {
            ActiveModal::ConfirmDeleteAll => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => self.delete_all(),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.active_modal = ActiveModal::None;
                }
                _ => {}
            },
            ActiveModal::Help | ActiveModal::Notice(_) => match key.code {
                KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter | KeyCode::Char('?') => {
                    self.active_modal = ActiveModal::None;
                }
                _ => {}
            },
            ActiveModal::None => {}
        }
    }

    fn handle_map_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('k') | KeyCode::Up => self.move_cursor(1.0, 0.0),
            KeyCode::Char('j') | KeyCode::Down => self.move_cursor(-1.0, 0.0),
            KeyCode::Char('h') | KeyCode::Left => self.move_cursor(0.0, -1.0),
            KeyCode::Char('l') | KeyCode::Right => self.move_cursor(0.0, 1.0),
            KeyCode::Char('+') | KeyCode::Char('=') => self.viewport.zoom_by(ZOOM_STEP),
            KeyCode::Char('-') => self.viewport.zoom_by(-ZOOM_STEP),
            KeyCode::Enter | KeyCode::Char(' ') => self.click_map(),
            _ => {}
        }
    }

    fn handle_list_input(&mut self, key: KeyEvent) {
        let list_len = self.service.view.list.len();
        match key.code {
            KeyCode::Char('k') | KeyCode::Up => list_previous(&mut self.list_state, list_len),
            KeyCode::Char('j') | KeyCode::Down => list_next(&mut self.list_state, list_len),
            KeyCode::Enter | KeyCode::Char(' ') => self.select_list_row(),
            _ => {}
        }
    }

    fn handle_form_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.close_draft(),
            KeyCode::Tab | KeyCode::Down => self.form_field = self.form_field.next(),
            KeyCode::BackTab | KeyCode::Up => self.form_field = self.form_field.previous(),
            KeyCode::Enter => match self.form_field {
                FormField::Cancel => self.close_draft(),
                FormField::Kind => self.form_field = self.form_field.next(),
                _ => self.submit_draft(),
            },
            KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right
                if self.form_field == FormField::Kind =>
            {
                self.toggle_draft_kind();
            }
            KeyCode::Backspace => {
                if let Some(field) = self.form_field.input(self.draft.kind) {
                    self.draft.text_mut(field).pop();
                }
            }
            KeyCode::Char(c) if c.is_ascii_digit() || matches!(c, '.' | '-') => {
                if let Some(field) = self.form_field.input(self.draft.kind) {
                    self.draft.text_mut(field).push(c);
                }
            }
            _ => {}
        }
    }
}

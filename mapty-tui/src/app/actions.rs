// mapty-tui/src/app/actions.rs
use super::state::{ActiveModal, App, FormField, Pane};
use log::{info, warn};
use mapty_lib::{Coordinates, WorkoutId};

impl App {
    // --- Map ---

    pub(crate) fn move_cursor(&mut self, lat_steps: f64, lng_steps: f64) {
        let (lat_step, lng_step) = self.viewport.step();
        self.cursor = Coordinates::new(
            (self.cursor.lat + lat_steps * lat_step).clamp(-90.0, 90.0),
            (self.cursor.lng + lng_steps * lng_step).clamp(-180.0, 180.0),
        );
        self.viewport.follow(self.cursor);
    }

    /// Enter on the map: a marker under the crosshair is selected, any
    /// other spot opens the form there.
    pub(crate) fn click_map(&mut self) {
        if let Some(id) = self.marker_under_cursor() {
            self.select(id);
            return;
        }
        if self.service.map_click(self.cursor) {
            self.service.toggle_kind(self.draft.kind);
            self.form_field = FormField::Distance;
        } else {
            self.set_error("Map not ready: no position fix".to_string());
        }
    }

    pub(crate) fn select(&mut self, id: WorkoutId) {
        if self.service.select_workout(id).is_none() {
            self.set_error("Cannot select workouts before the map is ready".to_string());
        }
    }

    pub(crate) fn select_list_row(&mut self) {
        if let Some(id) = self.selected_list_id() {
            self.select(id);
        }
    }

    // --- Form ---

    pub(crate) fn toggle_draft_kind(&mut self) {
        self.draft.kind = self.draft.kind.toggled();
        self.service.toggle_kind(self.draft.kind);
    }

    pub(crate) fn submit_draft(&mut self) {
        match self.service.submit_form(&self.draft) {
            Ok(workout) => {
                info!("Logged {} from the TUI", workout.id());
                self.draft.clear_values();
                self.form_field = FormField::Distance;
            }
            // The service queued a notice; keep the draft for correction
            Err(e) => warn!("Form rejected: {e}"),
        }
    }

    pub(crate) fn close_draft(&mut self) {
        self.service.close_form();
        self.pane = Pane::Map;
    }

    // --- Sidebar controls ---

    pub(crate) fn delete_current(&mut self) {
        match self.service.delete_current() {
            Ok(Some(workout)) => info!("Deleted {}", workout.id()),
            Ok(None) => self.set_error("No workout selected".to_string()),
            Err(e) => warn!("Delete failed: {e}"),
        }
    }

    pub(crate) fn open_delete_all_confirmation(&mut self) {
        if self.service.controls().delete_all {
            self.active_modal = ActiveModal::ConfirmDeleteAll;
        }
    }

    pub(crate) fn delete_all(&mut self) {
        self.active_modal = ActiveModal::None;
        match self.service.delete_all() {
            Ok(count) => {
                info!("Deleted {count} workout(s)");
                self.list_state.select(None);
            }
            Err(e) => warn!("Delete all failed: {e}"),
        }
    }

    pub(crate) fn show_all(&mut self) {
        if self.service.show_all().is_none() {
            self.set_error("No workouts to show".to_string());
        }
    }

    pub(crate) fn recenter(&mut self) {
        if self.service.show_user_position().is_none() {
            self.set_error("Position unknown".to_string());
        }
    }

    pub(crate) fn cycle_sort(&mut self) {
        let next = self.service.sort.next();
        self.service.set_sort(next);
    }

    pub(crate) fn toggle_route(&mut self) {
        let enabled = !self.service.config.show_route;
        if let Err(e) = self.service.set_show_route(enabled) {
            self.set_error(format!("Could not save setting: {e}"));
        }
    }
}

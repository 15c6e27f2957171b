// mapty-lib/src/lib.rs
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

// --- Declare modules ---
mod config;
pub mod form;
pub mod geolocation;
pub mod selection;
pub mod storage;
pub mod store;
pub mod view;
pub mod workout;

// --- Expose public types ---
pub use config::{
    get_config_path as get_config_path_util, load as load_config_util, parse_color,
    save as save_config_util, Config, Error as ConfigError, StandardColor, Theme, MAX_ZOOM,
    MIN_ZOOM,
};
pub use form::{toggle_fields_for, FormController, FormState, RawFields};
pub use geolocation::{ConfiguredLocation, Error as GeolocationError, Geolocator};
pub use selection::{Selection, SelectionChange, SelectionTracker};
pub use storage::{
    get_data_dir as get_data_dir_util, get_db_path as get_db_path_util, Error as StorageError,
    SqliteStorage, Storage,
};
pub use store::{SortOrder, StoreError, WorkoutStore, WORKOUTS_KEY};
pub use view::{Bounds, Camera, Controls, Focus, FormView, Marker, Notice, Scene, View};
pub use workout::{
    Coordinates, CoordinatesError, Field, KindParams, Metric, ValidationError, Workout,
    WorkoutId, WorkoutKind,
};

/// Keeps the store, the selection, the form and the view consistent.
/// Each event handler below runs to completion before the next one starts.
pub struct AppService<V: View = Scene> {
    pub config: Config,
    pub store: WorkoutStore<SqliteStorage>,
    pub selection: SelectionTracker,
    pub form: FormController,
    pub view: V,
    pub sort: SortOrder,
    user_location: Option<Coordinates>,
    pub db_path: PathBuf,
    pub config_path: PathBuf,
}

impl AppService<Scene> {
    /// Initializes the application service with a headless `Scene`.
    /// # Errors
    /// Returns `anyhow::Error` if config/db path determination, loading, or initialization fails.
    pub fn initialize() -> Result<Self> {
        let config_path =
            config::get_config_path().context("Failed to determine configuration file path")?;
        let config = config::load(&config_path)
            .with_context(|| format!("Failed to load config from {config_path:?}"))?;

        let db_path = storage::get_db_path().context("Failed to determine database path")?;
        let storage = SqliteStorage::open(&db_path)
            .with_context(|| format!("Failed to open database at {db_path:?}"))?;

        Ok(Self::new(config, storage, Scene::new(), db_path, config_path))
    }
}

impl<V: View> AppService<V> {
    /// Loads saved workouts and renders the sidebar. The map stays
    /// uninitialized until `locate` succeeds. Saved data that cannot be read
    /// is reported through the view and the service starts without it.
    pub fn new(
        config: Config,
        storage: SqliteStorage,
        view: V,
        db_path: PathBuf,
        config_path: PathBuf,
    ) -> Self {
        let mut store = WorkoutStore::new(storage);
        let load_notice = match store.load_from_persistence() {
            Ok(0) => None,
            Ok(skipped) => {
                warn!("Skipped {skipped} unreadable saved workout(s)");
                Some(Notice::Failure(format!(
                    "{skipped} saved workout(s) could not be read and were left out."
                )))
            }
            Err(err) => {
                warn!("Starting without saved workouts: {err:?}");
                Some(Notice::Failure(format!(
                    "Saved workouts could not be loaded ({err}). Starting with an empty list."
                )))
            }
        };

        let mut service = Self {
            sort: config.default_sort,
            config,
            store,
            selection: SelectionTracker::new(),
            form: FormController::new(),
            view,
            user_location: None,
            db_path,
            config_path,
        };
        if let Some(notice) = load_notice {
            service.view.notify(notice);
        }
        service.refresh_list();
        service.publish_controls();
        service
    }

    pub fn get_config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }

    /// Saves the current configuration state.
    /// # Errors
    /// Returns `ConfigError` if saving fails.
    pub fn save_config(&self) -> Result<(), ConfigError> {
        config::save(&self.config_path, &self.config)
    }

    /// # Errors
    /// - `ConfigError::InvalidHomeLocation` for out-of-range coordinates.
    /// - `ConfigError` variants if saving fails.
    pub fn set_home_location(&mut self, home: Option<Coordinates>) -> Result<(), ConfigError> {
        self.config.set_home_location(home)?;
        self.save_config()
    }

    /// # Errors
    /// - `ConfigError::InvalidZoomLevel` outside 1..=18.
    /// - `ConfigError` variants if saving fails.
    pub fn set_zoom_level(&mut self, level: u8) -> Result<(), ConfigError> {
        self.config.set_zoom_level(level)?;
        self.save_config()
    }

    /// # Errors
    /// - `ConfigError::InvalidFocusRadius` unless positive.
    /// - `ConfigError` variants if saving fails.
    pub fn set_focus_radius(&mut self, radius_m: f64) -> Result<(), ConfigError> {
        self.config.set_focus_radius(radius_m)?;
        self.save_config()
    }

    /// # Errors
    /// Returns `ConfigError` variants if saving fails.
    pub fn set_show_route(&mut self, enabled: bool) -> Result<(), ConfigError> {
        self.config.show_route = enabled;
        self.save_config()
    }

    /// # Errors
    /// Returns `ConfigError` variants if saving fails.
    pub fn set_default_sort(&mut self, order: SortOrder) -> Result<(), ConfigError> {
        self.config.default_sort = order;
        self.save_config()
    }

    /// # Errors
    /// Returns `ConfigError::InvalidColor` for unknown colour names, or a save error.
    pub fn set_header_color(&mut self, color: &str) -> Result<(), ConfigError> {
        let color = parse_color(color)?;
        self.config.theme.header_color = format!("{color:?}");
        self.save_config()
    }

    // --- Map initialization ---

    /// Applies the one-shot position fix. On success the map is centred on
    /// the user and every workout gets its marker; on failure the user is
    /// told once and the map stays uninitialized. A second fix is ignored.
    /// # Errors
    /// Returns the `GeolocationError` that was reported.
    pub fn locate(
        &mut self,
        fix: Result<Coordinates, GeolocationError>,
    ) -> Result<Coordinates, GeolocationError> {
        if let Some(existing) = self.user_location {
            debug!("Ignoring repeated position fix, map already at {existing}");
            return Ok(existing);
        }

        match fix {
            Ok(position) => {
                info!("Map initialized at {position}");
                self.user_location = Some(position);
                self.view.set_view(position, self.config.map_zoom_level);
                self.view.show_user(position);
                for workout in self.store.workouts() {
                    self.view.add_marker(Marker::for_workout(workout));
                }
                self.publish_controls();
                Ok(position)
            }
            Err(err) => {
                warn!("Geolocation failed: {err}");
                self.view
                    .notify(Notice::GeolocationUnavailable(err.to_string()));
                Err(err)
            }
        }
    }

    /// `locate` with a fix taken from `locator`.
    /// # Errors
    /// See `locate`.
    pub fn locate_with<G: Geolocator>(
        &mut self,
        locator: &G,
    ) -> Result<Coordinates, GeolocationError> {
        self.locate(locator.current_position())
    }

    #[must_use]
    pub const fn is_map_ready(&self) -> bool {
        self.user_location.is_some()
    }

    #[must_use]
    pub const fn user_location(&self) -> Option<Coordinates> {
        self.user_location
    }

    // --- Form ---

    /// A click on the map. Opens the form for that spot; ignored until the
    /// map is initialized. Returns whether the form opened.
    pub fn map_click(&mut self, at: Coordinates) -> bool {
        if !self.is_map_ready() {
            warn!("Map click at {at} before the map was initialized");
            return false;
        }
        self.form.open_for(at);
        self.view.show_form(at);
        true
    }

    /// Shows the input that belongs to `kind`.
    pub fn toggle_kind(&mut self, kind: WorkoutKind) -> Field {
        let field = toggle_fields_for(kind);
        self.view.show_field(field);
        field
    }

    /// Creates a workout from the open form. On success the marker, the
    /// list and the controls are updated and the form closes; on failure the
    /// user is notified and nothing changes.
    /// # Errors
    /// Returns the `StoreError` that was reported.
    pub fn submit_form(&mut self, raw: &RawFields) -> Result<Workout, StoreError> {
        match self.form.submit(&mut self.store, raw) {
            Ok(workout) => {
                self.view.add_marker(Marker::for_workout(&workout));
                self.view.hide_form();
                self.refresh_list();
                self.publish_controls();
                Ok(workout)
            }
            Err(StoreError::Validation(err)) => {
                debug!("Rejected form input: {err}");
                self.view.notify(Notice::Invalid(err));
                Err(err.into())
            }
            Err(err) => {
                self.view.notify(Notice::Failure(err.to_string()));
                Err(err)
            }
        }
    }

    /// Cancel / Escape. Returns whether the form was open.
    pub fn close_form(&mut self) -> bool {
        let was_open = self.form.close();
        if was_open {
            self.view.hide_form();
        }
        was_open
    }

    // --- Selection ---

    /// A click on a list row or marker. Selecting another workout retracts
    /// the previous focus before drawing the new one; clicking the active
    /// workout again deselects it and pans back to the user.
    pub fn select_workout(&mut self, id: WorkoutId) -> Option<SelectionChange> {
        if !self.is_map_ready() {
            debug!("Ignoring selection of {id}, map not initialized");
            return None;
        }
        let Some(index) = self.store.position(id) else {
            warn!("Ignoring selection of unknown workout {id}");
            return None;
        };

        let change = self.selection.select(id, index);
        self.view.clear_focus();
        match change {
            SelectionChange::Selected { .. } => {
                if let Some(workout) = self.store.get(id) {
                    let focus = self.focus_for(workout);
                    let center = workout.coords();
                    self.view.draw_focus(focus);
                    self.view.set_view(center, self.config.map_zoom_level);
                }
            }
            SelectionChange::Deselected { .. } => self.pan_to_user(),
        }
        self.refresh_list();
        self.publish_controls();
        Some(change)
    }

    #[must_use]
    pub fn active_workout(&self) -> Option<&Workout> {
        self.selection
            .active()
            .and_then(|selection| self.store.get(selection.id))
    }

    // --- Sidebar controls ---

    /// Deletes the active workout. `Ok(None)` when nothing is selected.
    /// # Errors
    /// Returns `StoreError` if the deletion cannot be saved; nothing changes then.
    pub fn delete_current(&mut self) -> Result<Option<Workout>, StoreError> {
        match self.selection.active() {
            Some(selection) => self.delete_workout(selection.id),
            None => Ok(None),
        }
    }

    /// Deletes one workout by id, retracting its marker, its list row and,
    /// if it was active, the selection and focus.
    /// # Errors
    /// Returns `StoreError` if the deletion cannot be saved; nothing changes then.
    pub fn delete_workout(&mut self, id: WorkoutId) -> Result<Option<Workout>, StoreError> {
        let removed = match self.store.remove(id) {
            Ok(removed) => removed,
            Err(err) => {
                self.view.notify(Notice::Failure(err.to_string()));
                return Err(err);
            }
        };
        if removed.is_some() {
            if self.selection.is_active(id) {
                self.selection.clear();
                self.view.clear_focus();
                self.pan_to_user();
            } else if let Some(active) = self.selection.active() {
                if let Some(index) = self.store.position(active.id) {
                    self.selection.set_index(index);
                }
            }
            self.view.remove_marker(id);
            self.refresh_list();
            self.publish_controls();
        }
        Ok(removed)
    }

    /// Deletes every workout. Returns how many were removed.
    /// # Errors
    /// Returns `StoreError` if the empty state cannot be saved; nothing changes then.
    pub fn delete_all(&mut self) -> Result<usize, StoreError> {
        let count = match self.store.clear() {
            Ok(count) => count,
            Err(err) => {
                self.view.notify(Notice::Failure(err.to_string()));
                return Err(err);
            }
        };
        self.selection.clear();
        self.view.clear_focus();
        self.view.clear_markers();
        self.refresh_list();
        self.publish_controls();
        Ok(count)
    }

    /// Fits the map to every marker. `None` when there is nothing to show.
    pub fn show_all(&mut self) -> Option<Bounds> {
        if !self.is_map_ready() {
            return None;
        }
        let bounds = self.store.bounds()?;
        self.view.fit_bounds(bounds);
        Some(bounds)
    }

    /// Recenters the map on the position fix.
    pub fn show_user_position(&mut self) -> Option<Coordinates> {
        self.pan_to_user();
        self.user_location
    }

    pub fn set_sort(&mut self, order: SortOrder) {
        self.sort = order;
        self.refresh_list();
    }

    #[must_use]
    pub fn sorted_workouts(&self) -> Vec<Workout> {
        self.store.sorted_view(self.sort)
    }

    #[must_use]
    pub fn controls(&self) -> Controls {
        let has_workouts = !self.store.is_empty();
        Controls {
            delete_current: self.selection.active().is_some(),
            delete_all: has_workouts,
            show_all: has_workouts && self.is_map_ready(),
            recenter: self.is_map_ready(),
        }
    }

    fn focus_for(&self, workout: &Workout) -> Focus {
        let route = if self.config.show_route {
            self.user_location.map(|user| (user, workout.coords()))
        } else {
            None
        };
        Focus {
            id: workout.id(),
            center: workout.coords(),
            radius_m: self.config.focus_radius_m,
            route,
        }
    }

    fn pan_to_user(&mut self) {
        if let Some(user) = self.user_location {
            self.view.set_view(user, self.config.map_zoom_level);
        }
    }

    fn refresh_list(&mut self) {
        let rows = self.store.sorted_view(self.sort);
        let active = self.selection.active().map(|selection| selection.id);
        self.view.render_list(&rows, active);
    }

    fn publish_controls(&mut self) {
        let controls = self.controls();
        self.view.update_controls(controls);
    }
}

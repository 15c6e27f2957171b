// mapty-tui/src/app/state.rs
use super::viewport::Viewport;
use log::debug;
use mapty_lib::{AppService, Camera, Coordinates, Field, RawFields, WorkoutId, WorkoutKind};
use ratatui::widgets::ListState;
use std::time::{Duration, Instant};

const ERROR_DISPLAY_TIME: Duration = Duration::from_secs(5);

// Which half of the screen receives navigation keys
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pane {
    Map,
    List,
}

// Fields within the workout form
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormField {
    Kind,
    Distance,
    Duration,
    KindValue, // Cadence or elevation gain, depending on the kind
    Confirm,
    Cancel,
}

impl FormField {
    pub const fn next(self) -> Self {
        match self {
            Self::Kind => Self::Distance,
            Self::Distance => Self::Duration,
            Self::Duration => Self::KindValue,
            Self::KindValue => Self::Confirm,
            Self::Confirm => Self::Cancel,
            Self::Cancel => Self::Kind,
        }
    }

    pub const fn previous(self) -> Self {
        match self {
            Self::Kind => Self::Cancel,
            Self::Distance => Self::Kind,
            Self::Duration => Self::Distance,
            Self::KindValue => Self::Duration,
            Self::Confirm => Self::KindValue,
            Self::Cancel => Self::Confirm,
        }
    }

    /// The text input behind this field, if it is one.
    pub const fn input(self, kind: WorkoutKind) -> Option<Field> {
        match self {
            Self::Distance => Some(Field::Distance),
            Self::Duration => Some(Field::Duration),
            Self::KindValue => Some(kind.field()),
            Self::Kind | Self::Confirm | Self::Cancel => None,
        }
    }
}

// Represents the state of active modals
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActiveModal {
    None,
    Help,
    Notice(String),
    ConfirmDeleteAll,
}

pub struct App {
    pub service: AppService,
    pub should_quit: bool,
    pub active_modal: ActiveModal,
    pub pane: Pane,
    pub cursor: Coordinates,
    pub viewport: Viewport,
    // Form text survives Esc; only a successful submit clears it
    pub draft: RawFields,
    pub form_field: FormField,
    pub list_state: ListState,
    pub last_error: Option<String>,
    pub error_clear_time: Option<Instant>,
}

impl App {
    pub fn new(service: AppService) -> Self {
        let viewport = service.user_location().map_or_else(Viewport::default, |user| {
            Viewport::centered(user, service.config.map_zoom_level)
        });
        let mut app = Self {
            cursor: viewport.center,
            viewport,
            service,
            should_quit: false,
            active_modal: ActiveModal::None,
            pane: Pane::Map,
            draft: RawFields::default(),
            form_field: FormField::Distance,
            list_state: ListState::default(),
            last_error: None,
            error_clear_time: None,
        };
        app.sync_view();
        app
    }

    // Method to set status bar errors
    pub fn set_error(&mut self, msg: String) {
        self.last_error = Some(msg);
        self.error_clear_time = Some(Instant::now() + ERROR_DISPLAY_TIME);
    }

    pub(crate) fn clear_expired_error(&mut self) {
        if let Some(clear_time) = self.error_clear_time {
            if Instant::now() >= clear_time {
                self.last_error = None;
                self.error_clear_time = None;
            }
        }
    }

    /// Applies what the service pushed since the last frame: camera moves,
    /// queued notices and the active list row.
    pub fn sync_view(&mut self) {
        self.clear_expired_error();

        if let Some(camera) = self.service.view.camera.take() {
            debug!("Camera moved: {camera:?}");
            self.viewport = match camera {
                Camera::Center { center, zoom } => Viewport::centered(center, zoom),
                Camera::Fit(bounds) => Viewport::fit(bounds),
            };
            self.cursor = self.viewport.center;
        }

        let notices: Vec<String> = std::iter::from_fn(|| self.service.view.take_notice())
            .map(|notice| notice.to_string())
            .collect();
        if !notices.is_empty() {
            self.active_modal = ActiveModal::Notice(notices.join("\n"));
        }

        let list_len = self.service.view.list.len();
        match self.service.view.active {
            Some(active) => {
                let row = self.service.view.list.iter().position(|w| w.id() == active);
                self.list_state.select(row);
            }
            None if self.list_state.selected().is_some_and(|i| i >= list_len) => {
                self.list_state.select(list_len.checked_sub(1));
            }
            None => {}
        }
    }

    pub fn form_is_open(&self) -> bool {
        self.service.view.form.is_some()
    }

    /// Marker within a couple of cursor steps of the crosshair.
    pub fn marker_under_cursor(&self) -> Option<WorkoutId> {
        let (lat_step, lng_step) = self.viewport.step();
        self.service
            .view
            .markers
            .values()
            .map(|marker| {
                let d_lat = (marker.coords.lat - self.cursor.lat) / lat_step;
                let d_lng = (marker.coords.lng - self.cursor.lng) / lng_step;
                (marker.id, d_lat.hypot(d_lng))
            })
            .filter(|(_, distance)| *distance <= 2.0)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    pub fn selected_list_id(&self) -> Option<WorkoutId> {
        self.list_state
            .selected()
            .and_then(|i| self.service.view.list.get(i))
            .map(mapty_lib::Workout::id)
    }
}

// mapty-lib/src/view.rs
//! The boundary between the workout state machine and whatever draws it.
use crate::workout::{Coordinates, Field, ValidationError, Workout, WorkoutId, WorkoutKind};
use log::warn;
use std::collections::{BTreeMap, VecDeque};
use std::fmt;

/// Axis-aligned lat/lng box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south_west: Coordinates,
    pub north_east: Coordinates,
}

impl Bounds {
    pub fn from_points<I: IntoIterator<Item = Coordinates>>(points: I) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut bounds = Self {
            south_west: first,
            north_east: first,
        };
        for point in points {
            bounds.extend(point);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, point: Coordinates) {
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lng = self.south_west.lng.min(point.lng);
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
    }

    #[must_use]
    pub fn center(&self) -> Coordinates {
        Coordinates::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }

    #[must_use]
    pub fn contains(&self, point: Coordinates) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&point.lat)
            && (self.south_west.lng..=self.north_east.lng).contains(&point.lng)
    }

    #[must_use]
    pub fn lat_span(&self) -> f64 {
        self.north_east.lat - self.south_west.lat
    }

    #[must_use]
    pub fn lng_span(&self) -> f64 {
        self.north_east.lng - self.south_west.lng
    }
}

/// Highlight drawn for the selected workout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Focus {
    pub id: WorkoutId,
    pub center: Coordinates,
    pub radius_m: f64,
    /// Straight connector from the user's position, when enabled.
    pub route: Option<(Coordinates, Coordinates)>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Camera {
    Center { center: Coordinates, zoom: u8 },
    Fit(Bounds),
}

/// Which sidebar controls currently do something.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Controls {
    pub delete_current: bool,
    pub delete_all: bool,
    pub show_all: bool,
    pub recenter: bool,
}

/// A blocking message for the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Invalid(ValidationError),
    GeolocationUnavailable(String),
    Failure(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid(err) => write!(f, "{err}"),
            Self::GeolocationUnavailable(msg) | Self::Failure(msg) => f.write_str(msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: WorkoutId,
    pub coords: Coordinates,
    pub kind: WorkoutKind,
    pub popup: String,
}

impl Marker {
    #[must_use]
    pub fn for_workout(workout: &Workout) -> Self {
        Self {
            id: workout.id(),
            coords: workout.coords(),
            kind: workout.kind(),
            popup: format!("{} {}", workout.kind().icon(), workout.label()),
        }
    }
}

/// Everything the service asks of the map, the sidebar and the form.
pub trait View {
    fn render_list(&mut self, workouts: &[Workout], active: Option<WorkoutId>);
    fn add_marker(&mut self, marker: Marker);
    fn remove_marker(&mut self, id: WorkoutId);
    fn clear_markers(&mut self);
    fn draw_focus(&mut self, focus: Focus);
    fn clear_focus(&mut self);
    fn show_user(&mut self, at: Coordinates);
    fn set_view(&mut self, center: Coordinates, zoom: u8);
    fn fit_bounds(&mut self, bounds: Bounds);
    fn show_form(&mut self, location: Coordinates);
    fn show_field(&mut self, field: Field);
    fn hide_form(&mut self);
    fn update_controls(&mut self, controls: Controls);
    fn notify(&mut self, notice: Notice);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormView {
    pub location: Coordinates,
    pub field: Field,
}

/// Headless view-model: the last state the service pushed, ready to be
/// drawn by a front-end.
#[derive(Debug, Clone)]
pub struct Scene {
    pub markers: BTreeMap<WorkoutId, Marker>,
    pub focus: Option<Focus>,
    pub user: Option<Coordinates>,
    pub camera: Option<Camera>,
    pub list: Vec<Workout>,
    pub active: Option<WorkoutId>,
    pub form: Option<FormView>,
    pub visible_field: Field,
    pub controls: Controls,
    notices: VecDeque<Notice>,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            markers: BTreeMap::new(),
            focus: None,
            user: None,
            camera: None,
            list: Vec::new(),
            active: None,
            form: None,
            visible_field: Field::Cadence,
            controls: Controls::default(),
            notices: VecDeque::new(),
        }
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notices.pop_front()
    }

    pub fn pending_notices(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }
}

impl View for Scene {
    fn render_list(&mut self, workouts: &[Workout], active: Option<WorkoutId>) {
        self.list = workouts.to_vec();
        self.active = active;
    }

    fn add_marker(&mut self, marker: Marker) {
        if let Some(old) = self.markers.insert(marker.id, marker) {
            warn!("Replaced existing marker for workout {}", old.id);
        }
    }

    fn remove_marker(&mut self, id: WorkoutId) {
        self.markers.remove(&id);
    }

    fn clear_markers(&mut self) {
        self.markers.clear();
    }

    fn draw_focus(&mut self, focus: Focus) {
        if let Some(old) = self.focus.replace(focus) {
            warn!("Focus for {} drawn over un-retracted focus for {}", focus.id, old.id);
        }
    }

    fn clear_focus(&mut self) {
        self.focus = None;
    }

    fn show_user(&mut self, at: Coordinates) {
        self.user = Some(at);
    }

    fn set_view(&mut self, center: Coordinates, zoom: u8) {
        self.camera = Some(Camera::Center { center, zoom });
    }

    fn fit_bounds(&mut self, bounds: Bounds) {
        self.camera = Some(Camera::Fit(bounds));
    }

    fn show_form(&mut self, location: Coordinates) {
        self.form = Some(FormView {
            location,
            field: self.visible_field,
        });
    }

    fn show_field(&mut self, field: Field) {
        self.visible_field = field;
        if let Some(form) = self.form.as_mut() {
            form.field = field;
        }
    }

    fn hide_form(&mut self) {
        self.form = None;
    }

    fn update_controls(&mut self, controls: Controls) {
        self.controls = controls;
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push_back(notice);
    }
}

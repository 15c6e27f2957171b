// mapty-lib/src/form.rs
use crate::storage::Storage;
use crate::store::{StoreError, WorkoutStore};
use crate::workout::{Coordinates, Field, KindParams, ValidationError, Workout, WorkoutKind};
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FormState {
    #[default]
    Closed,
    Open {
        location: Coordinates,
    },
}

/// Text exactly as typed into the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFields {
    pub kind: WorkoutKind,
    pub distance: String,
    pub duration: String,
    pub cadence: String,
    pub elevation: String,
}

impl RawFields {
    #[must_use]
    pub fn text(&self, field: Field) -> &str {
        match field {
            Field::Distance => &self.distance,
            Field::Duration => &self.duration,
            Field::Cadence => &self.cadence,
            Field::Elevation => &self.elevation,
        }
    }

    pub fn text_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Distance => &mut self.distance,
            Field::Duration => &mut self.duration,
            Field::Cadence => &mut self.cadence,
            Field::Elevation => &mut self.elevation,
        }
    }

    /// Clears the typed values but keeps the chosen kind.
    pub fn clear_values(&mut self) {
        self.distance.clear();
        self.duration.clear();
        self.cadence.clear();
        self.elevation.clear();
    }

    fn number(&self, field: Field) -> Result<f64, ValidationError> {
        self.text(field)
            .trim()
            .parse::<f64>()
            .map_err(|_| ValidationError::NotANumber(field))
    }
}

/// Which kind-specific input is relevant for `kind`. Display only.
#[must_use]
pub const fn toggle_fields_for(kind: WorkoutKind) -> Field {
    kind.field()
}

/// Closed -> Open (map click) -> Closed (submit, close or cancel).
#[derive(Debug, Default)]
pub struct FormController {
    state: FormState,
}

impl FormController {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: FormState::Closed,
        }
    }

    /// Records where the next workout will be placed. Clicking again while
    /// open just moves the pending location.
    pub fn open_for(&mut self, location: Coordinates) {
        debug!("Form opened at {location}");
        self.state = FormState::Open { location };
    }

    /// Returns whether the form was open.
    pub fn close(&mut self) -> bool {
        let was_open = self.is_open();
        self.state = FormState::Closed;
        was_open
    }

    #[must_use]
    pub const fn state(&self) -> FormState {
        self.state
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self.state, FormState::Open { .. })
    }

    #[must_use]
    pub const fn pending_location(&self) -> Option<Coordinates> {
        match self.state {
            FormState::Open { location } => Some(location),
            FormState::Closed => None,
        }
    }

    /// Coerces the raw text and hands it to the store. The form stays open
    /// with its location on any error and closes on success.
    /// # Errors
    /// - `ValidationError::NoLocation` when the form is closed.
    /// - `ValidationError::NotANumber` for text that is not a number.
    /// - Any `StoreError` from `WorkoutStore::create`.
    pub fn submit<S: Storage>(
        &mut self,
        store: &mut WorkoutStore<S>,
        raw: &RawFields,
    ) -> Result<Workout, StoreError> {
        let FormState::Open { location } = self.state else {
            return Err(ValidationError::NoLocation.into());
        };

        let distance = raw.number(Field::Distance)?;
        let duration = raw.number(Field::Duration)?;
        let kind_value = raw.number(toggle_fields_for(raw.kind))?;
        let params = KindParams::new(raw.kind, kind_value);

        let workout = store.create(location, distance, duration, params)?;
        self.state = FormState::Closed;
        Ok(workout)
    }
}

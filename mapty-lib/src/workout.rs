// mapty-lib/src/workout.rs
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;
use strum_macros::{EnumIter, EnumString};
use thiserror::Error;

/// A latitude/longitude pair in decimal degrees.
///
/// Serialized as `[lat, lng]`, the same shape the map widget hands out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Checks the pair is finite and inside the valid lat/lng ranges.
    /// # Errors
    /// Returns `CoordinatesError` naming the offending component.
    pub fn validated(self) -> Result<Self, CoordinatesError> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(CoordinatesError::Latitude(self.lat));
        }
        if !self.lng.is_finite() || !(-180.0..=180.0).contains(&self.lng) {
            return Err(CoordinatesError::Longitude(self.lng));
        }
        Ok(self)
    }
}

impl From<[f64; 2]> for Coordinates {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(value: Coordinates) -> Self {
        [value.lat, value.lng]
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.lng)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoordinatesError {
    #[error("Expected coordinates as 'LAT,LNG', got '{0}'")]
    Format(String),
    #[error("Latitude {0} is outside -90..=90")]
    Latitude(f64),
    #[error("Longitude {0} is outside -180..=180")]
    Longitude(f64),
}

impl FromStr for Coordinates {
    type Err = CoordinatesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| CoordinatesError::Format(s.to_string()))?;
        let lat = lat
            .trim()
            .parse::<f64>()
            .map_err(|_| CoordinatesError::Format(s.to_string()))?;
        let lng = lng
            .trim()
            .parse::<f64>()
            .map_err(|_| CoordinatesError::Format(s.to_string()))?;
        Self::new(lat, lng).validated()
    }
}

/// Stable workout identifier. Serialized as a decimal string so records
/// written by the browser version (string ids) load unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct WorkoutId(u64);

impl WorkoutId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for WorkoutId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(Self)
    }
}

impl From<WorkoutId> for String {
    fn from(value: WorkoutId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for WorkoutId {
    type Error = ParseIntError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum WorkoutKind {
    #[default]
    Running,
    Cycling,
}

impl WorkoutKind {
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Cycling => "Cycling",
        }
    }

    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Running => "🏃‍♂️",
            Self::Cycling => "🚴‍♀️",
        }
    }

    /// The kind-specific input field that belongs to this kind.
    #[must_use]
    pub const fn field(self) -> Field {
        match self {
            Self::Running => Field::Cadence,
            Self::Cycling => Field::Elevation,
        }
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Running => Self::Cycling,
            Self::Cycling => Self::Running,
        }
    }
}

/// User-facing numeric inputs, named in validation messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Distance,
    Duration,
    Cadence,
    Elevation,
}

impl Field {
    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Distance => "km",
            Self::Duration => "min",
            Self::Cadence => "step/min",
            Self::Elevation => "meters",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Distance => "Distance",
            Self::Duration => "Duration",
            Self::Cadence => "Cadence",
            Self::Elevation => "Elevation gain",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ValidationError {
    #[error("{0} must be a number.")]
    NotANumber(Field),
    #[error("{0} must be a finite number.")]
    NotFinite(Field),
    #[error("{0} must be positive.")]
    NotPositive(Field),
    #[error("Pick a spot on the map before adding a workout.")]
    NoLocation,
}

/// Accepts only finite, strictly positive values.
/// # Errors
/// Returns `ValidationError::NotFinite` or `ValidationError::NotPositive`.
pub fn validate_positive(field: Field, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        Err(ValidationError::NotFinite(field))
    } else if value <= 0.0 {
        Err(ValidationError::NotPositive(field))
    } else {
        Ok(value)
    }
}

/// Kind discriminant plus the kind-specific payload.
///
/// Stored flattened into the workout record as `"type": "running",
/// "cadence": ...` or `"type": "cycling", "elevationGain": ...`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum KindParams {
    Running {
        cadence: f64,
    },
    Cycling {
        #[serde(rename = "elevationGain")]
        elevation_gain: f64,
    },
}

impl KindParams {
    #[must_use]
    pub const fn new(kind: WorkoutKind, value: f64) -> Self {
        match kind {
            WorkoutKind::Running => Self::Running { cadence: value },
            WorkoutKind::Cycling => Self::Cycling {
                elevation_gain: value,
            },
        }
    }

    #[must_use]
    pub const fn kind(&self) -> WorkoutKind {
        match self {
            Self::Running { .. } => WorkoutKind::Running,
            Self::Cycling { .. } => WorkoutKind::Cycling,
        }
    }

    #[must_use]
    pub const fn value(&self) -> f64 {
        match *self {
            Self::Running { cadence } => cadence,
            Self::Cycling { elevation_gain } => elevation_gain,
        }
    }
}

/// Performance figure derived from distance and duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric {
    /// min/km
    Pace(f64),
    /// km/h
    Speed(f64),
}

impl Metric {
    #[must_use]
    pub const fn value(self) -> f64 {
        match self {
            Self::Pace(v) | Self::Speed(v) => v,
        }
    }

    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Pace(_) => "min/km",
            Self::Speed(_) => "km/h",
        }
    }
}

#[must_use]
pub fn pace(distance_km: f64, duration_min: f64) -> f64 {
    duration_min / distance_km
}

#[must_use]
pub fn speed(distance_km: f64, duration_min: f64) -> f64 {
    distance_km / (duration_min / 60.0)
}

#[must_use]
pub fn derive_metric(kind: WorkoutKind, distance_km: f64, duration_min: f64) -> Metric {
    match kind {
        WorkoutKind::Running => Metric::Pace(pace(distance_km, duration_min)),
        WorkoutKind::Cycling => Metric::Speed(speed(distance_km, duration_min)),
    }
}

/// "Running on March 5", using the local calendar date.
#[must_use]
pub fn describe(kind: WorkoutKind, created_at: DateTime<Utc>) -> String {
    let local = created_at.with_timezone(&Local);
    format!("{} on {}", kind.title(), local.format("%B %-d"))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    id: WorkoutId,
    created_at: DateTime<Utc>,
    coords: Coordinates,
    distance_km: f64,
    duration_min: f64,
    params: KindParams,
    metric: Metric,
    label: String,
}

impl Workout {
    /// Builds a validated workout and derives its metric and label.
    /// # Errors
    /// Returns `ValidationError` if distance, duration or the kind parameter
    /// is not a finite positive number.
    pub fn new(
        id: WorkoutId,
        created_at: DateTime<Utc>,
        coords: Coordinates,
        distance_km: f64,
        duration_min: f64,
        params: KindParams,
    ) -> Result<Self, ValidationError> {
        validate_positive(Field::Distance, distance_km)?;
        validate_positive(Field::Duration, duration_min)?;
        validate_positive(params.kind().field(), params.value())?;
        Ok(Self::hydrate(
            id,
            created_at,
            coords,
            distance_km,
            duration_min,
            params,
        ))
    }

    fn hydrate(
        id: WorkoutId,
        created_at: DateTime<Utc>,
        coords: Coordinates,
        distance_km: f64,
        duration_min: f64,
        params: KindParams,
    ) -> Self {
        let kind = params.kind();
        Self {
            id,
            created_at,
            coords,
            distance_km,
            duration_min,
            params,
            metric: derive_metric(kind, distance_km, duration_min),
            label: describe(kind, created_at),
        }
    }

    #[must_use]
    pub const fn id(&self) -> WorkoutId {
        self.id
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub const fn coords(&self) -> Coordinates {
        self.coords
    }

    #[must_use]
    pub const fn distance_km(&self) -> f64 {
        self.distance_km
    }

    #[must_use]
    pub const fn duration_min(&self) -> f64 {
        self.duration_min
    }

    #[must_use]
    pub const fn params(&self) -> KindParams {
        self.params
    }

    #[must_use]
    pub const fn kind(&self) -> WorkoutKind {
        self.params.kind()
    }

    #[must_use]
    pub const fn metric(&self) -> Metric {
        self.metric
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// The persisted shape of a workout. Only raw fields are stored; metric and
/// label are re-derived when a record is turned back into a `Workout`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRecord {
    pub id: WorkoutId,
    #[serde(rename = "date")]
    pub created_at: DateTime<Utc>,
    pub coords: Coordinates,
    pub distance: f64,
    pub duration: f64,
    #[serde(flatten)]
    pub params: KindParams,
}

impl From<&Workout> for WorkoutRecord {
    fn from(workout: &Workout) -> Self {
        Self {
            id: workout.id,
            created_at: workout.created_at,
            coords: workout.coords,
            distance: workout.distance_km,
            duration: workout.duration_min,
            params: workout.params,
        }
    }
}

impl From<WorkoutRecord> for Workout {
    fn from(record: WorkoutRecord) -> Self {
        Self::hydrate(
            record.id,
            record.created_at,
            record.coords,
            record.distance,
            record.duration,
            record.params,
        )
    }
}

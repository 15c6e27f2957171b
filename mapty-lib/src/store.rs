// mapty-lib/src/store.rs
use crate::storage::{Error as StorageError, Storage};
use crate::view::Bounds;
use crate::workout::{Coordinates, KindParams, ValidationError, Workout, WorkoutId, WorkoutRecord};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use strum_macros::{EnumIter, EnumString};
use thiserror::Error;

/// The single storage key holding the JSON array of workouts.
pub const WORKOUTS_KEY: &str = "workouts";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Failed to persist workouts: {0}")]
    Storage(#[from] StorageError),
    #[error("Saved workouts could not be read")]
    Corrupt(#[source] serde_json::Error),
    #[error("Workouts could not be serialized")]
    Serialize(#[source] serde_json::Error),
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SortOrder {
    /// Insertion order.
    #[default]
    Default,
    DistanceAsc,
    DistanceDesc,
}

impl SortOrder {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Default => "Default order",
            Self::DistanceAsc => "Lowest distance first",
            Self::DistanceDesc => "Highest distance first",
        }
    }

    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Default => Self::DistanceAsc,
            Self::DistanceAsc => Self::DistanceDesc,
            Self::DistanceDesc => Self::Default,
        }
    }
}

/// Owns the workout collection and mirrors it into `Storage` after every
/// mutation. A write is attempted before the in-memory collection changes,
/// so a failed write leaves both sides as they were.
pub struct WorkoutStore<S: Storage> {
    workouts: Vec<Workout>,
    storage: S,
    last_id: u64,
}

impl<S: Storage> WorkoutStore<S> {
    pub const fn new(storage: S) -> Self {
        Self {
            workouts: Vec::new(),
            storage,
            last_id: 0,
        }
    }

    /// Replaces the in-memory collection with whatever is saved and returns
    /// how many saved records were skipped because they could not be read.
    /// A missing key, an empty value or JSON `null` is an empty collection.
    /// The saved value itself is left alone until the next write.
    /// # Errors
    /// - `StoreError::Storage` if the storage cannot be read.
    /// - `StoreError::Corrupt` if the saved value is not a JSON array.
    pub fn load_from_persistence(&mut self) -> Result<usize, StoreError> {
        let raw = self.storage.get_item(WORKOUTS_KEY)?;
        let values: Vec<serde_json::Value> = match raw.as_deref().map(str::trim) {
            None | Some("") => {
                debug!("No saved workouts, starting empty");
                Vec::new()
            }
            Some(json) => serde_json::from_str::<Option<Vec<serde_json::Value>>>(json)
                .map_err(StoreError::Corrupt)?
                .unwrap_or_default(),
        };

        let mut skipped = 0;
        let mut seen = HashSet::with_capacity(values.len());
        let mut workouts = Vec::with_capacity(values.len());
        for value in values {
            let record = match serde_json::from_value::<WorkoutRecord>(value) {
                Ok(record) => record,
                Err(err) => {
                    warn!("Skipping unreadable saved workout: {err}");
                    skipped += 1;
                    continue;
                }
            };
            if !seen.insert(record.id) {
                warn!("Skipping saved workout with duplicate id {}", record.id);
                continue;
            }
            workouts.push(Workout::from(record));
        }
        self.workouts = workouts;

        let highest = self.workouts.iter().map(|w| w.id().get()).max().unwrap_or(0);
        self.last_id = self.last_id.max(highest);
        info!("Loaded {} saved workout(s)", self.workouts.len());
        Ok(skipped)
    }

    /// Validates, builds, persists and appends a new workout.
    /// # Errors
    /// - `StoreError::Validation` for non-finite or non-positive input.
    /// - `StoreError::Storage` / `StoreError::Serialize` if saving fails.
    pub fn create(
        &mut self,
        coords: Coordinates,
        distance_km: f64,
        duration_min: f64,
        params: KindParams,
    ) -> Result<Workout, StoreError> {
        self.create_at(Utc::now(), coords, distance_km, duration_min, params)
    }

    /// `create` with an explicit timestamp.
    /// # Errors
    /// See `create`.
    pub fn create_at(
        &mut self,
        created_at: DateTime<Utc>,
        coords: Coordinates,
        distance_km: f64,
        duration_min: f64,
        params: KindParams,
    ) -> Result<Workout, StoreError> {
        let id = self.peek_id(created_at);
        let workout = Workout::new(id, created_at, coords, distance_km, duration_min, params)?;

        persist(
            &mut self.storage,
            self.workouts.iter().chain(std::iter::once(&workout)),
        )?;
        self.last_id = id.get();
        self.workouts.push(workout.clone());
        info!("Created workout {} ({})", workout.id(), workout.label());
        Ok(workout)
    }

    /// Removes the workout with `id`. An unknown id is a no-op.
    /// # Errors
    /// Returns `StoreError` if saving the shortened collection fails.
    pub fn remove(&mut self, id: WorkoutId) -> Result<Option<Workout>, StoreError> {
        let Some(index) = self.position(id) else {
            warn!("Ignoring removal of unknown workout {id}");
            return Ok(None);
        };
        persist(&mut self.storage, self.workouts.iter().filter(|w| w.id() != id))?;
        let removed = self.workouts.remove(index);
        info!("Removed workout {id}");
        Ok(Some(removed))
    }

    /// Empties the collection and the saved state. Returns how many
    /// workouts were dropped. Ids issued so far are never handed out again.
    /// # Errors
    /// Returns `StoreError` if saving the empty collection fails.
    pub fn clear(&mut self) -> Result<usize, StoreError> {
        persist(&mut self.storage, std::iter::empty())?;
        let count = self.workouts.len();
        self.workouts.clear();
        info!("Cleared {count} workout(s)");
        Ok(count)
    }

    /// A re-ordered copy of the collection; the collection itself is untouched.
    #[must_use]
    pub fn sorted_view(&self, order: SortOrder) -> Vec<Workout> {
        let mut view = self.workouts.clone();
        match order {
            SortOrder::Default => {}
            SortOrder::DistanceAsc => {
                view.sort_by(|a, b| a.distance_km().total_cmp(&b.distance_km()));
            }
            SortOrder::DistanceDesc => {
                view.sort_by(|a, b| b.distance_km().total_cmp(&a.distance_km()));
            }
        }
        view
    }

    #[must_use]
    pub fn get(&self, id: WorkoutId) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.id() == id)
    }

    #[must_use]
    pub fn position(&self, id: WorkoutId) -> Option<usize> {
        self.workouts.iter().position(|w| w.id() == id)
    }

    #[must_use]
    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.workouts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty()
    }

    /// Bounding box of every workout location, `None` when empty.
    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.workouts.iter().map(Workout::coords))
    }

    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// The id the next created workout gets. Only a successful create claims it.
    fn peek_id(&self, created_at: DateTime<Utc>) -> WorkoutId {
        let millis = u64::try_from(created_at.timestamp_millis()).unwrap_or(0);
        WorkoutId::new(millis.max(self.last_id.saturating_add(1)))
    }
}

fn persist<'a, S: Storage>(
    storage: &mut S,
    workouts: impl IntoIterator<Item = &'a Workout>,
) -> Result<(), StoreError> {
    let records: Vec<WorkoutRecord> = workouts.into_iter().map(WorkoutRecord::from).collect();
    let json = serde_json::to_string(&records).map_err(StoreError::Serialize)?;
    storage.set_item(WORKOUTS_KEY, &json)?;
    Ok(())
}

// mapty-lib/src/geolocation.rs
use crate::config::Config;
use crate::workout::{Coordinates, CoordinatesError};
use thiserror::Error;

const LOCATION_ENV_VAR: &str = "MAPTY_LOCATION";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Could not get your position. Set `home_location` in the config or MAPTY_LOCATION=\"LAT,LNG\".")]
    Unavailable,
    #[error("Could not get your position: {0}")]
    InvalidFix(#[from] CoordinatesError),
}

/// One-shot source of the user's position.
pub trait Geolocator {
    /// # Errors
    /// Returns `Error` when no position can be determined.
    fn current_position(&self) -> Result<Coordinates, Error>;
}

/// Position taken from `MAPTY_LOCATION`, falling back to the configured
/// home location.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredLocation {
    home: Option<Coordinates>,
}

impl ConfiguredLocation {
    #[must_use]
    pub const fn new(home: Option<Coordinates>) -> Self {
        Self { home }
    }

    #[must_use]
    pub const fn from_config(config: &Config) -> Self {
        Self::new(config.home_location)
    }
}

impl Geolocator for ConfiguredLocation {
    fn current_position(&self) -> Result<Coordinates, Error> {
        if let Ok(raw) = std::env::var(LOCATION_ENV_VAR) {
            return raw.parse::<Coordinates>().map_err(Error::from);
        }
        self.home
            .ok_or(Error::Unavailable)
            .and_then(|home| home.validated().map_err(Error::from))
    }
}

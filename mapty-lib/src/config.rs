// mapty-lib/src/config.rs
use crate::store::SortOrder;
use crate::workout::Coordinates;
use comfy_table::Color;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;
use thiserror::Error;

const CONFIG_FILE_NAME: &str = "config.toml";
const APP_CONFIG_DIR: &str = "mapty";
const CONFIG_ENV_VAR: &str = "MAPTY_CONFIG_DIR"; // Environment variable name

pub const MIN_ZOOM: u8 = 1;
pub const MAX_ZOOM: u8 = 18;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Could not determine configuration directory.")]
    CannotDetermineConfigDir,
    #[error("I/O error accessing config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file (TOML): {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Failed to serialize config data (TOML): {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Invalid color name: {0}")]
    InvalidColor(String),
    #[error("Zoom level must be between 1 and 18, got {0}.")]
    InvalidZoomLevel(u8),
    #[error("Focus radius must be a positive number of meters, got {0}.")]
    InvalidFocusRadius(f64),
    #[error("Invalid home location: {0}")]
    InvalidHomeLocation(#[from] crate::workout::CoordinatesError),
}

// Define standard colors using strum for easy iteration/parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum StandardColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    DarkGrey,
    DarkRed,
    DarkGreen,
    DarkYellow,
    DarkBlue,
    DarkMagenta,
    DarkCyan,
    Grey,
}

impl From<StandardColor> for Color {
    fn from(value: StandardColor) -> Self {
        match value {
            StandardColor::Black => Self::Black,
            StandardColor::Red => Self::Red,
            StandardColor::Green => Self::Green,
            StandardColor::Yellow => Self::Yellow,
            StandardColor::Blue => Self::Blue,
            StandardColor::Magenta => Self::Magenta,
            StandardColor::Cyan => Self::Cyan,
            StandardColor::White => Self::White,
            StandardColor::DarkGrey => Self::DarkGrey,
            StandardColor::DarkRed => Self::DarkRed,
            StandardColor::DarkGreen => Self::DarkGreen,
            StandardColor::DarkYellow => Self::DarkYellow,
            StandardColor::DarkBlue => Self::DarkBlue,
            StandardColor::DarkMagenta => Self::DarkMagenta,
            StandardColor::DarkCyan => Self::DarkCyan,
            StandardColor::Grey => Self::Grey,
        }
    }
}

/// Case-insensitive lookup of a colour name such as "darkcyan".
/// # Errors
/// Returns `Error::InvalidColor` for unknown names.
pub fn parse_color(color_str: &str) -> Result<StandardColor, Error> {
    StandardColor::iter()
        .find(|color| format!("{color:?}").eq_ignore_ascii_case(color_str))
        .ok_or_else(|| Error::InvalidColor(color_str.to_string()))
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Theme {
    pub header_color: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            header_color: "Green".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)] // Missing keys fall back to defaults
pub struct Config {
    pub map_zoom_level: u8,
    pub focus_radius_m: f64,
    pub show_route: bool,
    /// Stands in for the browser's geolocation fix.
    pub home_location: Option<Coordinates>,
    pub default_sort: SortOrder,
    pub theme: Theme,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            map_zoom_level: 13,
            focus_radius_m: 120.0,
            show_route: false,
            home_location: None,
            default_sort: SortOrder::Default,
            theme: Theme::default(),
        }
    }
}

impl Config {
    /// # Errors
    /// Returns `Error::InvalidZoomLevel` outside `MIN_ZOOM..=MAX_ZOOM`.
    pub fn set_zoom_level(&mut self, level: u8) -> Result<(), Error> {
        if !(MIN_ZOOM..=MAX_ZOOM).contains(&level) {
            return Err(Error::InvalidZoomLevel(level));
        }
        self.map_zoom_level = level;
        Ok(())
    }

    /// # Errors
    /// Returns `Error::InvalidFocusRadius` unless `radius_m` is finite and positive.
    pub fn set_focus_radius(&mut self, radius_m: f64) -> Result<(), Error> {
        if !radius_m.is_finite() || radius_m <= 0.0 {
            return Err(Error::InvalidFocusRadius(radius_m));
        }
        self.focus_radius_m = radius_m;
        Ok(())
    }

    /// # Errors
    /// Returns `Error::InvalidHomeLocation` for out-of-range coordinates.
    pub fn set_home_location(&mut self, home: Option<Coordinates>) -> Result<(), Error> {
        self.home_location = home.map(Coordinates::validated).transpose()?;
        Ok(())
    }
}

/// Determines the path to the configuration file.
/// # Errors
/// Returns `Error` if no config directory exists or it cannot be created.
pub fn get_config_path() -> Result<PathBuf, Error> {
    let config_dir_path = match std::env::var(CONFIG_ENV_VAR) {
        Ok(path_str) => PathBuf::from(path_str),
        Err(_) => dirs::config_dir()
            .ok_or(Error::CannotDetermineConfigDir)?
            .join(APP_CONFIG_DIR),
    };

    if !config_dir_path.exists() {
        fs::create_dir_all(&config_dir_path)?;
    }

    Ok(config_dir_path.join(CONFIG_FILE_NAME))
}

/// Loads the configuration, writing the defaults out first if the file
/// does not exist yet.
/// # Errors
/// Returns `Error` if the file cannot be read, parsed or created.
pub fn load(config_path: &Path) -> Result<Config, Error> {
    if config_path.exists() {
        let config_content = fs::read_to_string(config_path)?;
        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    } else {
        let default_config = Config::default();
        save(config_path, &default_config)?;
        Ok(default_config)
    }
}

/// # Errors
/// Returns `Error` if the file cannot be serialized or written.
pub fn save(config_path: &Path, config: &Config) -> Result<(), Error> {
    if let Some(parent_dir) = config_path.parent() {
        if !parent_dir.exists() {
            fs::create_dir_all(parent_dir)?;
        }
    }
    let config_content = toml::to_string_pretty(config)?;
    fs::write(config_path, config_content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_use_defaults() {
        let config: Config = toml::from_str("show_route = true\nhome_location = [52.52, 13.405]\n").unwrap();
        assert!(config.show_route);
        assert_eq!(config.map_zoom_level, 13);
        assert_eq!(config.home_location, Some(Coordinates::new(52.52, 13.405)));
        assert_eq!(config.default_sort, SortOrder::Default);
    }

    #[test]
    fn round_trips_through_toml() {
        let mut config = Config::default();
        config.set_home_location(Some(Coordinates::new(48.85, 2.35))).unwrap();
        config.default_sort = SortOrder::DistanceDesc;
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("distance-desc"));
        assert_eq!(toml::from_str::<Config>(&text).unwrap(), config);
    }

    #[test]
    fn rejects_bad_settings() {
        let mut config = Config::default();
        assert!(matches!(config.set_zoom_level(0), Err(Error::InvalidZoomLevel(0))));
        assert!(config.set_focus_radius(-1.0).is_err());
        assert!(config.set_home_location(Some(Coordinates::new(120.0, 0.0))).is_err());
        assert!(parse_color("darkcyan").is_ok());
        assert!(parse_color("chartreuse").is_err());
    }
}

use serde::Deserialize;
use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::iter::FromIterator;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, ErrorKind, Result};
use crate::store::FileStorage;

const CONFIG_PATH_ENV_VAR: &str = "SHIFTCAL_CONFIG_FILE";

pub(crate) fn find_configfile_locations() -> io::Result<Vec<PathBuf>> {
    let config_env: Option<PathBuf> = if let Ok(path) = env::var(CONFIG_PATH_ENV_VAR) {
        Some(PathBuf::from(path))
    } else {
        None
    };

    let home = if let Some(dir) = dirs::home_dir() {
        dir
    } else {
        return Err(io::Error::new(
            io::ErrorKind::Other,
            "Unable to find home directory",
        ));
    };

    let home_config = PathBuf::from_iter([&home, &PathBuf::from(".shiftcal.toml")].iter());

    let config_xdg = if let Ok(dir) = env::var("XDG_CONFIG_HOME") {
        PathBuf::from_iter([dir, "shiftcal".to_string(), "config.toml".to_string()].iter())
    } else {
        PathBuf::from_iter(
            [
                home.as_path(),
                Path::new(".config"),
                Path::new("shiftcal"),
                Path::new("config.toml"),
            ]
            .iter(),
        )
    };

    let mut locations = vec![config_xdg, home_config];

    if let Some(path) = config_env {
        locations.insert(0, path);
    }

    Ok(locations)
}

/// Display density of the calendar grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Density {
    Small,
    #[default]
    Medium,
    Large,
}

impl Density {
    pub fn cell_width(&self) -> usize {
        match self {
            Density::Small => 7,
            Density::Medium => 9,
            Density::Large => 12,
        }
    }

    pub fn months_per_row(&self) -> usize {
        match self {
            Density::Small => 4,
            Density::Medium => 3,
            Density::Large => 2,
        }
    }
}

impl FromStr for Density {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "small" => Ok(Density::Small),
            "medium" => Ok(Density::Medium),
            "large" => Ok(Density::Large),
            other => Err(Error::new(
                ErrorKind::InputValidation,
                &format!("unknown size '{}', expected small, medium or large", other),
            )),
        }
    }
}

impl fmt::Display for Density {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Density::Small => write!(f, "small"),
            Density::Medium => write!(f, "medium"),
            Density::Large => write!(f, "large"),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub density: Density,
    pub storage_path: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
    pub tick_rate_ms: u64,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            density: Density::default(),
            storage_path: None,
            export_dir: None,
            tick_rate_ms: 500,
        }
    }
}

impl Config {
    pub fn from_str(s: &str) -> Result<Config> {
        Ok(toml::from_str(s)?)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }

    pub fn storage_path(&self) -> PathBuf {
        self.storage_path
            .clone()
            .or_else(FileStorage::default_path)
            .unwrap_or_else(|| PathBuf::from(format!("{}.json", crate::store::STORAGE_KEY)))
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Reads `path` if given, otherwise the first existing file among the
/// default locations. Without any config file the defaults are used.
pub fn load_suitable_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        log::info!("Using config file '{}'", path.display());
        return Config::from_str(&fs::read_to_string(path)?);
    }

    let locations = find_configfile_locations().unwrap_or_else(|e| {
        log::warn!("{}", e);
        Vec::new()
    });

    for location in locations {
        if location.is_file() {
            log::info!("Using config file '{}'", location.display());
            return Config::from_str(&fs::read_to_string(&location)?);
        }
    }

    log::info!("No config file found, using defaults");
    Ok(Config::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.density, Density::Medium);
        assert_eq!(config.tick_rate(), Duration::from_millis(500));
        assert!(config.storage_path.is_none());
    }

    #[test]
    fn parses_all_keys() {
        let config = Config::from_str(
            r#"
            density = "large"
            storage_path = "/tmp/shifts.json"
            export_dir = "/tmp/exports"
            tick_rate_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(config.density, Density::Large);
        assert_eq!(config.storage_path(), PathBuf::from("/tmp/shifts.json"));
        assert_eq!(config.export_dir(), PathBuf::from("/tmp/exports"));
        assert_eq!(config.tick_rate_ms, 250);
    }

    #[test]
    fn unknown_density_is_a_config_error() {
        let err = Config::from_str(r#"density = "huge""#).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::ConfigParse));
    }

    #[test]
    fn explicit_config_path_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "density = \"small\"\n").unwrap();

        let config = load_suitable_config(Some(&path)).unwrap();
        assert_eq!(config.density, Density::Small);
    }

    #[test]
    fn density_parses_from_command_argument() {
        assert_eq!("small".parse::<Density>().unwrap(), Density::Small);
        assert_eq!(Density::Large.to_string(), "large");
        assert!("tiny".parse::<Density>().is_err());
    }
}

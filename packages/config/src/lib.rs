#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Configuration for the resilience map dashboard.
//!
//! Defaults are embedded from `config/default.toml` at compile time. A
//! different file can be supplied through `RESILIENCE_CONFIG`, and the
//! `BIND_ADDR`, `PORT` and `ASSETS_DIR` environment variables override the
//! corresponding values of whichever file was loaded.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default configuration baked into the binary.
const DEFAULT_CONFIG_TOML: &str = include_str!("../config/default.toml");

/// Environment variable naming an alternative TOML config file.
pub const CONFIG_PATH_ENV: &str = "RESILIENCE_CONFIG";

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to load.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// TOML was malformed or missing fields.
    #[error("Invalid config TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// A value parsed but is out of its allowed range.
    #[error("Invalid config value: {message}")]
    InvalidValue {
        /// Description of what went wrong.
        message: String,
    },
}

/// Top-level dashboard configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Input data locations.
    pub assets: AssetConfig,
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Proximity and ranking defaults.
    pub analysis: AnalysisConfig,
    /// Page text.
    pub page: PageConfig,
}

/// Locations of the pre-built geospatial files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetConfig {
    /// Directory holding every asset file.
    pub dir: PathBuf,
    /// Intersection graph `GeoJSON` file name.
    pub graph: String,
    /// Police station `GeoJSON` file name.
    pub police: String,
    /// Fire station `GeoJSON` file name.
    pub fire: String,
    /// Intro page illustration file name.
    pub illustration: String,
}

impl AssetConfig {
    /// Full path of the intersection graph file.
    #[must_use]
    pub fn graph_path(&self) -> PathBuf {
        self.dir.join(&self.graph)
    }

    /// Full path of the police station file.
    #[must_use]
    pub fn police_path(&self) -> PathBuf {
        self.dir.join(&self.police)
    }

    /// Full path of the fire station file.
    #[must_use]
    pub fn fire_path(&self) -> PathBuf {
        self.dir.join(&self.fire)
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind.
    pub bind_addr: String,
    /// Port to bind.
    pub port: u16,
    /// Load every data file at startup instead of on first request.
    pub preload: bool,
}

/// Proximity metric and ranking defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Buffer radius around each facility, in meters.
    pub buffer_radius_m: f64,
    /// Initial value of the rank slider.
    pub default_top_n: usize,
    /// Upper bound of the rank slider.
    pub max_top_n: usize,
}

/// Static page text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageConfig {
    /// Dashboard title.
    pub title: String,
    /// Link to the accompanying article.
    pub article_url: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self::from_toml_str(DEFAULT_CONFIG_TOML).expect("embedded default config is valid")
    }
}

impl DashboardConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the TOML is malformed or a value is out
    /// of range.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::de::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or is invalid.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Loads the config named by `RESILIENCE_CONFIG` (or the embedded
    /// defaults) and applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file or an override is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => {
                log::info!("Loading config from {path}");
                Self::from_file(Path::new(&path))?
            }
            Err(_) => Self::from_toml_str(DEFAULT_CONFIG_TOML)?,
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Applies `BIND_ADDR`, `PORT` and `ASSETS_DIR` overrides looked up
    /// through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `PORT` is not a valid port.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(bind_addr) = lookup("BIND_ADDR") {
            self.server.bind_addr = bind_addr;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                message: format!("PORT must be a port number, got {port:?}"),
            })?;
        }
        if let Some(dir) = lookup("ASSETS_DIR") {
            self.assets.dir = PathBuf::from(dir);
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let radius = self.analysis.buffer_radius_m;
        if !radius.is_finite() || radius < 0.0 {
            return Err(ConfigError::InvalidValue {
                message: format!("analysis.buffer_radius_m must be >= 0, got {radius}"),
            });
        }
        if self.analysis.max_top_n == 0 {
            return Err(ConfigError::InvalidValue {
                message: "analysis.max_top_n must be at least 1".to_string(),
            });
        }
        if !(1..=self.analysis.max_top_n).contains(&self.analysis.default_top_n) {
            return Err(ConfigError::InvalidValue {
                message: format!(
                    "analysis.default_top_n must be within 1-{}, got {}",
                    self.analysis.max_top_n, self.analysis.default_top_n
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_defaults_parse() {
        let config = DashboardConfig::from_toml_str(DEFAULT_CONFIG_TOML).unwrap();
        assert!((config.analysis.buffer_radius_m - 500.0).abs() < f64::EPSILON);
        assert_eq!(config.analysis.max_top_n, 100);
        assert_eq!(config.server.port, 8080);
        assert_eq!(
            config.assets.graph_path(),
            Path::new("assets").join("graph_data.geojson")
        );
    }

    #[test]
    fn overrides_replace_values() {
        let mut config = DashboardConfig::default();
        config
            .apply_overrides(|key| match key {
                "PORT" => Some("9000".to_string()),
                "ASSETS_DIR" => Some("/srv/data".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.bind_addr, "127.0.0.1");
        assert_eq!(
            config.assets.fire_path(),
            Path::new("/srv/data").join("fire_station.geojson")
        );
    }

    #[test]
    fn rejects_bad_port_override() {
        let mut config = DashboardConfig::default();
        let result = config.apply_overrides(|key| (key == "PORT").then(|| "http".to_string()));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn rejects_negative_radius() {
        let toml_str = DEFAULT_CONFIG_TOML.replace("buffer_radius_m = 500.0", "buffer_radius_m = -1.0");
        assert!(matches!(
            DashboardConfig::from_toml_str(&toml_str),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn rejects_default_top_n_above_max() {
        let toml_str = DEFAULT_CONFIG_TOML.replace("default_top_n = 1", "default_top_n = 101");
        assert!(DashboardConfig::from_toml_str(&toml_str).is_err());
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = DashboardConfig::from_file(Path::new("does/not/exist.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}

//! Console configuration.
//!
//! Read from `simhome.toml` in the working directory when it exists, then
//! overridden field by field from `SIMHOME_*` variables and `RUST_LOG`.

use std::path::{Path, PathBuf};

use serde::Deserialize;

const CONFIG_FILE: &str = "simhome.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub house: HouseConfig,
    pub bus: BusConfig,
    pub logging: LoggingConfig,
}

/// Where the house layout comes from.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HouseConfig {
    /// JSON layout uploaded at startup. Without it the demo house is used.
    pub layout_file: Option<PathBuf>,
}

/// Refresh bus configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Events buffered per subscriber before it starts lagging.
    pub capacity: usize,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, e.g. `simhome=debug`.
    pub filter: String,
}

impl Config {
    /// Read [`CONFIG_FILE`], apply the environment and validate.
    ///
    /// # Errors
    ///
    /// Fails on an unreadable or malformed file and on invalid values.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file(Path::new(CONFIG_FILE))?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// A missing file yields the defaults.
    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("SIMHOME_LAYOUT") {
            self.house.layout_file = Some(PathBuf::from(path));
        }
        if let Some(capacity) = lookup("SIMHOME_BUS_CAPACITY").and_then(|v| v.parse().ok()) {
            self.bus.capacity = capacity;
        }
        // RUST_LOG wins over SIMHOME_LOG
        if let Some(filter) = lookup("RUST_LOG").or_else(|| lookup("SIMHOME_LOG")) {
            self.logging.filter = filter;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.bus.capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "bus.capacity",
                reason: "must be non-zero",
            });
        }
        if self
            .house
            .layout_file
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            return Err(ConfigError::Invalid {
                field: "house.layout_file",
                reason: "must not be empty",
            });
        }
        Ok(())
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self { capacity: 64 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "simhomectl=info,simhome=info".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("malformed config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("cannot read config file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{field} {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

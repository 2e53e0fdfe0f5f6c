//! Configuration file support for framesnap.
//!
//! Settings are read from `~/.config/framesnap/config.toml` (or a path given on
//! the command line). A missing file means defaults.

pub mod types;

pub use types::{CaptureConfig, MAX_DIMENSION, SceneConfig};

use anyhow::{Context, Result};
use log::{debug, info};
use schemars::{JsonSchema, Schema, schema_for};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};


/// Root configuration deserialized from TOML.
///
/// # Example TOML
/// ```toml
/// [capture]
/// directory = "~/Pictures/framesnap"
/// prefix_timestamp = false
/// with_hdr = true
///
/// [scene]
/// width = 1920
/// height = 1080
/// ```
#[derive(Debug, Serialize, Deserialize, Default, JsonSchema)]
pub struct Config {
    /// Screenshot defaults
    #[serde(default)]
    pub capture: CaptureConfig,

    /// Headless scene used by the command-line tool
    #[serde(default)]
    pub scene: SceneConfig,
}

impl Config {
    fn validate_and_clamp(&mut self) {
        self.scene.clamp_size();
    }

    /// Returns the path to the configuration file.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("framesnap");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from the default path, or returns defaults if not found.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Loads configuration from `config_path`, or returns defaults if it does not exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or is not valid TOML.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

        config.validate_and_clamp();

        info!("Loaded config from {}", config_path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// JSON schema of the configuration file.
    pub fn json_schema() -> Schema {
        schema_for!(Config)
    }
}

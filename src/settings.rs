//! Runtime settings: built-in defaults, config files, `WELLS_*` environment
//! variables and command-line overrides, in increasing priority.
use crate::api::{DEFAULT_API_ROOT, DEFAULT_TIMEOUT_MS};
use crate::error::SettingsError;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Settings {
    #[serde(default)]
    pub api_key: String,
    pub timeout_ms: u64,
    pub api_root: String,
}

/// Values given on the command line; `None` leaves lower layers in charge.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_key: Option<String>,
    pub timeout_ms: Option<u64>,
    pub api_root: Option<String>,
}

/// Config files consulted when present, lowest priority first.
pub fn default_config_files() -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        files.push(dir.join("well-search").join("config.toml"));
    }
    files.push(PathBuf::from("wells.toml"));
    files
}

impl Settings {
    /// Load from the default files plus an optional required `explicit` file.
    pub fn load(explicit: Option<&Path>, overrides: &Overrides) -> Result<Self, SettingsError> {
        let mut builder = Config::builder()
            .set_default("timeout_ms", DEFAULT_TIMEOUT_MS)?
            .set_default("api_root", DEFAULT_API_ROOT)?;

        for path in default_config_files() {
            builder = builder.add_source(File::from(path).required(false));
        }
        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(Environment::with_prefix("WELLS").try_parsing(true));

        builder = builder
            .set_override_option("api_key", overrides.api_key.clone())?
            .set_override_option("timeout_ms", overrides.timeout_ms)?
            .set_override_option("api_root", overrides.api_root.clone())?;

        let settings: Settings = builder.build()?.try_deserialize()?;
        if settings.api_key.trim().is_empty() {
            return Err(SettingsError::MissingApiKey);
        }
        Ok(settings)
    }
}

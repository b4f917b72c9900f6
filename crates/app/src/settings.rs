use serde::Deserialize;

use crate::{cli::Overrides, error::Result};

const DEFAULT_CONFIG_PATH: &str = "config/tally.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub base_url: String,
    pub session_file: String,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            session_file: "config/tally_session.json".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Defaults, then the TOML file, then `TALLY_*` variables, then CLI flags.
pub fn load(overrides: &Overrides) -> Result<Settings> {
    let config_path = overrides.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let settings: Settings = config::Config::builder()
        .add_source(config::File::with_name(config_path).required(false))
        .add_source(config::Environment::with_prefix("TALLY"))
        .build()?
        .try_deserialize()?;

    Ok(apply(settings, overrides))
}

fn apply(mut settings: Settings, overrides: &Overrides) -> Settings {
    if let Some(base_url) = &overrides.base_url {
        settings.base_url = base_url.clone();
    }
    if let Some(session_file) = &overrides.session_file {
        settings.session_file = session_file.clone();
    }
    if let Some(log_level) = &overrides.log_level {
        settings.log_level = log_level.clone();
    }
    settings
}

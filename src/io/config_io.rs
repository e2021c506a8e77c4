use std::fs;
use std::path::{Path, PathBuf};

use crate::model::AppConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Load the config file. A missing file is `Ok(None)`.
pub fn load_config(path: &Path) -> Result<Option<AppConfig>, ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    let config = toml::from_str(&text).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(Some(config))
}

/// Load the config file, falling back to defaults when it is missing or
/// unusable. A bad config never stops the task list from opening; the error
/// comes back alongside the defaults so it can be reported once logging is
/// up (the log level itself comes from the config).
pub fn read_config_from(path: &Path) -> (AppConfig, Option<ConfigError>) {
    match load_config(path) {
        Ok(config) => (config.unwrap_or_default(), None),
        Err(e) => (AppConfig::default(), Some(e)),
    }
}

/// Load the config from its default location.
pub fn read_config() -> (AppConfig, Option<ConfigError>) {
    read_config_from(&crate::io::paths::config_path())
}

use std::path::{Path, PathBuf};

use crate::model::AppConfig;

/// Directory name under the user data dir, shared with the panel applet.
pub const APP_DIR_NAME: &str = "task-tab-applet";

/// Environment variable that overrides the data directory
pub const DATA_DIR_ENV: &str = "TASKTAB_DATA_DIR";

/// `$XDG_CONFIG_HOME/tasktab/config.toml`
pub fn config_path() -> PathBuf {
    let config_dir = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(".config"));
    config_dir.join("tasktab").join("config.toml")
}

/// `$XDG_DATA_HOME/task-tab-applet`, falling back to `~/.local/share`
pub fn default_data_dir() -> PathBuf {
    let data_home = std::env::var_os("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(".local").join("share"));
    data_home.join(APP_DIR_NAME)
}

fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/"))
}

/// Resolve the data directory: command-line flag, then `TASKTAB_DATA_DIR`,
/// then the config file, then the XDG default.
pub fn resolve_data_dir(flag: Option<&Path>, config: &AppConfig) -> PathBuf {
    let env = std::env::var_os(DATA_DIR_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);
    pick_data_dir(flag, env, config).unwrap_or_else(default_data_dir)
}

fn pick_data_dir(flag: Option<&Path>, env: Option<PathBuf>, config: &AppConfig) -> Option<PathBuf> {
    flag.map(Path::to_path_buf)
        .or(env)
        .or_else(|| config.storage.data_dir.clone())
}

/// Full path of the task file inside `data_dir`
pub fn task_file(data_dir: &Path, config: &AppConfig) -> PathBuf {
    data_dir.join(&config.storage.file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_dir(dir: &str) -> AppConfig {
        let mut config = AppConfig::default();
        config.storage.data_dir = Some(PathBuf::from(dir));
        config
    }

    #[test]
    fn flag_wins() {
        let config = config_with_dir("/from/config");
        let dir = pick_data_dir(
            Some(Path::new("/from/flag")),
            Some(PathBuf::from("/from/env")),
            &config,
        );
        assert_eq!(dir, Some(PathBuf::from("/from/flag")));
    }

    #[test]
    fn env_beats_config() {
        let config = config_with_dir("/from/config");
        let dir = pick_data_dir(None, Some(PathBuf::from("/from/env")), &config);
        assert_eq!(dir, Some(PathBuf::from("/from/env")));
    }

    #[test]
    fn config_used_last() {
        let config = config_with_dir("/from/config");
        assert_eq!(
            pick_data_dir(None, None, &config),
            Some(PathBuf::from("/from/config"))
        );
        assert_eq!(pick_data_dir(None, None, &AppConfig::default()), None);
    }

    #[test]
    fn default_dir_ends_with_app_name() {
        assert!(default_data_dir().ends_with(APP_DIR_NAME));
    }

    #[test]
    fn task_file_uses_configured_name() {
        let mut config = AppConfig::default();
        assert_eq!(
            task_file(Path::new("/d"), &config),
            PathBuf::from("/d/tasks.json")
        );
        config.storage.file_name = "todo.json".into();
        assert_eq!(
            task_file(Path::new("/d"), &config),
            PathBuf::from("/d/todo.json")
        );
    }
}

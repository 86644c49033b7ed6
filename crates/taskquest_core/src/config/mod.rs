use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "TASKQUEST_CONFIG_PATH";

pub const DEFAULT_MAX_ACTIVE_TASKS: usize = 10;

fn default_max_active_tasks() -> usize {
    DEFAULT_MAX_ACTIVE_TASKS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Reopening a task is refused once this many tasks are unfinished.
    #[serde(default = "default_max_active_tasks")]
    pub max_active_tasks: usize,
    /// Offset used for day and week boundaries; the system offset when unset.
    #[serde(default)]
    pub utc_offset_minutes: Option<i16>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_active_tasks: DEFAULT_MAX_ACTIVE_TASKS,
            utc_offset_minutes: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub max_active_tasks: Option<usize>,
    pub utc_offset_minutes: Option<i16>,
}

impl ConfigOverrides {
    /// Applies one `KEY=VALUE` pair. Keys are matched case-insensitively with
    /// `-` and `_` treated alike.
    pub fn apply(&mut self, raw: &str) -> Result<(), AppError> {
        let (key_raw, value_raw) = raw
            .trim()
            .split_once('=')
            .ok_or_else(|| AppError::invalid_input("override must be in KEY=VALUE format"))?;
        let key = canonical_key(key_raw)
            .ok_or_else(|| AppError::invalid_input("override key cannot be empty"))?;
        let value = value_raw.trim();

        match key.as_str() {
            "max_active_tasks" => {
                let parsed = value.parse::<usize>().map_err(|_| {
                    AppError::invalid_input("max_active_tasks must be a non-negative integer")
                })?;
                self.max_active_tasks = Some(parsed);
            }
            "utc_offset_minutes" => {
                let parsed = value.parse::<i16>().map_err(|_| {
                    AppError::invalid_input("utc_offset_minutes must be an integer")
                })?;
                self.utc_offset_minutes = Some(parsed);
            }
            other => {
                return Err(AppError::invalid_input(format!(
                    "unknown config field '{other}'"
                )));
            }
        }

        Ok(())
    }
}

fn canonical_key(raw: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata)
            .join("taskquest")
            .join(CONFIG_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("taskquest")
            .join(CONFIG_FILE_NAME))
    }
}

pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(max_active_tasks) = overrides.max_active_tasks {
        merged.max_active_tasks = max_active_tasks;
    }
    if let Some(minutes) = overrides.utc_offset_minutes {
        merged.utc_offset_minutes = Some(minutes);
    }
    merged
}

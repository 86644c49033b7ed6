use crate::error::AppError;
use crate::model::{Challenge, Task, User};
use crate::storage::{Snapshot, Store};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const SCHEMA_VERSION: u32 = 1;
const STORE_FILE_NAME: &str = "store.json";
const STORE_ENV_VAR: &str = "TASKQUEST_STORE_PATH";

#[derive(Debug, Serialize, Deserialize)]
struct StoredState {
    schema_version: u32,
    #[serde(default)]
    tasks: Vec<Task>,
    #[serde(default)]
    user: Option<User>,
    #[serde(default)]
    challenges: Vec<Challenge>,
}

/// Snapshot kept as one pretty-printed JSON document.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self::new(store_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Store for JsonStore {
    fn load(&self) -> Result<Snapshot, AppError> {
        load_state(&self.path)
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), AppError> {
        save_state(&self.path, snapshot)
    }
}

pub fn store_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(STORE_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata)
            .join("taskquest")
            .join(STORE_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("taskquest")
            .join(STORE_FILE_NAME))
    }
}

pub fn load_state(path: &Path) -> Result<Snapshot, AppError> {
    if !path.exists() {
        return Ok(Snapshot::default());
    }

    let content = std::fs::read_to_string(path).map_err(|err| AppError::io(err.to_string()))?;
    let stored: StoredState =
        serde_json::from_str(&content).map_err(|err| AppError::invalid_data(err.to_string()))?;

    if !(1..=SCHEMA_VERSION).contains(&stored.schema_version) {
        return Err(AppError::invalid_data("schema_version mismatch"));
    }

    validate(&stored)?;

    Ok(Snapshot {
        tasks: stored.tasks,
        user: stored.user,
        challenges: stored.challenges,
    })
}

fn validate(stored: &StoredState) -> Result<(), AppError> {
    let mut task_ids = HashSet::new();
    for task in &stored.tasks {
        if !task_ids.insert(task.id.as_str()) {
            return Err(AppError::invalid_data(format!(
                "duplicate task id {}",
                task.id
            )));
        }
    }

    if let Some(user) = stored.user.as_ref()
        && user.level == 0
    {
        return Err(AppError::invalid_data("user level must be at least 1"));
    }

    let mut challenge_ids = HashSet::new();
    for challenge in &stored.challenges {
        if !challenge_ids.insert(challenge.id.as_str()) {
            return Err(AppError::invalid_data(format!(
                "duplicate challenge id {}",
                challenge.id
            )));
        }
        if challenge.current_progress > challenge.goal {
            return Err(AppError::invalid_data(format!(
                "challenge {} progress exceeds its goal",
                challenge.id
            )));
        }
        if challenge.start_date >= challenge.end_date {
            return Err(AppError::invalid_data(format!(
                "challenge {} ends before it starts",
                challenge.id
            )));
        }
    }

    Ok(())
}

pub fn save_state(path: &Path, snapshot: &Snapshot) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| AppError::io(err.to_string()))?;
    }

    let stored = StoredState {
        schema_version: SCHEMA_VERSION,
        tasks: snapshot.tasks.clone(),
        user: snapshot.user.clone(),
        challenges: snapshot.challenges.clone(),
    };
    let content = serde_json::to_string_pretty(&stored)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    std::fs::write(path, content).map_err(|err| AppError::io(err.to_string()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions).map_err(|err| AppError::io(err.to_string()))?;
    }

    Ok(())
}

use crate::error::AppError;
use crate::model::{Challenge, Task, User};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub mod json_store;

pub use json_store::JsonStore;

/// Everything the application persists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub challenges: Vec<Challenge>,
}

pub trait Store {
    fn load(&self) -> Result<Snapshot, AppError>;

    fn save(&self, snapshot: &Snapshot) -> Result<(), AppError>;
}

/// In-process store. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    saved: Rc<RefCell<Snapshot>>,
    saves: Rc<Cell<usize>>,
    fail_saves: Rc<Cell<bool>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        let store = Self::default();
        store.saved.replace(snapshot);
        store
    }

    /// Makes every following save fail until switched off again.
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.set(fail);
    }

    pub fn saved(&self) -> Snapshot {
        self.saved.borrow().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

impl Store for MemoryStore {
    fn load(&self) -> Result<Snapshot, AppError> {
        Ok(self.saved())
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), AppError> {
        if self.fail_saves.get() {
            return Err(AppError::io("memory store is read-only"));
        }
        self.saved.replace(snapshot.clone());
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

//! The context handed to the presentation layer.
//!
//! A `Session` owns the in-memory model for one profile. Mutations update
//! memory first and then save the whole snapshot; a failed save is logged and
//! the in-memory state stays authoritative for the rest of the session.

use crate::calendar::{self, DaySummary};
use crate::challenge_engine::{self, RefreshReport};
use crate::clock::Clock;
use crate::config::Config;
use crate::error::AppError;
use crate::ledger;
use crate::model::{Challenge, ChallengeKind, Priority, Task, TaskFilter, User};
use crate::period;
use crate::storage::{Snapshot, Store};
use crate::task_store::{self, Transition};
use std::rc::Rc;
use time::{Date, Month, OffsetDateTime, UtcOffset};
use tracing::{debug, warn};

pub struct Session {
    store: Box<dyn Store>,
    clock: Rc<dyn Clock>,
    config: Config,
    offset: UtcOffset,
    state: Snapshot,
}

impl Session {
    pub fn open(
        store: Box<dyn Store>,
        clock: Rc<dyn Clock>,
        config: Config,
    ) -> Result<Self, AppError> {
        let offset = period::resolve_offset(config.utc_offset_minutes)?;
        let state = store.load()?;
        debug!(
            tasks = state.tasks.len(),
            challenges = state.challenges.len(),
            "session opened"
        );
        Ok(Self {
            store,
            clock,
            config,
            offset,
            state,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn offset(&self) -> UtcOffset {
        self.offset
    }

    /// Current time in the session's offset.
    pub fn now(&self) -> OffsetDateTime {
        self.clock.now().to_offset(self.offset)
    }

    pub fn today(&self) -> Date {
        self.now().date()
    }

    fn persist(&self, what: &str) {
        if let Err(err) = self.store.save(&self.state) {
            warn!(error = %err, "failed to save {what}");
        }
    }

    pub fn create_task(
        &mut self,
        title: &str,
        due_by: OffsetDateTime,
        priority: Priority,
    ) -> Result<Task, AppError> {
        let now = self.now();
        let task = task_store::create(&mut self.state.tasks, title, due_by, priority, now)?;
        self.persist("new task");
        Ok(task)
    }

    /// Flips a task's completion and books the XP change on the profile.
    ///
    /// Reopening is refused while the number of unfinished tasks is already
    /// at `max_active_tasks`.
    pub fn toggle_task(&mut self, id: &str) -> Result<Task, AppError> {
        let index = task_store::position(&self.state.tasks, id)?;
        if self.state.tasks[index].is_completed
            && self.active_task_count() >= self.config.max_active_tasks
        {
            return Err(AppError::capacity("task limit reached"));
        }

        let now = self.now();
        let transition = task_store::toggle(&mut self.state.tasks[index], now);
        let user = ensure_user(&mut self.state.user, now);
        match transition {
            Transition::Completed => ledger::on_task_completed(user),
            Transition::Reopened => ledger::on_task_uncompleted(user),
        }

        let task = self.state.tasks[index].clone();
        self.persist("task completion");
        Ok(task)
    }

    pub fn delete_task(&mut self, id: &str) -> Result<Task, AppError> {
        let removed = task_store::delete(&mut self.state.tasks, id)?;
        self.persist("task deletion");
        Ok(removed)
    }

    pub fn get_task(&self, id: &str) -> Result<Task, AppError> {
        task_store::get(&self.state.tasks, id).cloned()
    }

    pub fn list_tasks(&self, filter: TaskFilter) -> Vec<Task> {
        task_store::list(&self.state.tasks, filter)
    }

    pub fn active_task_count(&self) -> usize {
        task_store::active_count(&self.state.tasks)
    }

    pub fn parse_due_by(&self, raw: &str) -> Result<OffsetDateTime, AppError> {
        task_store::parse_due_by(raw, self.offset)
    }

    /// The profile, created on first access.
    pub fn user(&mut self) -> User {
        if self.state.user.is_none() {
            let now = self.now();
            ensure_user(&mut self.state.user, now);
            self.persist("new profile");
        }
        self.state.user.clone().unwrap_or_else(|| User::new(self.now()))
    }

    /// Promotes the profile for every full 100 XP. Returns levels gained.
    pub fn check_level_up(&mut self) -> u32 {
        let now = self.now();
        let gained = ledger::check_level_up(ensure_user(&mut self.state.user, now));
        self.persist("level");
        gained
    }

    /// What the profile screen shows: pending level-ups applied first.
    pub fn profile(&mut self) -> User {
        self.check_level_up();
        self.user()
    }

    pub fn award_xp(&mut self, amount: u32) -> User {
        let now = self.now();
        let user = ensure_user(&mut self.state.user, now);
        ledger::award_xp(user, amount);
        let snapshot = user.clone();
        self.persist("xp award");
        snapshot
    }

    pub fn rename_user(&mut self, name: &str) -> Result<User, AppError> {
        let now = self.now();
        let user = ensure_user(&mut self.state.user, now);
        ledger::rename(user, name)?;
        let snapshot = user.clone();
        self.persist("profile name");
        Ok(snapshot)
    }

    pub fn select_avatar(&mut self, avatar_id: &str) -> Result<User, AppError> {
        let now = self.now();
        let user = ensure_user(&mut self.state.user, now);
        ledger::select_avatar(user, avatar_id)?;
        let snapshot = user.clone();
        self.persist("avatar");
        Ok(snapshot)
    }

    /// Expires, generates and recomputes challenges, saving after each phase.
    pub fn refresh_challenges(&mut self) -> RefreshReport {
        let now = self.now();

        let expired = challenge_engine::expire(&mut self.state.challenges, now);
        if expired > 0 {
            self.persist("expired challenges");
        }

        let generated = challenge_engine::generate_if_needed(&mut self.state.challenges, now);
        if generated > 0 {
            self.persist("generated challenges");
        }

        let user = ensure_user(&mut self.state.user, now);
        let completed = challenge_engine::recompute(
            &mut self.state.challenges,
            &self.state.tasks,
            user,
            now,
        );
        self.persist("challenge progress");

        RefreshReport {
            expired,
            generated,
            completed,
        }
    }

    /// Current challenges, daily before weekly, in creation order.
    pub fn challenges(&self) -> Vec<Challenge> {
        let mut listed = Vec::with_capacity(self.state.challenges.len());
        for kind in ChallengeKind::ALL {
            listed.extend(
                self.state
                    .challenges
                    .iter()
                    .filter(|challenge| challenge.kind == kind)
                    .cloned(),
            );
        }
        listed
    }

    pub fn tasks_due_on(&self, date: Date) -> Vec<Task> {
        calendar::tasks_due_on(&self.state.tasks, date, self.offset)
    }

    pub fn day_summary(&self, date: Date) -> DaySummary {
        calendar::day_summary(&self.state.tasks, date, self.offset)
    }

    pub fn month_overview(
        &self,
        year: i32,
        month: Month,
    ) -> Result<Vec<Option<DaySummary>>, AppError> {
        calendar::month_overview(&self.state.tasks, year, month, self.offset)
    }
}

fn ensure_user(user: &mut Option<User>, now: OffsetDateTime) -> &mut User {
    user.get_or_insert_with(|| User::new(now))
}

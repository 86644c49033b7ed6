//! Daily and weekly challenges.
//!
//! A refresh runs expire, generate and recompute in that order. Expiry must
//! come first so a period that just ended is replaced instead of lingering
//! next to the new one.

use crate::ledger;
use crate::model::{Challenge, ChallengeKind, Task, User};
use time::OffsetDateTime;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub expired: usize,
    pub generated: usize,
    /// Challenges that latched to completed during this refresh.
    pub completed: Vec<Challenge>,
}

impl RefreshReport {
    pub fn reward_xp(&self) -> u32 {
        self.completed.iter().map(|challenge| challenge.reward_xp).sum()
    }
}

/// Drops every challenge whose period ended on or before the current period
/// start of its kind.
///
/// Periods are compared as local calendar dates, each bound in the offset it
/// was stored with, so a change of offset never moves a challenge between
/// periods.
pub fn expire(challenges: &mut Vec<Challenge>, now: OffsetDateTime) -> usize {
    let before = challenges.len();
    challenges.retain(|challenge| {
        challenge.end_date.date() > challenge.kind.period_start(now).date()
    });
    let expired = before - challenges.len();
    if expired > 0 {
        debug!(expired, "expired challenges");
    }
    expired
}

/// Instantiates the templates of each kind whose current period has no
/// challenges yet. Calling it again within the same local period is a no-op,
/// whatever the offset of `now`.
pub fn generate_if_needed(challenges: &mut Vec<Challenge>, now: OffsetDateTime) -> usize {
    let mut generated = 0;
    for kind in ChallengeKind::ALL {
        let (start, end) = kind.period_bounds(now);
        let exists = challenges
            .iter()
            .any(|challenge| {
                challenge.kind == kind && challenge.start_date.date() == start.date()
            });
        if exists {
            continue;
        }

        for template in kind.templates() {
            challenges.push(Challenge::from_template(template, kind, start, end));
            generated += 1;
        }
        debug!(%kind, %start, "generated challenges");
    }
    generated
}

/// Number of completed tasks that count toward `challenge` as of `now`.
pub fn qualifying_count(challenge: &Challenge, tasks: &[Task], now: OffsetDateTime) -> u32 {
    let count = tasks
        .iter()
        .filter(|task| task.is_completed)
        .filter(|task| {
            task.completed_at
                .is_some_and(|at| at >= challenge.start_date && at < now)
        })
        .filter(|task| challenge.priority.is_none_or(|priority| task.priority == priority))
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Updates progress on every open challenge and credits the reward of each
/// one that reaches its goal. Returns the newly completed challenges.
///
/// Rewards are credited without a level-up check; callers promote separately.
pub fn recompute(
    challenges: &mut [Challenge],
    tasks: &[Task],
    user: &mut User,
    now: OffsetDateTime,
) -> Vec<Challenge> {
    let mut completed = Vec::new();
    for challenge in challenges.iter_mut().filter(|challenge| !challenge.is_completed) {
        let count = qualifying_count(challenge, tasks, now);
        challenge.current_progress = count.min(challenge.goal);

        if challenge.current_progress >= challenge.goal {
            challenge.is_completed = true;
            ledger::credit_xp(user, challenge.reward_xp);
            info!(
                title = %challenge.title,
                reward_xp = challenge.reward_xp,
                "challenge completed"
            );
            completed.push(challenge.clone());
        }
    }
    completed
}

pub fn refresh(
    challenges: &mut Vec<Challenge>,
    tasks: &[Task],
    user: &mut User,
    now: OffsetDateTime,
) -> RefreshReport {
    let expired = expire(challenges, now);
    let generated = generate_if_needed(challenges, now);
    let completed = recompute(challenges, tasks, user, now);
    RefreshReport {
        expired,
        generated,
        completed,
    }
}

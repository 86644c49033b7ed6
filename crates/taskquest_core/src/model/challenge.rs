use crate::model::Priority;
use crate::period;
use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeKind {
    Daily,
    Weekly,
}

impl ChallengeKind {
    pub const ALL: [ChallengeKind; 2] = [ChallengeKind::Daily, ChallengeKind::Weekly];

    /// Start of the period containing `now`.
    pub fn period_start(self, now: OffsetDateTime) -> OffsetDateTime {
        match self {
            Self::Daily => period::start_of_day(now),
            Self::Weekly => period::start_of_week(now),
        }
    }

    /// Half-open `[start, end)` bounds of the period containing `now`.
    pub fn period_bounds(self, now: OffsetDateTime) -> (OffsetDateTime, OffsetDateTime) {
        match self {
            Self::Daily => (period::start_of_day(now), period::start_of_next_day(now)),
            Self::Weekly => (period::start_of_week(now), period::start_of_next_week(now)),
        }
    }

    pub fn templates(self) -> &'static [ChallengeTemplate] {
        match self {
            Self::Daily => DAILY_TEMPLATES,
            Self::Weekly => WEEKLY_TEMPLATES,
        }
    }
}

impl fmt::Display for ChallengeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily => f.write_str("Daily"),
            Self::Weekly => f.write_str("Weekly"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChallengeTemplate {
    pub title: &'static str,
    pub goal: u32,
    pub reward_xp: u32,
    /// Only completed tasks of this priority count; `None` counts all.
    pub priority: Option<Priority>,
}

pub const DAILY_TEMPLATES: &[ChallengeTemplate] = &[
    ChallengeTemplate {
        title: "Complete 3 tasks today",
        goal: 3,
        reward_xp: 10,
        priority: None,
    },
    ChallengeTemplate {
        title: "Finish 2 medium task",
        goal: 2,
        reward_xp: 15,
        priority: Some(Priority::Medium),
    },
    ChallengeTemplate {
        title: "Complete 5 tasks today",
        goal: 5,
        reward_xp: 20,
        priority: None,
    },
];

pub const WEEKLY_TEMPLATES: &[ChallengeTemplate] = &[
    ChallengeTemplate {
        title: "Complete 20 medium tasks this week",
        goal: 20,
        reward_xp: 50,
        priority: Some(Priority::Medium),
    },
    ChallengeTemplate {
        title: "Finish 5 high priority tasks",
        goal: 5,
        reward_xp: 40,
        priority: Some(Priority::High),
    },
    ChallengeTemplate {
        title: "Complete 30 tasks this week",
        goal: 30,
        reward_xp: 60,
        priority: None,
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: String,
    pub title: String,
    pub kind: ChallengeKind,
    #[serde(with = "time::serde::rfc3339")]
    pub start_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_date: OffsetDateTime,
    pub goal: u32,
    #[serde(default)]
    pub current_progress: u32,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub is_completed: bool,
    pub reward_xp: u32,
}

impl Challenge {
    pub fn from_template(
        template: &ChallengeTemplate,
        kind: ChallengeKind,
        start_date: OffsetDateTime,
        end_date: OffsetDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: template.title.to_string(),
            kind,
            start_date,
            end_date,
            goal: template.goal,
            current_progress: 0,
            priority: template.priority,
            is_completed: false,
            reward_xp: template.reward_xp,
        }
    }
}

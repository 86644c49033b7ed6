mod challenge;
mod task;
mod user;

pub use challenge::{
    Challenge, ChallengeKind, ChallengeTemplate, DAILY_TEMPLATES, WEEKLY_TEMPLATES,
};
pub use task::{Priority, Task, TaskFilter};
pub use user::{AVATARS, Avatar, DEFAULT_USER_NAME, User, find_avatar};

//! XP and level bookkeeping on the single user profile.

use crate::error::AppError;
use crate::model::{User, find_avatar};
use tracing::info;

pub const XP_PER_TASK: u32 = 5;
pub const XP_PER_LEVEL: u32 = 100;

pub fn on_task_completed(user: &mut User) {
    user.tasks_completed = user.tasks_completed.saturating_add(1);
    user.xp = user.xp.saturating_add(XP_PER_TASK);
}

pub fn on_task_uncompleted(user: &mut User) {
    user.tasks_completed = user.tasks_completed.saturating_sub(1);
    user.xp = user.xp.saturating_sub(XP_PER_TASK);
}

/// Promotes once per full 100 XP and returns the number of levels gained.
pub fn check_level_up(user: &mut User) -> u32 {
    let mut gained = 0;
    while user.xp >= XP_PER_LEVEL {
        user.level += 1;
        user.xp -= XP_PER_LEVEL;
        gained += 1;
    }
    if gained > 0 {
        info!(level = user.level, gained, "user leveled up");
    }
    gained
}

/// Adds XP without promoting. Challenge rewards go through here.
pub fn credit_xp(user: &mut User, amount: u32) {
    user.xp = user.xp.saturating_add(amount);
}

pub fn award_xp(user: &mut User, amount: u32) -> u32 {
    credit_xp(user, amount);
    check_level_up(user)
}

pub fn select_avatar(user: &mut User, avatar_id: &str) -> Result<(), AppError> {
    let avatar =
        find_avatar(avatar_id).ok_or_else(|| AppError::invalid_input("avatar not found"))?;
    if !avatar.unlocked_for(user) {
        return Err(AppError::invalid_input(format!(
            "avatar {} unlocks at level {}",
            avatar.id, avatar.required_level
        )));
    }

    user.current_picture = Some(avatar.id.to_string());
    Ok(())
}

pub fn rename(user: &mut User, name: &str) -> Result<(), AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("name is required"));
    }
    user.name = trimmed.to_string();
    Ok(())
}

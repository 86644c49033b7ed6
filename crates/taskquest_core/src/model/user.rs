use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

pub const DEFAULT_USER_NAME: &str = "Player";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub level: u32,
    pub xp: u32,
    pub tasks_completed: u32,
    #[serde(default)]
    pub current_picture: Option<String>,
}

impl User {
    /// A fresh profile: level 1, no XP, nothing completed.
    pub fn new(created_at: OffsetDateTime) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: DEFAULT_USER_NAME.to_string(),
            created_at,
            level: 1,
            xp: 0,
            tasks_completed: 0,
            current_picture: None,
        }
    }

    pub fn avatar(&self) -> Option<&'static Avatar> {
        self.current_picture.as_deref().and_then(find_avatar)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Avatar {
    pub id: &'static str,
    pub emoji: &'static str,
    pub required_level: u32,
}

impl Avatar {
    pub fn unlocked_for(&self, user: &User) -> bool {
        user.level >= self.required_level
    }
}

pub const AVATARS: &[Avatar] = &[
    Avatar {
        id: "wilt",
        emoji: "🥀",
        required_level: 1,
    },
    Avatar {
        id: "star",
        emoji: "💫",
        required_level: 5,
    },
    Avatar {
        id: "ice",
        emoji: "🥶",
        required_level: 10,
    },
    Avatar {
        id: "tired",
        emoji: "🫩",
        required_level: 15,
    },
    Avatar {
        id: "devil",
        emoji: "😈",
        required_level: 20,
    },
    Avatar {
        id: "alien",
        emoji: "👽",
        required_level: 30,
    },
    Avatar {
        id: "goat",
        emoji: "🐐",
        required_level: 40,
    },
];

pub fn find_avatar(id: &str) -> Option<&'static Avatar> {
    let trimmed = id.trim();
    AVATARS.iter().find(|avatar| avatar.id == trimmed)
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
    #[default]
    Medication,
    Reminder,
    System,
}

impl std::fmt::Display for NotificationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Medication => write!(f, "medication"),
            Self::Reminder => write!(f, "reminder"),
            Self::System => write!(f, "system"),
        }
    }
}

impl std::str::FromStr for NotificationCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "medication" => Ok(Self::Medication),
            "reminder" => Ok(Self::Reminder),
            "system" => Ok(Self::System),
            _ => Err(format!("Unknown notification category: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub recipient_user_id: String,
    pub message: String,
    pub category: NotificationCategory,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Per-user push delivery preferences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationSettings {
    pub user_id: String,
    pub telegram_chat_id: Option<String>,
    pub telegram_enabled: bool,
    pub updated_at: DateTime<Utc>,
}

impl NotificationSettings {
    /// Returns the chat id when push delivery is switched on for this user.
    pub fn push_target(&self) -> Option<&str> {
        if !self.telegram_enabled {
            return None;
        }
        self.telegram_chat_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// Telegram chat ids are integers; group chats are negative.
pub fn is_valid_chat_id(chat_id: &str) -> bool {
    let digits = chat_id.strip_prefix('-').unwrap_or(chat_id);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

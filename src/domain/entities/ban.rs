use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why and when a user lost access to the bot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BanRecord {
    pub user: String,
    pub reason: String,
    pub banned_at: DateTime<Utc>,
    pub banned_by: Option<String>,
}

impl BanRecord {
    pub fn new(user: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            reason: reason.into(),
            banned_at: Utc::now(),
            banned_by: None,
        }
    }

    pub fn with_banned_by(mut self, by: impl Into<String>) -> Self {
        self.banned_by = Some(by.into());
        self
    }
}

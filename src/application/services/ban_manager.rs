//! Ban list - the only authorization gate in front of the dispatcher

use std::collections::HashMap;

use crate::application::errors::StorageError;
use crate::domain::entities::{jid, BanRecord};
use crate::domain::traits::BanStore;

/// In-memory ban list with optional write-through persistence
#[derive(Default)]
pub struct BanManager {
    bans: HashMap<String, BanRecord>,
    store: Option<Box<dyn BanStore>>,
}

impl BanManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load existing bans from `store` and persist every later change to it
    pub fn with_store(store: Box<dyn BanStore>) -> Result<Self, StorageError> {
        let bans = store
            .load_bans()?
            .into_iter()
            .map(|record| (jid::normalize_user(&record.user), record))
            .collect();

        Ok(Self {
            bans,
            store: Some(store),
        })
    }

    /// Ban `user`, replacing any earlier record
    pub fn add(&mut self, user: &str, reason: &str, banned_by: Option<&str>) -> &BanRecord {
        let user = jid::normalize_user(user);
        let mut record = BanRecord::new(user.clone(), reason);
        if let Some(by) = banned_by {
            record = record.with_banned_by(jid::normalize_user(by));
        }

        if let Some(store) = &self.store {
            if let Err(e) = store.save_ban(&record) {
                tracing::warn!("Ban for {} is in memory only, persisting failed: {}", user, e);
            }
        }

        tracing::info!("Banned {}: {}", user, reason);
        self.bans.insert(user.clone(), record);
        &self.bans[&user]
    }

    /// Lift a ban. Returns the removed record, if there was one.
    pub fn remove(&mut self, user: &str) -> Option<BanRecord> {
        let user = jid::normalize_user(user);
        let removed = self.bans.remove(&user)?;

        if let Some(store) = &self.store {
            if let Err(e) = store.delete_ban(&user) {
                tracing::warn!("Unban of {} not persisted: {}", user, e);
            }
        }

        tracing::info!("Unbanned {}", user);
        Some(removed)
    }

    pub fn is_banned(&self, user: &str) -> Option<&BanRecord> {
        self.bans.get(&jid::normalize_user(user))
    }

    /// All bans, oldest first
    pub fn list(&self) -> Vec<&BanRecord> {
        let mut records: Vec<&BanRecord> = self.bans.values().collect();
        records.sort_by(|a, b| a.banned_at.cmp(&b.banned_at).then_with(|| a.user.cmp(&b.user)));
        records
    }

    pub fn len(&self) -> usize {
        self.bans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bans.is_empty()
    }
}

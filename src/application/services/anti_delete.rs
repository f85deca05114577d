//! Anti-delete - keeps recent messages so revoked ones can be re-announced

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};

use crate::application::messaging::effects::best_effort;
use crate::application::messaging::templates;
use crate::domain::entities::{DeleteNotice, InboundMessage, MessageKey};
use crate::domain::traits::WaClient;

/// Copy of a message kept for recovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedMessage {
    pub chat_id: String,
    pub sender: String,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

/// Count-bounded message cache, oldest entries evicted first
#[derive(Debug)]
pub struct MessageCache {
    capacity: usize,
    order: VecDeque<String>,
    entries: HashMap<String, CachedMessage>,
}

impl MessageCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            entries: HashMap::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, id: impl Into<String>, message: CachedMessage) {
        let id = id.into();
        if self.entries.insert(id.clone(), message).is_some() {
            // Refreshed in place, keeps its original slot
            return;
        }

        self.order.push_back(id);
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&CachedMessage> {
        self.entries.get(id)
    }

    pub fn take(&mut self, id: &str) -> Option<CachedMessage> {
        let message = self.entries.remove(id)?;
        self.order.retain(|k| k != id);
        Some(message)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Stores inbound messages and replays the ones their sender deletes
pub struct AntiDelete {
    cache: MessageCache,
    enabled: bool,
    recipient: String,
}

impl AntiDelete {
    pub fn new(capacity: usize, enabled: bool, recipient: impl Into<String>) -> Self {
        Self {
            cache: MessageCache::new(capacity),
            enabled,
            recipient: recipient.into(),
        }
    }

    /// Remember a message. Messages without recoverable content are skipped.
    pub fn store(&mut self, message: &InboundMessage) {
        if message.content.is_empty() {
            return;
        }

        self.cache.insert(
            message.key.id.clone(),
            CachedMessage {
                chat_id: message.key.chat_id.clone(),
                sender: message.sender(),
                content: message.content.describe(),
                sent_at: message.timestamp,
            },
        );
    }

    /// Replay every deleted message found in the cache. Returns how many were replayed.
    ///
    /// An entry leaves the cache only once its replay was sent; a failed send is logged
    /// and the remaining keys are still processed.
    pub async fn handle_delete(&mut self, client: &dyn WaClient, notice: &DeleteNotice) -> usize {
        if !self.enabled {
            return 0;
        }

        let keys: &[MessageKey] = match notice {
            DeleteNotice::Keys(keys) => keys,
            DeleteNotice::Chat(chat) => {
                tracing::debug!("Chat {} was cleared, nothing to recover", chat);
                return 0;
            }
        };

        let mut replayed = 0;
        for key in keys {
            let Some(cached) = self.cache.get(&key.id) else {
                tracing::debug!("Deleted message {} is not cached", key.id);
                continue;
            };

            let text = templates::anti_delete_notice(&cached.chat_id, &cached.sender, cached.sent_at, &cached.content);
            let mentions = [cached.sender.clone()];
            if best_effort("anti-delete replay", client.send_text(&self.recipient, &text, None, &mentions))
                .await
                .is_some()
            {
                self.cache.take(&key.id);
                tracing::info!("Recovered deleted message {} from {}", key.id, mentions[0]);
                replayed += 1;
            }
        }

        replayed
    }

    pub fn cache(&self) -> &MessageCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cached(content: &str) -> CachedMessage {
        CachedMessage {
            chat_id: "1@s.whatsapp.net".into(),
            sender: "1@s.whatsapp.net".into(),
            content: content.into(),
            sent_at: Utc::now(),
        }
    }

    #[test]
    fn test_cache_evicts_oldest() {
        let mut cache = MessageCache::new(2);
        cache.insert("a", cached("1"));
        cache.insert("b", cached("2"));
        cache.insert("c", cached("3"));
        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_none());
        assert_eq!(cache.get("c").unwrap().content, "3");
    }

    #[test]
    fn test_cache_refresh_does_not_duplicate() {
        let mut cache = MessageCache::new(2);
        cache.insert("a", cached("1"));
        cache.insert("a", cached("edited"));
        cache.insert("b", cached("2"));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a").unwrap().content, "edited");
    }

    #[test]
    fn test_take_removes_entry() {
        let mut cache = MessageCache::new(4);
        cache.insert("a", cached("1"));
        assert!(cache.take("a").is_some());
        assert!(cache.take("a").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        assert_eq!(MessageCache::new(0).capacity(), 1);
    }

    #[test]
    fn test_store_skips_empty_messages() {
        let mut anti = AntiDelete::new(8, true, "owner@s.whatsapp.net");
        let msg = InboundMessage::new(MessageKey::new("1@s.whatsapp.net", "X"), crate::domain::entities::Content::Empty);
        anti.store(&msg);
        assert!(anti.cache().is_empty());
    }
}

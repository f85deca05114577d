//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use sila_bot::application::context::AppContext;
use sila_bot::application::errors::BotError;
use sila_bot::application::services::{BanManager, FontStyle};
use sila_bot::domain::entities::{MessageKey, Presence};
use sila_bot::domain::traits::WaClient;
use sila_bot::infrastructure::config::Config;
use sila_bot::plugins::builtin::builtin_plugins;
use sila_bot::plugins::PluginRegistry;

pub const OWNER: &str = "255700000001@s.whatsapp.net";
pub const USER: &str = "254711111111@s.whatsapp.net";
pub const GROUP: &str = "120363000000000001@g.us";

/// One outbound call seen by the recording client
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Text { chat: String, text: String, quoted: Option<String>, mentions: Vec<String> },
    Reaction { id: String, emoji: String },
    Read(Vec<String>),
    Presence { chat: String, presence: Presence },
    Bio(String),
    Status(String),
    Follow(String),
    Delete(String),
    Close,
}

#[derive(Default)]
pub struct RecordingClient {
    calls: Mutex<Vec<Call>>,
    fail_sends: bool,
    failing_texts: AtomicUsize,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// A client whose every call fails after being recorded
    pub fn failing() -> Self {
        Self {
            fail_sends: true,
            ..Self::default()
        }
    }

    /// A client whose next `count` text sends fail; everything else succeeds
    pub fn failing_texts(count: usize) -> Self {
        Self {
            failing_texts: AtomicUsize::new(count),
            ..Self::default()
        }
    }

    fn record(&self, call: Call) -> Result<(), BotError> {
        self.calls.lock().unwrap().push(call);
        if self.fail_sends {
            Err(BotError::Network("offline".to_string()))
        } else {
            Ok(())
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// (chat, text) of every sent text
    pub fn texts(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Text { chat, text, .. } => Some((chat, text)),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait]
impl WaClient for RecordingClient {
    async fn send_text(
        &self,
        chat_id: &str,
        text: &str,
        quoted: Option<&MessageKey>,
        mentions: &[String],
    ) -> Result<String, BotError> {
        self.record(Call::Text {
            chat: chat_id.to_string(),
            text: text.to_string(),
            quoted: quoted.map(|k| k.id.clone()),
            mentions: mentions.to_vec(),
        })?;
        let fail_this_one = self
            .failing_texts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if fail_this_one {
            return Err(BotError::Network("blip".to_string()));
        }
        Ok("SENT".to_string())
    }

    async fn send_reaction(&self, key: &MessageKey, emoji: &str) -> Result<(), BotError> {
        self.record(Call::Reaction {
            id: key.id.clone(),
            emoji: emoji.to_string(),
        })
    }

    async fn read_messages(&self, keys: &[MessageKey]) -> Result<(), BotError> {
        self.record(Call::Read(keys.iter().map(|k| k.id.clone()).collect()))
    }

    async fn send_presence(&self, chat_id: &str, presence: Presence) -> Result<(), BotError> {
        self.record(Call::Presence {
            chat: chat_id.to_string(),
            presence,
        })
    }

    async fn update_profile_status(&self, text: &str) -> Result<(), BotError> {
        self.record(Call::Bio(text.to_string()))
    }

    async fn post_status(&self, text: &str) -> Result<(), BotError> {
        self.record(Call::Status(text.to_string()))
    }

    async fn follow_newsletter(&self, jid: &str) -> Result<(), BotError> {
        self.record(Call::Follow(jid.to_string()))
    }

    async fn delete_message(&self, key: &MessageKey) -> Result<(), BotError> {
        self.record(Call::Delete(key.id.clone()))
    }

    async fn close(&self) -> Result<(), BotError> {
        self.record(Call::Close)
    }
}

/// Defaults with plain text output and a known owner
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.bot.font = FontStyle::Plain;
    config.bot.owner = OWNER.to_string();
    config
}

pub fn test_app(config: Config) -> AppContext {
    let (registry, report) = PluginRegistry::load(builtin_plugins(), &config);
    assert!(report.failed.is_empty());
    AppContext::new(config, registry, BanManager::new())
}

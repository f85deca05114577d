use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::application::errors::BotError;
use crate::domain::entities::{MessageKey, Presence, SessionEvent};

/// WaClient trait - outbound calls into the protocol library for one session
#[async_trait]
pub trait WaClient: Send + Sync {
    /// Send a text message, optionally quoting another message. `mentions` lists the jids
    /// tagged with `@user` in the text. Returns the new message id.
    async fn send_text(
        &self,
        chat_id: &str,
        text: &str,
        quoted: Option<&MessageKey>,
        mentions: &[String],
    ) -> Result<String, BotError>;

    /// React to a message with an emoji
    async fn send_reaction(&self, key: &MessageKey, emoji: &str) -> Result<(), BotError>;

    /// Mark messages as read
    async fn read_messages(&self, keys: &[MessageKey]) -> Result<(), BotError>;

    /// Show a chat presence such as typing
    async fn send_presence(&self, chat_id: &str, presence: Presence) -> Result<(), BotError>;

    /// Replace the account's profile "about" text
    async fn update_profile_status(&self, text: &str) -> Result<(), BotError>;

    /// Post a text status to `status@broadcast`
    async fn post_status(&self, text: &str) -> Result<(), BotError>;

    /// Follow a newsletter channel
    async fn follow_newsletter(&self, jid: &str) -> Result<(), BotError>;

    /// Delete a message for everyone
    async fn delete_message(&self, key: &MessageKey) -> Result<(), BotError>;

    /// Tear down the session
    async fn close(&self) -> Result<(), BotError>;
}

/// A bootstrapped session: the outbound client plus its event stream
pub struct Session {
    pub client: Arc<dyn WaClient>,
    pub events: mpsc::Receiver<SessionEvent>,
}

impl Session {
    pub fn new(client: Arc<dyn WaClient>, events: mpsc::Receiver<SessionEvent>) -> Self {
        Self { client, events }
    }
}

/// Connector trait - bootstraps a fresh session, reusing stored credentials when present
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Session, BotError>;

    /// Store refreshed session credentials so the next `connect` can resume
    async fn persist_credentials(&self, _credentials: &str) -> Result<(), BotError> {
        Ok(())
    }

    /// Adapter name for logs
    fn name(&self) -> &str;
}

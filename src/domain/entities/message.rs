use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::jid;

/// Addresses a single message inside a chat
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageKey {
    pub chat_id: String,
    pub from_me: bool,
    pub id: String,
    /// Author of the message inside a group chat
    pub participant: Option<String>,
}

impl MessageKey {
    pub fn new(chat_id: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            from_me: false,
            id: id.into(),
            participant: None,
        }
    }

    pub fn with_participant(mut self, participant: impl Into<String>) -> Self {
        self.participant = Some(participant.into());
        self
    }

    pub fn from_me(mut self) -> Self {
        self.from_me = true;
        self
    }
}

/// Message content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Content {
    /// Plain conversation text
    Text(String),
    /// Extended text: replies, link previews, mentions
    ExtendedText { text: String, mentions: Vec<String> },
    /// Media and everything else, described by kind
    Media { kind: String, caption: Option<String> },
    Empty,
}

impl Content {
    /// Text the dispatcher acts on; media captions are not commands
    pub fn text(&self) -> Option<&str> {
        match self {
            Content::Text(s) => Some(s),
            Content::ExtendedText { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Human-readable rendering, used when replaying deleted messages
    pub fn describe(&self) -> String {
        match self {
            Content::Text(s) => s.clone(),
            Content::ExtendedText { text, .. } => text.clone(),
            Content::Media { kind, caption: Some(caption) } => format!("[{}] {}", kind, caption),
            Content::Media { kind, caption: None } => format!("[{}]", kind),
            Content::Empty => String::new(),
        }
    }

    pub fn mentions(&self) -> &[String] {
        match self {
            Content::ExtendedText { mentions, .. } => mentions,
            _ => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Content::Empty)
    }
}

/// An incoming message delivered by the session
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub key: MessageKey,
    pub content: Content,
    pub timestamp: DateTime<Utc>,
    pub push_name: Option<String>,
}

impl InboundMessage {
    pub fn new(key: MessageKey, content: Content) -> Self {
        Self {
            key,
            content,
            timestamp: Utc::now(),
            push_name: None,
        }
    }

    pub fn from_text(chat_id: impl Into<String>, text: impl Into<String>) -> Self {
        let key = MessageKey::new(chat_id, uuid::Uuid::new_v4().simple().to_string().to_uppercase());
        Self::new(key, Content::Text(text.into()))
    }

    pub fn with_push_name(mut self, name: impl Into<String>) -> Self {
        self.push_name = Some(name.into());
        self
    }

    pub fn chat_id(&self) -> &str {
        &self.key.chat_id
    }

    /// Normalized id of the account that wrote the message
    pub fn sender(&self) -> String {
        let author = self.key.participant.as_deref().unwrap_or(&self.key.chat_id);
        jid::normalize_user(author)
    }

    pub fn text(&self) -> &str {
        self.content.text().unwrap_or("")
    }

    pub fn is_group(&self) -> bool {
        jid::is_group(&self.key.chat_id)
    }
}

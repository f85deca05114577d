//! Console adapter for development/testing
//!
//! Each stdin line arrives as a direct message from the configured user.
//! `:delete` revokes the previous line and `:quit` logs the session out.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::application::errors::BotError;
use crate::domain::entities::{
    jid, ConnectionUpdate, DeleteNotice, DisconnectReason, InboundMessage, MessageKey, Presence, SessionEvent,
};
use crate::domain::traits::{Connector, Session, WaClient};

/// Console client - prints every outbound call
#[derive(Default)]
pub struct ConsoleClient;

#[async_trait]
impl WaClient for ConsoleClient {
    async fn send_text(
        &self,
        chat_id: &str,
        text: &str,
        quoted: Option<&MessageKey>,
        mentions: &[String],
    ) -> Result<String, BotError> {
        if !mentions.is_empty() {
            println!("[BOT -> {}] mentions {}", chat_id, mentions.join(", "));
        }
        match quoted {
            Some(key) => println!("[BOT -> {}] (re {}) {}", chat_id, key.id, text),
            None => println!("[BOT -> {}] {}", chat_id, text),
        }
        Ok(uuid::Uuid::new_v4().simple().to_string().to_uppercase())
    }

    async fn send_reaction(&self, key: &MessageKey, emoji: &str) -> Result<(), BotError> {
        println!("[BOT] reacted {} to {}", emoji, key.id);
        Ok(())
    }

    async fn read_messages(&self, keys: &[MessageKey]) -> Result<(), BotError> {
        tracing::debug!("Marked {} message(s) read", keys.len());
        Ok(())
    }

    async fn send_presence(&self, chat_id: &str, presence: Presence) -> Result<(), BotError> {
        tracing::debug!("Presence {} in {}", presence.as_str(), chat_id);
        Ok(())
    }

    async fn update_profile_status(&self, text: &str) -> Result<(), BotError> {
        println!("[BOT] bio: {}", text);
        Ok(())
    }

    async fn post_status(&self, text: &str) -> Result<(), BotError> {
        println!("[BOT -> {}] {}", jid::STATUS_BROADCAST, text);
        Ok(())
    }

    async fn follow_newsletter(&self, jid: &str) -> Result<(), BotError> {
        println!("[BOT] following {}", jid);
        Ok(())
    }

    async fn delete_message(&self, key: &MessageKey) -> Result<(), BotError> {
        println!("[BOT] deleted {}", key.id);
        Ok(())
    }

    async fn close(&self) -> Result<(), BotError> {
        Ok(())
    }
}

/// What one stdin line means
#[derive(Debug, PartialEq)]
enum ConsoleInput {
    Message(InboundMessage),
    DeleteLast,
    Quit,
    Skip,
}

fn parse_line(line: &str, user: &str) -> ConsoleInput {
    match line.trim() {
        "" => ConsoleInput::Skip,
        ":delete" => ConsoleInput::DeleteLast,
        ":quit" => ConsoleInput::Quit,
        text => ConsoleInput::Message(InboundMessage::from_text(user, text).with_push_name("console")),
    }
}

/// Console connector - opens immediately, no pairing
pub struct ConsoleConnector {
    user: String,
}

impl ConsoleConnector {
    pub fn new(user: impl Into<String>) -> Self {
        Self { user: user.into() }
    }
}

#[async_trait]
impl Connector for ConsoleConnector {
    async fn connect(&self) -> Result<Session, BotError> {
        tracing::info!("Starting console session (dev mode) as {}", self.user);
        let (tx, rx) = mpsc::channel(64);
        tx.send(SessionEvent::Connection(ConnectionUpdate::open()))
            .await
            .map_err(|e| BotError::Internal(e.to_string()))?;

        tokio::spawn(read_stdin(self.user.clone(), tx));
        Ok(Session::new(Arc::new(ConsoleClient), rx))
    }

    fn name(&self) -> &str {
        "console"
    }
}

async fn read_stdin(user: String, tx: mpsc::Sender<SessionEvent>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last: Option<MessageKey> = None;

    loop {
        let line = tokio::select! {
            _ = tx.closed() => return,
            line = lines.next_line() => line,
        };

        let event = match line {
            Ok(Some(line)) => match parse_line(&line, &user) {
                ConsoleInput::Message(message) => {
                    last = Some(message.key.clone());
                    SessionEvent::MessagesUpsert(vec![message])
                }
                ConsoleInput::DeleteLast => match last.take() {
                    Some(key) => SessionEvent::MessagesDelete(DeleteNotice::Keys(vec![key])),
                    None => continue,
                },
                ConsoleInput::Quit => SessionEvent::Connection(ConnectionUpdate::closed(DisconnectReason::LoggedOut)),
                ConsoleInput::Skip => continue,
            },
            Ok(None) => {
                tracing::info!("Console input closed");
                SessionEvent::Connection(ConnectionUpdate::closed(DisconnectReason::LoggedOut))
            }
            Err(e) => {
                tracing::error!("Failed to read console input: {}", e);
                return;
            }
        };

        let terminal = matches!(event, SessionEvent::Connection(_));
        if tx.send(event).await.is_err() || terminal {
            return;
        }
    }
}

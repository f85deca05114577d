//! Plugin trait definitions

use std::time::Instant;

use async_trait::async_trait;
use serde::Serialize;

use crate::application::errors::{BotError, CommandError, PluginResult};
use crate::application::services::{apply_font, BanManager};
use crate::domain::entities::{jid, GroupParticipantsUpdate, InboundMessage};
use crate::domain::traits::WaClient;
use crate::infrastructure::config::Config;

/// Core plugin trait that all command plugins implement
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Command word the plugin is registered under
    fn name(&self) -> &str;

    /// Human-readable description shown by the menu
    fn description(&self) -> &str;

    /// Menu section
    fn category(&self) -> &str {
        "general"
    }

    /// Argument synopsis, without prefix and command word
    fn usage(&self) -> Option<&str> {
        None
    }

    /// Called once at startup. A failure keeps the plugin out of the registry.
    fn init(&self, _config: &Config) -> PluginResult<()> {
        Ok(())
    }

    /// Run the command
    async fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<(), CommandError>;

    /// Inspect a group command message for links. Returns true when it acted on one.
    async fn detect_links(&self, _env: &PluginEnv<'_>, _message: &InboundMessage) -> Result<bool, CommandError> {
        Ok(false)
    }

    /// React to members joining, leaving or changing role
    async fn on_group_participants(&self, _env: &PluginEnv<'_>, _update: &GroupParticipantsUpdate) -> Result<(), CommandError> {
        Ok(())
    }
}

/// Plugin information for listing
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PluginInfo {
    pub name: String,
    pub description: String,
    pub category: String,
    pub usage: Option<String>,
}

impl PluginInfo {
    pub fn of(plugin: &dyn Plugin) -> Self {
        Self {
            name: plugin.name().to_lowercase(),
            description: plugin.description().to_string(),
            category: plugin.category().to_string(),
            usage: plugin.usage().map(str::to_string),
        }
    }
}

/// Session facilities shared by every plugin hook
pub struct PluginEnv<'a> {
    pub client: &'a dyn WaClient,
    pub config: &'a Config,
    pub started_at: Instant,
}

impl<'a> PluginEnv<'a> {
    /// Apply the configured decorative font
    pub fn style(&self, text: &str) -> String {
        apply_font(self.config.bot.font, text, &self.config.bot.prefix)
    }

    /// Send styled text to a chat, tagging `mentions`
    pub async fn send(&self, chat_id: &str, text: &str, mentions: &[String]) -> Result<String, BotError> {
        self.client.send_text(chat_id, &self.style(text), None, mentions).await
    }

    pub fn is_owner(&self, user: &str) -> bool {
        jid::normalize_user(user) == jid::normalize_user(&self.config.bot.owner)
    }
}

/// Everything a command invocation can see and change
pub struct CommandContext<'a> {
    pub env: PluginEnv<'a>,
    pub message: &'a InboundMessage,
    /// Normalized sender id
    pub sender: String,
    /// Lowercased command word
    pub command: String,
    pub args: Vec<String>,
    pub bans: &'a mut BanManager,
    /// Every registered command, for the menu
    pub commands: &'a [PluginInfo],
}

impl<'a> CommandContext<'a> {
    pub fn chat_id(&self) -> &str {
        self.message.chat_id()
    }

    /// Reply in the invoking chat, quoting the command message
    pub async fn reply(&self, text: &str) -> Result<(), CommandError> {
        let styled = self.env.style(text);
        self.env
            .client
            .send_text(self.chat_id(), &styled, Some(&self.message.key), &[])
            .await?;
        Ok(())
    }

    pub async fn react(&self, emoji: &str) -> Result<(), CommandError> {
        self.env.client.send_reaction(&self.message.key, emoji).await?;
        Ok(())
    }

    pub fn is_owner(&self) -> bool {
        self.env.is_owner(&self.sender)
    }

    /// Fail with `PermissionDenied` unless the owner sent the command
    pub fn require_owner(&self) -> Result<(), CommandError> {
        if self.is_owner() {
            Ok(())
        } else {
            Err(CommandError::PermissionDenied)
        }
    }

    /// The user a command targets: first mention, else the first argument.
    /// The flag tells whether the first argument was consumed.
    pub fn target_user(&self) -> Option<(String, bool)> {
        if let Some(mention) = self.message.content.mentions().first() {
            return Some((jid::normalize_user(mention), false));
        }

        let first = self.args.first()?;
        let looks_like_user = first.contains('@') || first.trim_start_matches('+').chars().all(|c| c.is_ascii_digit());
        if looks_like_user && first.chars().any(|c| c.is_ascii_digit()) {
            Some((jid::normalize_user(first), true))
        } else {
            None
        }
    }

    /// Usage line for this command, e.g. `.ban <user> [reason]`
    pub fn usage_line(&self, usage: &str) -> String {
        format!("{}{} {}", self.env.config.bot.prefix, self.command, usage)
    }
}

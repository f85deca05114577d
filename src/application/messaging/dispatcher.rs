//! Message dispatcher - Routes session events through the feature modules to plugins

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use crate::application::context::AppContext;
use crate::application::errors::CommandError;
use crate::domain::entities::{jid, DeleteNotice, GroupParticipantsUpdate, InboundMessage};
use crate::domain::traits::WaClient;
use crate::plugins::{CommandContext, Plugin, PluginEnv};
use super::effects::best_effort;
use super::parser::{CommandParser, ParsedCommand};
use super::templates;

/// How a command invocation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Completed,
    PermissionDenied,
    InvalidArgs,
    Failed,
}

/// Which branch of the pipeline handled a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Sent by this account, or carried no content
    Ignored,
    /// Sender is banned; `notified` when the denial notice went out
    Banned { notified: bool },
    AutoReplied,
    Command { name: String, status: CommandStatus },
    UnknownCommand(String),
    /// Not a command; only side effects ran
    Passive,
}

/// Message dispatcher - the fixed-order inbound pipeline
pub struct MessageDispatcher {
    parser: CommandParser,
}

impl MessageDispatcher {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            parser: CommandParser::new(prefix),
        }
    }

    /// Process one inbound message
    pub async fn dispatch(&self, app: &mut AppContext, client: &dyn WaClient, message: &InboundMessage) -> DispatchOutcome {
        if message.key.from_me || message.content.is_empty() {
            return DispatchOutcome::Ignored;
        }

        let text = message.text();
        let sender = message.sender();
        let chat = message.chat_id();

        if let Some(record) = app.bans.is_banned(&sender) {
            let mut notified = false;
            if self.parser.is_command(text) {
                let notice = app.style(&templates::ban_notice(record, &app.config.bot.name, &app.config.bot.owner));
                let mentions = [jid::normalize_user(&app.config.bot.owner)];
                notified = best_effort("ban notice", client.send_text(chat, &notice, Some(&message.key), &mentions))
                    .await
                    .is_some();
            }
            tracing::debug!("Ignoring message from banned user {}", sender);
            return DispatchOutcome::Banned { notified };
        }

        app.anti_delete.store(message);

        app.mimic.apply(client, message).await;

        if app.config.features.auto_read {
            best_effort("mark read", client.read_messages(std::slice::from_ref(&message.key))).await;
        }

        if app.config.features.channel_react && jid::is_newsletter(chat) {
            best_effort("channel reaction", client.send_reaction(&message.key, "❤️")).await;
        }

        if let Some(reply) = app.auto_reply.reply_for(text, &sender, &app.config.bot.name, &app.config.bot.prefix) {
            let reply = app.style(&reply);
            let mentions = std::slice::from_ref(&sender);
            best_effort("auto-reply", client.send_text(chat, &reply, Some(&message.key), mentions)).await;
            return DispatchOutcome::AutoReplied;
        }

        let Some(command) = self.parser.parse(text) else {
            return DispatchOutcome::Passive;
        };

        tracing::info!("Command: {} from {}", command.name, sender);

        if message.is_group() {
            if let Some(antilink) = app.registry.get("antilink") {
                let env = PluginEnv {
                    client,
                    config: &app.config,
                    started_at: app.started_at,
                };
                if let Err(e) = antilink.detect_links(&env, message).await {
                    tracing::warn!("Antilink check failed: {}", e);
                }
            }
        }

        let Some(plugin) = app.registry.get(&command.name) else {
            let text = app.style(&templates::unknown_command(&command.name, self.parser.prefix()));
            best_effort("unknown command reply", client.send_text(chat, &text, Some(&message.key), &[])).await;
            return DispatchOutcome::UnknownCommand(command.name);
        };

        let name = command.name.clone();
        let status = self.run_plugin(app, client, message, plugin, command, sender).await;
        DispatchOutcome::Command { name, status }
    }

    async fn run_plugin(
        &self,
        app: &mut AppContext,
        client: &dyn WaClient,
        message: &InboundMessage,
        plugin: Arc<dyn Plugin>,
        command: ParsedCommand,
        sender: String,
    ) -> CommandStatus {
        let name = command.name.clone();

        let mut ctx = CommandContext {
            env: PluginEnv {
                client,
                config: &app.config,
                started_at: app.started_at,
            },
            message,
            sender,
            command: command.name,
            args: command.args,
            bans: &mut app.bans,
            commands: app.registry.infos(),
        };

        let result = AssertUnwindSafe(plugin.execute(&mut ctx)).catch_unwind().await;

        let (status, reply) = match result {
            Ok(Ok(())) => return CommandStatus::Completed,
            Ok(Err(CommandError::PermissionDenied)) => (CommandStatus::PermissionDenied, templates::permission_denied()),
            Ok(Err(CommandError::InvalidArgs(detail))) => (CommandStatus::InvalidArgs, templates::invalid_args(&detail)),
            Ok(Err(e)) => {
                tracing::error!("Plugin {} error: {}", name, e);
                (CommandStatus::Failed, templates::command_failed())
            }
            Err(panic) => {
                tracing::error!("Plugin {} panicked: {}", name, panic_message(panic.as_ref()));
                (CommandStatus::Failed, templates::command_failed())
            }
        };

        let reply = app.style(&reply);
        best_effort("command error reply", client.send_text(message.chat_id(), &reply, Some(&message.key), &[])).await;
        status
    }

    /// Replay deleted messages when anti-delete is on
    pub async fn handle_delete(&self, app: &mut AppContext, client: &dyn WaClient, notice: &DeleteNotice) -> usize {
        if !app.config.features.anti_delete {
            return 0;
        }

        app.anti_delete.handle_delete(client, notice).await
    }

    /// Forward membership changes to the group events plugin, when registered
    pub async fn handle_group_update(&self, app: &AppContext, client: &dyn WaClient, update: &GroupParticipantsUpdate) {
        if !app.config.features.group_events {
            return;
        }

        let Some(plugin) = app.registry.get("groupevents") else {
            return;
        };

        let env = PluginEnv {
            client,
            config: &app.config,
            started_at: app.started_at,
        };
        if let Err(e) = plugin.on_group_participants(&env, update).await {
            tracing::warn!("Group event handling failed for {}: {}", update.group_id, e);
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

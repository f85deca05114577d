//! Runtime loop - owns the bot state and multiplexes session events, rotation timers,
//! reconnect delays and shutdown on a single task.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{interval, Interval, MissedTickBehavior};

use crate::application::context::AppContext;
use crate::application::messaging::effects::best_effort;
use crate::application::messaging::{templates, MessageDispatcher};
use crate::application::services::{ConnectionAction, ConnectionMachine};
use crate::domain::entities::SessionEvent;
use crate::domain::traits::{Connector, Session, WaClient};
use crate::infrastructure::pairing;

pub const BIO_INTERVAL: Duration = Duration::from_secs(5 * 60);
pub const STATUS_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Why a session stopped being driven
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Reconnect(Duration),
    LoggedOut,
    Shutdown,
}

#[derive(Default)]
struct RotationTimers {
    bio: Option<Interval>,
    status: Option<Interval>,
}

impl RotationTimers {
    fn start(period: Duration) -> Interval {
        // First tick fires immediately
        let mut timer = interval(period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        timer
    }
}

/// Wait for the next tick; never resolves when the timer is not running
async fn tick(timer: &mut Option<Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

pub struct BotRuntime {
    app: AppContext,
    dispatcher: MessageDispatcher,
    connector: Arc<dyn Connector>,
}

impl BotRuntime {
    pub fn new(app: AppContext, connector: Arc<dyn Connector>) -> Self {
        let dispatcher = MessageDispatcher::new(app.config.bot.prefix.clone());
        Self {
            app,
            dispatcher,
            connector,
        }
    }

    pub fn app(&self) -> &AppContext {
        &self.app
    }

    /// Bootstrap sessions until shutdown or logout
    pub async fn run(&mut self, mut shutdown: broadcast::Receiver<()>) {
        let retry_delay = Duration::from_secs(self.app.config.connection.start_retry_delay_secs);

        loop {
            tracing::info!("🚀 Starting {} via the {} adapter", self.app.config.bot.name, self.connector.name());

            let connected = tokio::select! {
                _ = shutdown.recv() => return,
                session = self.connector.connect() => session,
            };

            let end = match connected {
                Ok(session) => self.drive(session, &mut shutdown).await,
                Err(e) => {
                    tracing::error!("Bot start error: {}", e);
                    SessionEnd::Reconnect(retry_delay)
                }
            };

            match end {
                SessionEnd::Shutdown => return,
                SessionEnd::LoggedOut => {
                    tracing::warn!("Session logged out; pair the device again and restart the bot");
                    let _ = shutdown.recv().await;
                    return;
                }
                SessionEnd::Reconnect(delay) => {
                    tokio::select! {
                        _ = shutdown.recv() => return,
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
    }

    /// Drive one connection instance until it closes
    pub async fn drive(&mut self, session: Session, shutdown: &mut broadcast::Receiver<()>) -> SessionEnd {
        let Session { client, mut events } = session;
        let reconnect_delay = Duration::from_secs(self.app.config.connection.reconnect_delay_secs);
        let mut machine = ConnectionMachine::new(reconnect_delay);
        let mut timers = RotationTimers::default();
        machine.mark_connecting();

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::warn!("🛑 Shutting down bot gracefully...");
                    best_effort("close session", client.close()).await;
                    return SessionEnd::Shutdown;
                }
                event = events.recv() => {
                    let Some(event) = event else {
                        tracing::warn!("Session event stream ended, reconnecting...");
                        return SessionEnd::Reconnect(reconnect_delay);
                    };
                    if let Some(end) = self.handle_event(client.as_ref(), &mut machine, &mut timers, event).await {
                        return end;
                    }
                }
                _ = tick(&mut timers.bio) => {
                    self.app.rotation.update_bio(client.as_ref()).await;
                }
                _ = tick(&mut timers.status) => {
                    self.app.rotation.update_status(client.as_ref()).await;
                }
            }
        }
    }

    async fn handle_event(
        &mut self,
        client: &dyn WaClient,
        machine: &mut ConnectionMachine,
        timers: &mut RotationTimers,
        event: SessionEvent,
    ) -> Option<SessionEnd> {
        match event {
            SessionEvent::Connection(update) => {
                for action in machine.on_update(&update) {
                    match action {
                        ConnectionAction::ShowQr(payload) => pairing::show_qr(&self.app.config.bot.name, &payload),
                        ConnectionAction::Setup => self.setup(client, timers).await,
                        ConnectionAction::ScheduleReconnect(delay) => return Some(SessionEnd::Reconnect(delay)),
                        ConnectionAction::Terminal => return Some(SessionEnd::LoggedOut),
                    }
                }
            }
            SessionEvent::MessagesUpsert(messages) => {
                if !machine.is_open() {
                    tracing::debug!("Skipping {} messages received before the connection opened", messages.len());
                    return None;
                }
                for message in &messages {
                    let outcome = self.dispatcher.dispatch(&mut self.app, client, message).await;
                    tracing::debug!("Message {} handled: {:?}", message.key.id, outcome);
                }
            }
            SessionEvent::MessagesDelete(notice) => {
                if machine.is_open() {
                    self.dispatcher.handle_delete(&mut self.app, client, &notice).await;
                }
            }
            SessionEvent::GroupParticipants(update) => {
                if machine.is_open() {
                    self.dispatcher.handle_group_update(&self.app, client, &update).await;
                }
            }
            SessionEvent::CredentialsUpdate(token) => {
                if let Err(e) = self.connector.persist_credentials(&token).await {
                    tracing::warn!("Failed to save session credentials: {}", e);
                }
            }
        }
        None
    }

    /// One-time setup for a freshly opened connection
    async fn setup(&mut self, client: &dyn WaClient, timers: &mut RotationTimers) {
        let config = &self.app.config;
        tracing::info!("✅ Connected successfully! {} plugins ready", self.app.registry.len());

        let notice = templates::connected_notice(&config.bot.name, self.app.registry.len());
        best_effort("owner notice", client.send_text(&config.bot.owner, &notice, None, &[])).await;

        for channel in &config.channels {
            match client.follow_newsletter(channel).await {
                Ok(()) => tracing::info!("Joined channel: {}", channel),
                Err(e) => tracing::warn!("Failed to join channel {}: {}", channel, e),
            }
        }

        if config.features.auto_bio {
            timers.bio = Some(RotationTimers::start(BIO_INTERVAL));
        }
        if config.features.auto_status {
            timers.status = Some(RotationTimers::start(STATUS_INTERVAL));
        }

        tracing::info!("🎉 Bot is now live. Send {}menu to see all commands", config.bot.prefix);
    }
}

//! Connection state machine for a single session instance

use std::time::Duration;

use crate::domain::entities::{ConnectionStatus, ConnectionUpdate, DisconnectReason};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseKind {
    Reconnecting,
    LoggedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Open,
    Closed(CloseKind),
}

/// What the runtime must do in response to an update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionAction {
    /// Render a pairing QR code
    ShowQr(String),
    /// Run the one-time setup for this connection
    Setup,
    /// Bootstrap a new session after the delay
    ScheduleReconnect(Duration),
    /// Logged out; nothing more happens until a human re-pairs
    Terminal,
}

/// Tracks one connection instance. A reconnect builds a new machine.
#[derive(Debug)]
pub struct ConnectionMachine {
    state: ConnectionState,
    reconnect_delay: Duration,
    setup_done: bool,
}

impl ConnectionMachine {
    pub fn new(reconnect_delay: Duration) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            reconnect_delay,
            setup_done: false,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    pub fn mark_connecting(&mut self) {
        if self.state == ConnectionState::Disconnected {
            self.state = ConnectionState::Connecting;
        }
    }

    pub fn on_update(&mut self, update: &ConnectionUpdate) -> Vec<ConnectionAction> {
        let mut actions = Vec::new();

        if let Some(qr) = &update.qr {
            actions.push(ConnectionAction::ShowQr(qr.clone()));
        }

        // A closed instance is finished; late updates are ignored
        if let ConnectionState::Closed(_) = self.state {
            return actions;
        }

        match update.connection {
            Some(ConnectionStatus::Connecting) => {
                self.state = ConnectionState::Connecting;
            }
            Some(ConnectionStatus::Open) => {
                self.state = ConnectionState::Open;
                if !self.setup_done {
                    self.setup_done = true;
                    actions.push(ConnectionAction::Setup);
                }
            }
            Some(ConnectionStatus::Close) => {
                let reason = update.last_disconnect.unwrap_or(DisconnectReason::ConnectionClosed);
                if reason.is_logged_out() {
                    tracing::error!("Logged out, please scan the QR code again");
                    self.state = ConnectionState::Closed(CloseKind::LoggedOut);
                    actions.push(ConnectionAction::Terminal);
                } else {
                    tracing::warn!("Connection closed ({}), reconnecting...", reason);
                    self.state = ConnectionState::Closed(CloseKind::Reconnecting);
                    actions.push(ConnectionAction::ScheduleReconnect(self.reconnect_delay));
                }
            }
            None => {}
        }

        actions
    }
}

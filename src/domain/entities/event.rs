use std::fmt;

use super::{InboundMessage, MessageKey};

/// Events emitted by a live session
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Connection(ConnectionUpdate),
    MessagesUpsert(Vec<InboundMessage>),
    MessagesDelete(DeleteNotice),
    GroupParticipants(GroupParticipantsUpdate),
    /// The session issued new credentials that must survive a restart
    CredentialsUpdate(String),
}

/// Lifecycle phase reported by the protocol library
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Open,
    Close,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionUpdate {
    pub connection: Option<ConnectionStatus>,
    pub last_disconnect: Option<DisconnectReason>,
    /// Pairing payload to render as a QR code
    pub qr: Option<String>,
}

impl ConnectionUpdate {
    pub fn open() -> Self {
        Self {
            connection: Some(ConnectionStatus::Open),
            ..Self::default()
        }
    }

    pub fn closed(reason: DisconnectReason) -> Self {
        Self {
            connection: Some(ConnectionStatus::Close),
            last_disconnect: Some(reason),
            qr: None,
        }
    }

    pub fn qr(payload: impl Into<String>) -> Self {
        Self {
            qr: Some(payload.into()),
            ..Self::default()
        }
    }
}

/// Why a connection closed, classified from the library's status code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    LoggedOut,
    ConnectionClosed,
    ConnectionLost,
    ConnectionReplaced,
    BadSession,
    RestartRequired,
    MultideviceMismatch,
    Other(u16),
}

impl DisconnectReason {
    pub fn from_status_code(code: u16) -> Self {
        match code {
            401 => DisconnectReason::LoggedOut,
            428 => DisconnectReason::ConnectionClosed,
            408 => DisconnectReason::ConnectionLost,
            440 => DisconnectReason::ConnectionReplaced,
            500 => DisconnectReason::BadSession,
            515 => DisconnectReason::RestartRequired,
            411 => DisconnectReason::MultideviceMismatch,
            other => DisconnectReason::Other(other),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            DisconnectReason::LoggedOut => 401,
            DisconnectReason::ConnectionClosed => 428,
            DisconnectReason::ConnectionLost => 408,
            DisconnectReason::ConnectionReplaced => 440,
            DisconnectReason::BadSession => 500,
            DisconnectReason::RestartRequired => 515,
            DisconnectReason::MultideviceMismatch => 411,
            DisconnectReason::Other(code) => *code,
        }
    }

    pub fn is_logged_out(&self) -> bool {
        matches!(self, DisconnectReason::LoggedOut)
    }
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DisconnectReason::LoggedOut => "logged out",
            DisconnectReason::ConnectionClosed => "connection closed",
            DisconnectReason::ConnectionLost => "connection lost",
            DisconnectReason::ConnectionReplaced => "connection replaced",
            DisconnectReason::BadSession => "bad session",
            DisconnectReason::RestartRequired => "restart required",
            DisconnectReason::MultideviceMismatch => "multi-device mismatch",
            DisconnectReason::Other(_) => "status",
        };
        write!(f, "{} {}", label, self.status_code())
    }
}

/// Messages revoked by their sender
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteNotice {
    Keys(Vec<MessageKey>),
    /// Every message of a chat was cleared
    Chat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupAction {
    Add,
    Remove,
    Promote,
    Demote,
}

impl GroupAction {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "add" => Some(GroupAction::Add),
            "remove" => Some(GroupAction::Remove),
            "promote" => Some(GroupAction::Promote),
            "demote" => Some(GroupAction::Demote),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupParticipantsUpdate {
    pub group_id: String,
    pub participants: Vec<String>,
    pub action: GroupAction,
}

/// Chat presence shown to the other side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Composing,
    Recording,
}

impl Presence {
    pub fn as_str(&self) -> &str {
        match self {
            Presence::Composing => "composing",
            Presence::Recording => "recording",
        }
    }
}

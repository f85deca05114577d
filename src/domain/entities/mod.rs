//! Domain entities - Core business objects with no external dependencies

pub mod ban;
pub mod event;
pub mod jid;
pub mod message;

pub use ban::BanRecord;
pub use event::{
    ConnectionStatus, ConnectionUpdate, DeleteNotice, DisconnectReason, GroupAction,
    GroupParticipantsUpdate, Presence, SessionEvent,
};
pub use message::{Content, InboundMessage, MessageKey};

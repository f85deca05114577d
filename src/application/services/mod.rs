//! Application services - Stateful feature modules

pub mod anti_delete;
pub mod auto_reply;
pub mod auto_status;
pub mod ban_manager;
pub mod connection;
pub mod fonts;
pub mod rotation;

pub use anti_delete::{AntiDelete, CachedMessage, MessageCache};
pub use auto_reply::AutoReply;
pub use auto_status::StatusMimic;
pub use ban_manager::BanManager;
pub use connection::{ConnectionAction, ConnectionMachine, ConnectionState};
pub use fonts::{apply_font, FontStyle};
pub use rotation::{ProfileRotation, Rotation};

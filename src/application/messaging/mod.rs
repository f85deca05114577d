//! Message handling - Event-driven message processing

pub mod dispatcher;
pub mod effects;
pub mod parser;
pub mod templates;

pub use dispatcher::{CommandStatus, DispatchOutcome, MessageDispatcher};
pub use parser::{CommandParser, ParsedCommand};

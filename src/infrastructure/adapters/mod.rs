//! Session adapters - implementations of the protocol seam

pub mod bridge;
pub mod console;

pub use bridge::{BridgeClient, BridgeConnector};
pub use console::{ConsoleClient, ConsoleConnector};

//! Domain traits - Abstractions for infrastructure implementations

pub mod client;
pub mod store;

pub use client::{Connector, Session, WaClient};
pub use store::BanStore;

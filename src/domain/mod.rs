//! Domain layer - Core business logic with no external dependencies
//!
//! This layer contains:
//! - Entities: Core business objects (messages, session events, bans, JIDs)
//! - Traits: Abstractions for infrastructure (WaClient, Connector, BanStore)

pub mod entities;
pub mod traits;

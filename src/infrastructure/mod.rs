//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Storage: Session credential files
//! - Database: Ban list persistence
//! - Adapters: Session connectors (bridge gateway, console)
//! - Pairing: QR rendering
//! - Http: Keep-alive endpoint

pub mod adapters;
pub mod config;
pub mod database;
pub mod http;
pub mod pairing;
pub mod storage;

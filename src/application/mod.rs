//! Application layer - Use cases and business logic
//!
//! This layer contains:
//! - Context: The owned bot state
//! - Services: Stateful feature modules
//! - Errors: Domain-specific errors
//! - Messaging: Command parsing, templates, dispatching
//! - Runtime: The session loop and connection lifecycle

pub mod context;
pub mod errors;
pub mod messaging;
pub mod runtime;
pub mod services;

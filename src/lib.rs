//! sila-bot - a WhatsApp multi-device bot
//!
//! Layers follow the usual split: `domain` holds entities and the protocol seam,
//! `application` the state, pipeline and runtime loop, `infrastructure` config,
//! persistence and session adapters, and `plugins` the command table.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod plugins;

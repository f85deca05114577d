//! Plugin system for sila-bot
//!
//! Plugins are command handlers registered under a command word. The table is fixed at
//! compile time and loaded once at startup; see `builtin::builtin_plugins`.

pub mod builtin;
pub mod registry;
pub mod trait_def;

pub use registry::{LoadReport, PluginRegistry};
pub use trait_def::{CommandContext, Plugin, PluginEnv, PluginInfo};

//! Built-in command plugins

pub mod antilink;
pub mod ban;
pub mod general;
pub mod groupevents;
pub mod menu;

use std::sync::Arc;

use super::trait_def::Plugin;

pub use antilink::AntiLink;
pub use ban::{Ban, BanList, Unban};
pub use general::{Alive, Owner, Ping};
pub use groupevents::GroupEvents;
pub use menu::Menu;

/// The plugin table loaded at startup
pub fn builtin_plugins() -> Vec<Arc<dyn Plugin>> {
    vec![
        Arc::new(Menu),
        Arc::new(Alive),
        Arc::new(Ping),
        Arc::new(Owner),
        Arc::new(Ban),
        Arc::new(Unban),
        Arc::new(BanList),
        Arc::new(AntiLink::new()),
        Arc::new(GroupEvents),
    ]
}

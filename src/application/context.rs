//! Application context - all mutable bot state, owned by the runtime loop

use std::time::Instant;

use crate::application::services::{apply_font, AntiDelete, AutoReply, BanManager, ProfileRotation, StatusMimic};
use crate::infrastructure::config::Config;
use crate::plugins::PluginRegistry;

pub struct AppContext {
    pub config: Config,
    pub registry: PluginRegistry,
    pub bans: BanManager,
    pub anti_delete: AntiDelete,
    pub auto_reply: AutoReply,
    pub mimic: StatusMimic,
    pub rotation: ProfileRotation,
    pub started_at: Instant,
}

impl AppContext {
    pub fn new(config: Config, registry: PluginRegistry, bans: BanManager) -> Self {
        let anti_delete = AntiDelete::new(
            config.anti_delete.capacity,
            config.features.anti_delete,
            config.anti_delete_recipient(),
        );
        let auto_reply = AutoReply::new(&config.auto_reply);
        let mimic = StatusMimic::new(&config.features);
        let rotation = ProfileRotation::new(&config);

        Self {
            config,
            registry,
            bans,
            anti_delete,
            auto_reply,
            mimic,
            rotation,
            started_at: Instant::now(),
        }
    }

    /// Apply the configured font to outgoing text
    pub fn style(&self, text: &str) -> String {
        apply_font(self.config.bot.font, text, &self.config.bot.prefix)
    }
}

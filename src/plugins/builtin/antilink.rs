//! Per-group link guard

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use regex_lite::Regex;

use crate::application::errors::{CommandError, PluginError, PluginResult};
use crate::application::messaging::effects::best_effort;
use crate::domain::entities::{jid, InboundMessage};
use crate::infrastructure::config::Config;
use crate::plugins::trait_def::{CommandContext, Plugin, PluginEnv};

const LINK_PATTERN: &str = r"(?i)(https?://\S+|chat\.whatsapp\.com/\S+|wa\.me/\S+|www\.\S+\.\S+)";

#[derive(Default)]
pub struct AntiLink {
    enabled_groups: Mutex<HashSet<String>>,
    pattern: OnceCell<Regex>,
}

impl AntiLink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled_for(&self, group: &str) -> bool {
        self.enabled_groups
            .lock()
            .map(|groups| groups.contains(group))
            .unwrap_or(false)
    }

    fn set_enabled(&self, group: &str, enabled: bool) -> Result<(), CommandError> {
        let mut groups = self.enabled_groups.lock()
            .map_err(|_| CommandError::ExecutionFailed("Lock poisoned".to_string()))?;
        if enabled {
            groups.insert(group.to_string());
        } else {
            groups.remove(group);
        }
        Ok(())
    }

    pub fn contains_link(&self, text: &str) -> bool {
        self.pattern.get().map(|re| re.is_match(text)).unwrap_or(false)
    }
}

#[async_trait]
impl Plugin for AntiLink {
    fn name(&self) -> &str {
        "antilink"
    }

    fn description(&self) -> &str {
        "Remove links posted in this group"
    }

    fn category(&self) -> &str {
        "group"
    }

    fn usage(&self) -> Option<&str> {
        Some("on|off")
    }

    fn init(&self, _config: &Config) -> PluginResult<()> {
        let re = Regex::new(LINK_PATTERN).map_err(|e| PluginError::Init(format!("Invalid link pattern: {}", e)))?;
        // A second init keeps the first compiled pattern
        let _ = self.pattern.set(re);
        Ok(())
    }

    async fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<(), CommandError> {
        if !ctx.message.is_group() {
            return Err(CommandError::InvalidArgs("Antilink only works in groups.".to_string()));
        }
        ctx.require_owner()?;

        let group = ctx.chat_id().to_string();
        match ctx.args.first().map(|a| a.to_lowercase()).as_deref() {
            Some("on") => {
                self.set_enabled(&group, true)?;
                ctx.reply("🔗 *Antilink enabled for this group.*").await
            }
            Some("off") => {
                self.set_enabled(&group, false)?;
                ctx.reply("🔗 *Antilink disabled for this group.*").await
            }
            _ => {
                let state = if self.is_enabled_for(&group) { "ON" } else { "OFF" };
                ctx.reply(&format!("🔗 Antilink is *{}*\nUsage: {}", state, ctx.usage_line("on|off"))).await
            }
        }
    }

    async fn detect_links(&self, env: &PluginEnv<'_>, message: &InboundMessage) -> Result<bool, CommandError> {
        let group = message.chat_id();
        if !self.is_enabled_for(group) || !self.contains_link(message.text()) {
            return Ok(false);
        }

        let sender = message.sender();
        if env.is_owner(&sender) {
            return Ok(false);
        }

        tracing::info!("Antilink: removing link from {} in {}", sender, group);
        best_effort("antilink delete", env.client.delete_message(&message.key)).await;
        let warning = format!("⚠️ @{} links are not allowed in this group!", jid::user_part(&sender));
        env.send(group, &warning, std::slice::from_ref(&sender)).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_detection() {
        let plugin = AntiLink::new();
        plugin.init(&Config::default()).unwrap();

        assert!(plugin.contains_link("join https://chat.whatsapp.com/abc"));
        assert!(plugin.contains_link("CHAT.WHATSAPP.COM/xyz"));
        assert!(plugin.contains_link("see www.example.com"));
        assert!(!plugin.contains_link(".menu please"));
    }

    #[test]
    fn test_no_detection_before_init() {
        let plugin = AntiLink::new();
        assert!(!plugin.contains_link("https://example.com"));
    }

    #[test]
    fn test_toggle_per_group() {
        let plugin = AntiLink::new();
        plugin.set_enabled("1@g.us", true).unwrap();
        assert!(plugin.is_enabled_for("1@g.us"));
        assert!(!plugin.is_enabled_for("2@g.us"));
        plugin.set_enabled("1@g.us", false).unwrap();
        assert!(!plugin.is_enabled_for("1@g.us"));
    }
}

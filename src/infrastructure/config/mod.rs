//! Configuration management

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use crate::application::errors::ConfigError;
use crate::application::services::fonts::FontStyle;

/// Bot configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub bot: BotConfig,
    pub session: SessionConfig,
    pub adapters: AdaptersConfig,
    pub server: ServerConfig,
    pub features: FeaturesConfig,
    pub anti_delete: AntiDeleteConfig,
    pub bans: BansConfig,
    /// Newsletter channels followed once per connection
    pub channels: Vec<String>,
    pub auto_reply: AutoReplyConfig,
    pub rotation: RotationConfig,
    pub connection: ConnectionConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BotConfig {
    pub name: String,
    pub prefix: String,
    pub owner: String,
    pub font: FontStyle,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SessionConfig {
    pub dir: PathBuf,
    pub instance: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AdaptersConfig {
    pub bridge: Option<BridgeConfig>,
    pub console: Option<ConsoleConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BridgeConfig {
    pub enabled: bool,
    pub url: Option<String>,
    pub api_key: Option<String>,
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
}

fn default_poll_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConsoleConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ServerConfig {
    pub port: u16,
}

/// Feature switches for the per-message side effects and timers
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct FeaturesConfig {
    pub auto_read: bool,
    pub auto_typing: bool,
    pub auto_recording: bool,
    pub auto_react: bool,
    pub auto_bio: bool,
    pub auto_status: bool,
    pub anti_delete: bool,
    pub channel_react: bool,
    pub group_events: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AntiDeleteConfig {
    pub capacity: usize,
    /// Defaults to the owner
    pub recipient: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BansConfig {
    /// SQLite file for persistent bans; in-memory only when unset
    pub database: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AutoReplyConfig {
    pub enabled: bool,
    /// Trigger text (matched case-insensitively) to reply template
    pub triggers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RotationConfig {
    pub bio: Vec<String>,
    pub status: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ConnectionConfig {
    pub reconnect_delay_secs: u64,
    pub start_retry_delay_secs: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "Sila MD".to_string(),
            prefix: ".".to_string(),
            owner: "255000000000@s.whatsapp.net".to_string(),
            font: FontStyle::Monospace,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./sessions"),
            instance: "sila-bot".to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 3000 }
    }
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            auto_read: true,
            auto_typing: false,
            auto_recording: false,
            auto_react: false,
            auto_bio: true,
            auto_status: true,
            anti_delete: true,
            channel_react: true,
            group_events: true,
        }
    }
}

impl Default for AntiDeleteConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            recipient: None,
        }
    }
}

impl Default for AutoReplyConfig {
    fn default() -> Self {
        let mut triggers = BTreeMap::new();
        triggers.insert("hi".to_string(), "👋 Hello @{sender}! I'm {bot_name}. Type {prefix}menu to see what I can do.".to_string());
        triggers.insert("hello".to_string(), "👋 Hello @{sender}! I'm {bot_name}. Type {prefix}menu to see what I can do.".to_string());
        triggers.insert("bot".to_string(), "🤖 {bot_name} is online. Type {prefix}menu for commands.".to_string());
        triggers.insert("thanks".to_string(), "🙏 You're welcome!".to_string());
        Self {
            enabled: true,
            triggers,
        }
    }
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            bio: vec![
                "🤖 {bot_name} - Active | Type {prefix}menu".to_string(),
                "💫 Need help? {prefix}menu".to_string(),
                "🚀 All Systems Operational | {bot_name}".to_string(),
                "🎯 {prefix}alive to check status".to_string(),
                "⚡ Fast & Responsive | {bot_name}".to_string(),
            ],
            status: vec![
                "🌟 {bot_name} is online and ready!".to_string(),
                "💬 Message me with {prefix}menu".to_string(),
                "⚡ Lightning fast responses".to_string(),
            ],
        }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            reconnect_delay_secs: 3,
            start_retry_delay_secs: 5,
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let mut config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment overrides
    pub fn load_env() -> Self {
        let mut config = Config::default();
        config.apply_env();
        config
    }

    fn apply_env(&mut self) {
        if let Ok(port) = std::env::var("PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring invalid PORT: {}", port),
            }
        }

        if let Ok(name) = std::env::var("BOT_NAME") {
            self.bot.name = name;
        }

        if let Ok(prefix) = std::env::var("BOT_PREFIX") {
            self.bot.prefix = prefix;
        }

        if let Ok(owner) = std::env::var("BOT_OWNER") {
            self.bot.owner = owner;
        }

        if let Ok(url) = std::env::var("BRIDGE_URL") {
            let bridge = self.adapters.bridge.get_or_insert_with(|| BridgeConfig {
                enabled: true,
                url: None,
                api_key: None,
                poll_timeout_secs: default_poll_timeout(),
            });
            bridge.url = Some(url);
            bridge.enabled = true;
        }

        if let Ok(key) = std::env::var("BRIDGE_TOKEN") {
            if let Some(ref mut bridge) = self.adapters.bridge {
                bridge.api_key = Some(key);
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot.prefix.is_empty() {
            return Err(ConfigError::InvalidValue("bot.prefix must not be empty".to_string()));
        }
        if self.bot.owner.trim().is_empty() {
            return Err(ConfigError::MissingField("bot.owner".to_string()));
        }
        if self.anti_delete.capacity == 0 {
            return Err(ConfigError::InvalidValue("anti-delete.capacity must be greater than zero".to_string()));
        }
        if let Some(ref bridge) = self.adapters.bridge {
            if bridge.enabled && bridge.url.is_none() {
                return Err(ConfigError::MissingField("adapters.bridge.url".to_string()));
            }
        }
        Ok(())
    }

    /// Chat that receives anti-delete replays
    pub fn anti_delete_recipient(&self) -> &str {
        self.anti_delete.recipient.as_deref().unwrap_or(&self.bot.owner)
    }

    /// Bridge settings when the bridge adapter is enabled
    pub fn bridge(&self) -> Option<&BridgeConfig> {
        self.adapters.bridge.as_ref().filter(|b| b.enabled)
    }
}

//! Status commands: alive, ping, owner

use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::application::errors::CommandError;
use crate::domain::entities::jid;
use crate::plugins::trait_def::{CommandContext, Plugin};

pub struct Alive;

#[async_trait]
impl Plugin for Alive {
    fn name(&self) -> &str {
        "alive"
    }

    fn description(&self) -> &str {
        "Check that the bot is running"
    }

    async fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<(), CommandError> {
        let config = ctx.env.config;
        let text = format!(
            "*╭━━━〔 🐢 {} 🐢 〕━━━┈⊷*\n\
             *┃🐢│ Status :❯ Online*\n\
             *┃🐢│ Uptime :❯ {}*\n\
             *┃🐢│ Prefix :❯ {}*\n\
             *┃🐢│ Version :❯ {}*\n\
             *╰━━━━━━━━━━━━━━━┈⊷*\n\n\
             Type {}menu for the command list",
            config.bot.name,
            format_uptime(ctx.env.started_at.elapsed()),
            config.bot.prefix,
            env!("CARGO_PKG_VERSION"),
            config.bot.prefix,
        );
        ctx.reply(&text).await
    }
}

pub struct Ping;

#[async_trait]
impl Plugin for Ping {
    fn name(&self) -> &str {
        "ping"
    }

    fn description(&self) -> &str {
        "Measure response latency"
    }

    async fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<(), CommandError> {
        let start = Instant::now();
        ctx.react("🏓").await?;
        let latency = start.elapsed().as_millis();
        ctx.reply(&format!("🏓 *Pong!* {}ms", latency)).await
    }
}

pub struct Owner;

#[async_trait]
impl Plugin for Owner {
    fn name(&self) -> &str {
        "owner"
    }

    fn description(&self) -> &str {
        "Show the bot owner's contact"
    }

    async fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<(), CommandError> {
        let number = jid::user_part(&ctx.env.config.bot.owner).to_string();
        ctx.reply(&format!("👑 *Owner:* @{}\n📞 https://wa.me/{}", number, number)).await
    }
}

/// `1d 2h 3m 4s`, leading zero units omitted
pub fn format_uptime(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let (days, hours, minutes, seconds) = (secs / 86_400, secs % 86_400 / 3_600, secs % 3_600 / 60, secs % 60);

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if days > 0 || hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if days > 0 || hours > 0 || minutes > 0 {
        parts.push(format!("{}m", minutes));
    }
    parts.push(format!("{}s", seconds));
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(Duration::from_secs(5)), "5s");
        assert_eq!(format_uptime(Duration::from_secs(65)), "1m 5s");
        assert_eq!(format_uptime(Duration::from_secs(3_600)), "1h 0m 0s");
        assert_eq!(format_uptime(Duration::from_secs(90_061)), "1d 1h 1m 1s");
    }
}

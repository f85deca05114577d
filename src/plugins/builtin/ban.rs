//! Owner-only ban administration

use async_trait::async_trait;

use crate::application::errors::CommandError;
use crate::domain::entities::jid;
use crate::plugins::trait_def::{CommandContext, Plugin};

const NO_REASON: &str = "No reason provided";

pub struct Ban;

#[async_trait]
impl Plugin for Ban {
    fn name(&self) -> &str {
        "ban"
    }

    fn description(&self) -> &str {
        "Ban a user from using the bot"
    }

    fn category(&self) -> &str {
        "owner"
    }

    fn usage(&self) -> Option<&str> {
        Some("<number|@user> [reason]")
    }

    async fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<(), CommandError> {
        ctx.require_owner()?;

        let Some((target, consumed_arg)) = ctx.target_user() else {
            return Err(CommandError::InvalidArgs(ctx.usage_line("<number|@user> [reason]")));
        };

        if ctx.env.is_owner(&target) {
            return ctx.reply("❌ *The owner cannot be banned.*").await;
        }

        let reason_args = if consumed_arg { &ctx.args[1..] } else { &ctx.args[..] };
        let reason = if reason_args.is_empty() {
            NO_REASON.to_string()
        } else {
            reason_args.join(" ")
        };

        let sender = ctx.sender.clone();
        ctx.bans.add(&target, &reason, Some(&sender));

        ctx.reply(&format!(
            "🔨 *User banned*\n👤 @{}\n📝 Reason: {}",
            jid::user_part(&target),
            reason
        ))
        .await
    }
}

pub struct Unban;

#[async_trait]
impl Plugin for Unban {
    fn name(&self) -> &str {
        "unban"
    }

    fn description(&self) -> &str {
        "Lift a ban"
    }

    fn category(&self) -> &str {
        "owner"
    }

    fn usage(&self) -> Option<&str> {
        Some("<number|@user>")
    }

    async fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<(), CommandError> {
        ctx.require_owner()?;

        let Some((target, _)) = ctx.target_user() else {
            return Err(CommandError::InvalidArgs(ctx.usage_line("<number|@user>")));
        };

        let text = match ctx.bans.remove(&target) {
            Some(_) => format!("✅ *User unbanned*\n👤 @{}", jid::user_part(&target)),
            None => format!("ℹ️ @{} is not banned.", jid::user_part(&target)),
        };
        ctx.reply(&text).await
    }
}

pub struct BanList;

#[async_trait]
impl Plugin for BanList {
    fn name(&self) -> &str {
        "banlist"
    }

    fn description(&self) -> &str {
        "List banned users"
    }

    fn category(&self) -> &str {
        "owner"
    }

    async fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<(), CommandError> {
        ctx.require_owner()?;

        if ctx.bans.is_empty() {
            return ctx.reply("✅ *No banned users.*").await;
        }

        let mut text = format!("🚫 *Banned users ({})*\n", ctx.bans.len());
        for (i, record) in ctx.bans.list().iter().enumerate() {
            text.push_str(&format!(
                "\n{}. @{}\n   📝 {}\n   🕒 {}",
                i + 1,
                jid::user_part(&record.user),
                record.reason,
                record.banned_at.format("%Y-%m-%d"),
            ));
        }
        ctx.reply(&text).await
    }
}

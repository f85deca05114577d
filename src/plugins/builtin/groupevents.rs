use async_trait::async_trait;

use crate::application::errors::CommandError;
use crate::application::messaging::effects::best_effort;
use crate::domain::entities::{jid, GroupAction, GroupParticipantsUpdate};
use crate::plugins::trait_def::{CommandContext, Plugin, PluginEnv};

/// Welcome, goodbye and role-change announcements for groups
pub struct GroupEvents;

pub fn announcement(action: GroupAction, participant: &str) -> String {
    let user = jid::user_part(participant);
    match action {
        GroupAction::Add => format!("👋 Welcome @{} to the group! 🎉", user),
        GroupAction::Remove => format!("👋 Goodbye @{}, we'll miss you.", user),
        GroupAction::Promote => format!("⭐ @{} is now a group admin.", user),
        GroupAction::Demote => format!("⬇️ @{} is no longer a group admin.", user),
    }
}

#[async_trait]
impl Plugin for GroupEvents {
    fn name(&self) -> &str {
        "groupevents"
    }

    fn description(&self) -> &str {
        "Show whether group announcements are on"
    }

    fn category(&self) -> &str {
        "group"
    }

    async fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<(), CommandError> {
        let state = if ctx.env.config.features.group_events { "ON" } else { "OFF" };
        ctx.reply(&format!("👥 Group welcome/goodbye messages are *{}*", state)).await
    }

    async fn on_group_participants(&self, env: &PluginEnv<'_>, update: &GroupParticipantsUpdate) -> Result<(), CommandError> {
        for participant in &update.participants {
            let text = announcement(update.action, participant);
            let mentions = [participant.clone()];
            best_effort(
                "group announcement",
                env.send(&update.group_id, &text, &mentions),
            )
            .await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_announcements_mention_participant() {
        let text = announcement(GroupAction::Add, "2547000@s.whatsapp.net");
        assert!(text.contains("@2547000"));
        assert!(announcement(GroupAction::Remove, "1@s.whatsapp.net").starts_with("👋 Goodbye"));
        assert!(announcement(GroupAction::Demote, "1@s.whatsapp.net").contains("no longer"));
    }
}

use async_trait::async_trait;

use crate::application::errors::CommandError;
use crate::plugins::trait_def::{CommandContext, Plugin, PluginInfo};

/// Lists every registered command grouped by category
pub struct Menu;

#[async_trait]
impl Plugin for Menu {
    fn name(&self) -> &str {
        "menu"
    }

    fn description(&self) -> &str {
        "Show all commands"
    }

    async fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<(), CommandError> {
        let text = render_menu(&ctx.env.config.bot.name, &ctx.env.config.bot.prefix, ctx.commands);
        ctx.reply(&text).await
    }
}

pub fn render_menu(bot_name: &str, prefix: &str, commands: &[PluginInfo]) -> String {
    let mut text = format!(
        "*╭━━━〔 🐢 {} MENU 🐢 〕━━━┈⊷*\n\
         *┃🐢│ Prefix :❯ {}*\n\
         *┃🐢│ Commands :❯ {}*\n\
         *╰━━━━━━━━━━━━━━━┈⊷*\n",
        bot_name,
        prefix,
        commands.len(),
    );

    let mut current_category: Option<&str> = None;
    for info in commands {
        if current_category != Some(info.category.as_str()) {
            text.push_str(&format!("\n*〔 {} 〕*\n", info.category.to_uppercase()));
            current_category = Some(info.category.as_str());
        }

        match &info.usage {
            Some(usage) => text.push_str(&format!("{}{} {} - {}\n", prefix, info.name, usage, info.description)),
            None => text.push_str(&format!("{}{} - {}\n", prefix, info.name, info.description)),
        }
    }

    text
}

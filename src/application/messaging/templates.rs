//! Reply text templates

use chrono::{DateTime, Utc};

use crate::domain::entities::{jid, BanRecord};

/// Substitute `{key}` placeholders. Unknown placeholders are left as written.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (key, value) in vars {
        out = out.replace(&format!("{{{}}}", key), value);
    }
    out
}

pub fn ban_notice(record: &BanRecord, bot_name: &str, owner: &str) -> String {
    format!(
        "*╭━━━〔 🐢 ACCESS DENIED 🐢 〕━━━┈⊷*\n\
         *┃🐢│ STATUS :❯ YOU ARE BANNED*\n\
         *┃🐢│ REASON :❯ {}*\n\
         *┃🐢│ BANNED ON :❯ {}*\n\
         *╰━━━━━━━━━━━━━━━┈⊷*\n\n\
         🚫 *You are banned from using {}*\n\n\
         💡 *Contact @{} to appeal this ban.*",
        record.reason,
        record.banned_at.format("%Y-%m-%d"),
        bot_name,
        jid::user_part(owner),
    )
}

pub fn unknown_command(command: &str, prefix: &str) -> String {
    format!("❌ *Unknown command: {}*\nType {}menu for help", command, prefix)
}

pub fn command_failed() -> String {
    "❌ *Error executing command! Please try again.*".to_string()
}

pub fn permission_denied() -> String {
    "🚫 *This command is for the bot owner only.*".to_string()
}

pub fn invalid_args(detail: &str) -> String {
    format!("⚠️ *Invalid usage*\n{}", detail)
}

pub fn connected_notice(bot_name: &str, plugin_count: usize) -> String {
    format!(
        "✅ *{} CONNECTED!*\n\n{} plugins are active and working!\n\n🤖 Bot is now online and ready to use.",
        bot_name, plugin_count
    )
}

pub fn anti_delete_notice(chat_id: &str, sender: &str, sent_at: DateTime<Utc>, content: &str) -> String {
    let place = if jid::is_group(chat_id) {
        format!("group {}", chat_id)
    } else {
        "private chat".to_string()
    };
    format!(
        "🗑️ *Deleted message recovered*\n\
         👤 From: @{}\n\
         💬 In: {}\n\
         🕒 Sent: {}\n\n\
         {}",
        jid::user_part(sender),
        place,
        sent_at.format("%Y-%m-%d %H:%M:%S UTC"),
        content,
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

pub fn health_page(bot_name: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>{name}</title>
    <style>
        body {{ font-family: Arial, sans-serif; text-align: center; padding: 50px; }}
        .status {{ color: green; font-weight: bold; }}
    </style>
</head>
<body>
    <h1>🤖 {name}</h1>
    <p class="status">✅ Bot is running successfully!</p>
    <p>Check your console/terminal for the pairing QR code</p>
</body>
</html>
"#,
        name = escape_html(bot_name)
    )
}

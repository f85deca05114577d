//! Auto-reply - canned answers for exact trigger phrases

use std::collections::HashMap;

use crate::application::messaging::templates;
use crate::domain::entities::jid;
use crate::infrastructure::config::AutoReplyConfig;

pub struct AutoReply {
    enabled: bool,
    /// Lowercased trigger to reply template
    triggers: HashMap<String, String>,
}

impl AutoReply {
    pub fn new(config: &AutoReplyConfig) -> Self {
        let triggers = config
            .triggers
            .iter()
            .map(|(trigger, reply)| (trigger.trim().to_lowercase(), reply.clone()))
            .filter(|(trigger, _)| !trigger.is_empty())
            .collect();

        Self {
            enabled: config.enabled,
            triggers,
        }
    }

    /// Reply for `text` if it matches a trigger exactly (ignoring case and surrounding space)
    pub fn reply_for(&self, text: &str, sender: &str, bot_name: &str, prefix: &str) -> Option<String> {
        if !self.enabled {
            return None;
        }

        let template = self.triggers.get(&text.trim().to_lowercase())?;
        Some(templates::render(
            template,
            &[
                ("bot_name", bot_name),
                ("prefix", prefix),
                ("sender", jid::user_part(sender)),
            ],
        ))
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }
}

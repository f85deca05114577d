//! Presence mimicry: typing, recording and random reactions on inbound messages

use rand::seq::SliceRandom;

use crate::application::messaging::effects::best_effort;
use crate::domain::entities::{InboundMessage, Presence};
use crate::domain::traits::WaClient;
use crate::infrastructure::config::FeaturesConfig;

pub const REACTIONS: &[&str] = &["❤️", "🔥", "👍", "😂", "😮", "🐢", "💯", "✨", "🙏", "🎉"];

pub struct StatusMimic {
    typing: bool,
    recording: bool,
    react: bool,
}

impl StatusMimic {
    pub fn new(features: &FeaturesConfig) -> Self {
        Self {
            typing: features.auto_typing,
            recording: features.auto_recording,
            react: features.auto_react,
        }
    }

    /// Fire every enabled effect; none of them can fail the caller
    pub async fn apply(&self, client: &dyn WaClient, message: &InboundMessage) {
        let chat = message.chat_id();

        if self.typing {
            best_effort("auto-typing", client.send_presence(chat, Presence::Composing)).await;
        }

        if self.recording {
            best_effort("auto-recording", client.send_presence(chat, Presence::Recording)).await;
        }

        if self.react {
            let emoji = random_reaction();
            best_effort("auto-react", client.send_reaction(&message.key, emoji)).await;
        }
    }
}

pub fn random_reaction() -> &'static str {
    REACTIONS.choose(&mut rand::thread_rng()).copied().unwrap_or("❤️")
}

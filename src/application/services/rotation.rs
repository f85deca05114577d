//! Auto-bio and auto-status rotation

use crate::application::messaging::effects::best_effort;
use crate::application::messaging::templates;
use crate::application::services::fonts::{apply_font, FontStyle};
use crate::domain::traits::WaClient;
use crate::infrastructure::config::Config;

/// A fixed list of display strings cycled round-robin
#[derive(Debug, Clone)]
pub struct Rotation {
    items: Vec<String>,
    index: usize,
}

impl Rotation {
    pub fn new(items: Vec<String>) -> Self {
        Self { items, index: 0 }
    }

    /// Return the current entry and move to the next one, wrapping around
    pub fn advance(&mut self) -> Option<&str> {
        if self.items.is_empty() {
            return None;
        }
        let current = self.index;
        self.index = (self.index + 1) % self.items.len();
        Some(&self.items[current])
    }

    /// Index of the entry the next `advance` returns
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Profile bio and text status rotations, advanced by independent timers
pub struct ProfileRotation {
    bio: Rotation,
    status: Rotation,
    font: FontStyle,
    prefix: String,
}

impl ProfileRotation {
    pub fn new(config: &Config) -> Self {
        let vars = [("bot_name", config.bot.name.as_str()), ("prefix", config.bot.prefix.as_str())];
        let render = |list: &[String]| list.iter().map(|t| templates::render(t, &vars)).collect::<Vec<_>>();

        Self {
            bio: Rotation::new(render(&config.rotation.bio)),
            status: Rotation::new(render(&config.rotation.status)),
            font: config.bot.font,
            prefix: config.bot.prefix.clone(),
        }
    }

    /// Push the next bio. The rotation advances even when the update fails.
    pub async fn update_bio(&mut self, client: &dyn WaClient) -> Option<String> {
        let text = apply_font(self.font, self.bio.advance()?, &self.prefix);
        best_effort("auto-bio update", client.update_profile_status(&text)).await?;
        tracing::info!("Auto-bio updated: {}", text);
        Some(text)
    }

    /// Post the next text status. The rotation advances even when posting fails.
    pub async fn update_status(&mut self, client: &dyn WaClient) -> Option<String> {
        let text = apply_font(self.font, self.status.advance()?, &self.prefix);
        best_effort("auto-status update", client.post_status(&text)).await?;
        tracing::info!("Auto-status posted: {}", text);
        Some(text)
    }

    pub fn bio(&self) -> &Rotation {
        &self.bio
    }

    pub fn status(&self) -> &Rotation {
        &self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_wraps_around() {
        let mut rotation = Rotation::new(vec!["a".into(), "b".into(), "c".into()]);
        let picked: Vec<String> = (0..5).map(|_| rotation.advance().unwrap().to_string()).collect();
        assert_eq!(picked, vec!["a", "b", "c", "a", "b"]);
    }

    #[test]
    fn test_index_is_firings_mod_len() {
        for len in 1..6 {
            let mut rotation = Rotation::new((0..len).map(|i| i.to_string()).collect());
            for n in 1..20 {
                rotation.advance();
                assert_eq!(rotation.index(), n % len);
            }
        }
    }

    #[test]
    fn test_empty_rotation() {
        let mut rotation = Rotation::new(Vec::new());
        assert!(rotation.advance().is_none());
        assert_eq!(rotation.index(), 0);
    }

    #[test]
    fn test_templates_rendered_from_config() {
        let mut config = Config::default();
        config.bot.name = "Turtle".into();
        config.rotation.bio = vec!["{bot_name} | {prefix}menu".into()];
        let mut rotation = ProfileRotation::new(&config);
        assert_eq!(rotation.bio.advance(), Some("Turtle | .menu"));
        assert_eq!(rotation.status().len(), config.rotation.status.len());
    }
}

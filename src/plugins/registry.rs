//! Plugin registry - Command word to plugin lookup, built once at startup

use std::collections::HashMap;
use std::sync::Arc;

use crate::application::errors::PluginError;
use crate::infrastructure::config::Config;
use super::trait_def::{Plugin, PluginInfo};

/// Outcome of loading the plugin table
#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: Vec<String>,
    pub failed: Vec<(String, PluginError)>,
    /// Names registered more than once; the later plugin won
    pub replaced: Vec<String>,
}

impl LoadReport {
    pub fn log(&self) {
        for name in &self.loaded {
            tracing::info!("Loaded plugin: {}", name);
        }
        for name in &self.replaced {
            tracing::warn!("Plugin '{}' registered twice, keeping the last one", name);
        }
        for (name, e) in &self.failed {
            tracing::warn!("Failed to load plugin {}: {}", name, e);
        }
        tracing::info!(
            "Plugin system initialized with {} plugins ({} failed)",
            self.loaded.len(),
            self.failed.len()
        );
    }
}

/// Registry for looking up plugins by command word
#[derive(Default)]
pub struct PluginRegistry {
    plugins: HashMap<String, Arc<dyn Plugin>>,
    infos: Vec<PluginInfo>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize and register every plugin, collecting failures instead of aborting
    pub fn load(plugins: Vec<Arc<dyn Plugin>>, config: &Config) -> (Self, LoadReport) {
        let mut registry = Self::new();
        let mut report = LoadReport::default();

        for plugin in plugins {
            let name = plugin.name().to_lowercase();
            if let Err(e) = plugin.init(config) {
                report.failed.push((name, e));
                continue;
            }

            if registry.register(plugin).is_some() {
                report.replaced.push(name.clone());
                report.loaded.retain(|n| n != &name);
            }
            report.loaded.push(name);
        }

        (registry, report)
    }

    /// Register a plugin under its lowercased name. Returns the plugin it replaced.
    pub fn register(&mut self, plugin: Arc<dyn Plugin>) -> Option<Arc<dyn Plugin>> {
        let name = plugin.name().to_lowercase();
        let replaced = self.plugins.insert(name, plugin);
        self.rebuild_infos();
        replaced
    }

    fn rebuild_infos(&mut self) {
        let mut infos: Vec<PluginInfo> = self.plugins.values().map(|p| PluginInfo::of(p.as_ref())).collect();
        infos.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.name.cmp(&b.name)));
        self.infos = infos;
    }

    /// Exact, case-insensitive lookup
    pub fn get(&self, command: &str) -> Option<Arc<dyn Plugin>> {
        self.plugins.get(&command.to_lowercase()).cloned()
    }

    pub fn contains(&self, command: &str) -> bool {
        self.plugins.contains_key(&command.to_lowercase())
    }

    /// Registered commands sorted by category, then name
    pub fn infos(&self) -> &[PluginInfo] {
        &self.infos
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// A bot without a single command cannot serve anyone
    pub fn ensure_loaded(&self) -> Result<(), PluginError> {
        if self.is_empty() {
            return Err(PluginError::Init("no plugin could be initialised".to_string()));
        }
        Ok(())
    }
}

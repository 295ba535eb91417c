//! Bindings configuration
//!
//! Loaded from `~/.config/keybind/bindings.yaml`, falling back to the
//! embedded `bindings.yaml` when no user file exists or it fails to parse.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::keymap::{BindOptions, BindingRegistry, Callback, ConfigError, ListenerId};

/// Embedded default bindings
pub const DEFAULT_BINDINGS_YAML: &str = include_str!("../bindings.yaml");

/// Which phase of a combination a binding fires on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    #[default]
    Down,
    Up,
    Both,
}

/// One entry of the `bindings` list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BindingEntry {
    #[serde(flatten)]
    pub options: BindOptions,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub on: Trigger,
}

impl BindingEntry {
    /// The label, or the patterns when no label is set
    pub fn display_label(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => self.options.bind_keys.to_string(),
        }
    }
}

/// Registry settings plus the bindings to install
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BindingsConfig {
    #[serde(default = "default_sequence_interval_ms")]
    pub sequence_interval_ms: u64,
    #[serde(default)]
    pub sequence_must_release_last_press: bool,
    /// Context active at startup
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub bindings: Vec<BindingEntry>,
}

fn default_sequence_interval_ms() -> u64 {
    666
}

impl Default for BindingsConfig {
    fn default() -> Self {
        Self {
            sequence_interval_ms: default_sequence_interval_ms(),
            sequence_must_release_last_press: false,
            context: None,
            bindings: Vec::new(),
        }
    }
}

impl BindingsConfig {
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content)
    }

    /// The embedded defaults
    pub fn embedded() -> Self {
        match Self::parse(DEFAULT_BINDINGS_YAML) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("Embedded bindings.yaml is invalid: {}", e);
                Self::default()
            }
        }
    }

    /// Load the user's bindings file, or the embedded defaults
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::bindings_file() else {
            tracing::debug!("No config directory available, using embedded bindings");
            return Self::embedded();
        };

        if !path.exists() {
            tracing::debug!(
                "Bindings file not found at {}, using embedded bindings",
                path.display()
            );
            return Self::embedded();
        }

        match Self::load_file(&path) {
            Ok(config) => {
                tracing::info!("Loaded bindings from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("Failed to load bindings at {}: {}", path.display(), e);
                Self::embedded()
            }
        }
    }

    pub fn sequence_interval(&self) -> Duration {
        Duration::from_millis(self.sequence_interval_ms)
    }

    /// Apply interval, must-release mode and startup context
    pub fn apply_settings(&self, registry: &mut BindingRegistry) {
        registry.set_sequence_interval(self.sequence_interval());
        registry.set_sequence_must_release_last_press(self.sequence_must_release_last_press);
        registry.set_context(self.context.as_deref());
    }

    /// Bind every entry, asking `action` for the callback of each
    ///
    /// Entries that produce no listener are logged and skipped.
    pub fn bind_all<F>(&self, registry: &mut BindingRegistry, mut action: F) -> Vec<ListenerId>
    where
        F: FnMut(&BindingEntry) -> Callback,
    {
        let mut ids = Vec::new();
        for entry in &self.bindings {
            let callback = action(entry);
            let (down, up) = match entry.on {
                Trigger::Down => (Some(callback), None),
                Trigger::Up => (None, Some(callback)),
                Trigger::Both => (Some(callback.clone()), Some(callback)),
            };

            match registry.bind(entry.options.clone(), down, up) {
                Ok(bound) => ids.extend(bound),
                Err(e) => tracing::warn!("Skipping binding {}: {}", entry.display_label(), e),
            }
        }
        ids
    }
}

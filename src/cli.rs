//! Command-line argument parsing for the keybind probe
//!
//! Supports:
//! - Loading a bindings file other than the default
//! - Ad-hoc patterns from the command line
//! - Overriding the context and sequence settings
//! - JSON state snapshots on every keystroke

use clap::Parser;
use std::path::PathBuf;

use crate::config::{BindingEntry, BindingsConfig, Trigger};
use crate::keymap::BindOptions;

/// Print which key bindings fire as you type
#[derive(Parser, Debug)]
#[command(name = "keybind", version, about = "Key combination and sequence probe")]
pub struct CliArgs {
    /// Bindings file (defaults to ~/.config/keybind/bindings.yaml)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Extra pattern to bind, e.g. "ctrl+k" or "g->g" (repeatable)
    #[arg(short, long = "bind", value_name = "PATTERN")]
    pub binds: Vec<String>,

    /// Context to activate at startup
    #[arg(long, value_name = "NAME")]
    pub context: Option<String>,

    /// Maximum gap between sequence presses, in milliseconds
    #[arg(long, value_name = "MS")]
    pub sequence_interval: Option<u64>,

    /// Only advance sequences while a single key is held
    #[arg(long)]
    pub must_release: bool,

    /// Print tracker state as JSON after every key event
    #[arg(long)]
    pub json: bool,

    /// Log debug output to the console
    #[arg(short, long)]
    pub verbose: bool,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub bindings: BindingsConfig,
    pub json: bool,
}

impl CliArgs {
    /// Resolve the bindings to use and apply command-line overrides
    ///
    /// Patterns given with `--bind` replace the default bindings file unless
    /// `--config` names one explicitly.
    pub fn into_config(self) -> Result<ProbeConfig, String> {
        let mut bindings = match &self.config {
            Some(path) => BindingsConfig::load_file(path)
                .map_err(|e| format!("Cannot load {}: {}", path.display(), e))?,
            None if !self.binds.is_empty() => BindingsConfig::default(),
            None => BindingsConfig::load(),
        };

        bindings
            .bindings
            .extend(self.binds.into_iter().map(|pattern| BindingEntry {
                options: BindOptions::new(pattern),
                label: None,
                on: Trigger::Down,
            }));

        if let Some(context) = self.context {
            bindings.context = Some(context);
        }
        if let Some(ms) = self.sequence_interval {
            bindings.sequence_interval_ms = ms;
        }
        if self.must_release {
            bindings.sequence_must_release_last_press = true;
        }

        Ok(ProbeConfig {
            bindings,
            json: self.json,
        })
    }
}

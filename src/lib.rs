//! keybind - key combination and key sequence binding engine
//!
//! This crate matches raw keyboard input against bound patterns
//! (`"ctrl+s"`, `"g->g"`) and invokes the callbacks of every listener that
//! matches, with listeners grouped into switchable contexts.

pub mod cli;
pub mod config;
pub mod config_paths;
pub mod keymap;
pub mod tracing;

// Re-export commonly used types
pub use config::BindingsConfig;
pub use keymap::{BindOptions, BindingRegistry, KeyTable, ListenerId, RawInput};

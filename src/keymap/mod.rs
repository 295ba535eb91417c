//! Key-binding matching engine
//!
//! This module turns raw key-down/key-up events into callback invocations:
//! - Combinations (`"ctrl+shift+s"`) fire once every listed key is held
//! - Sequences (`"g->g"`, `"up->up->down"`) fire when presses arrive within the sequence interval
//! - Listeners can be scoped to a named context and switched as a group
//! - Matching works on the produced key, the legacy numeric code or the physical key
//!
//! # Architecture
//!
//! ```text
//! winit::WindowEvent → RawInput → InputTracker → Listener::on_press_down/up → Callback
//! ```
//!
//! # Binding
//!
//! ```ignore
//! let mut registry = BindingRegistry::new();
//! registry.mount();
//! registry.bind(
//!     BindOptions::new(["ctrl+s", "g->g"]).context("editor"),
//!     Some(callback(|| println!("fired"))),
//!     None,
//! )?;
//! registry.set_context(Some("editor"));
//! ```

mod error;
mod event;
mod key_table;
mod listener;
mod options;
mod pattern;
mod registry;
mod tracker;
mod winit_adapter;

pub use error::{BindError, ConfigError, ListenerError, PatternError, UnknownKeyName};
pub use event::{EventType, KeyEvent, KeyRepr, RawInput, PLUS_ALIAS};
pub use key_table::{Browser, HostProfile, KeyEntry, KeyTable, Platform};
pub use listener::{callback, Callback, Listener, ListenerId, TriggeredRecord, MUST_RELEASE_FIRE_DELAY};
pub use options::{BindKeys, BindOptions, ListenerConfig, StrictOrder};
pub use pattern::{
    parse_bind_keys, BindingPattern, PatternKind, COMBINATION_SEPARATOR, SEQUENCE_SEPARATOR,
};
pub use registry::BindingRegistry;
pub use tracker::{InputTracker, SequenceRecord, TrackSnapshot, DEFAULT_SEQUENCE_INTERVAL};
pub use winit_adapter::{key_event_from_winit, raw_input_from_window_event};

//! Configuration system tests
//!
//! Tests for config paths and loading bindings files into a registry.

mod common;

use std::fs;

use common::{Journal, Keyboard};
use keybind::config::{BindingsConfig, Trigger};
use keybind::config_paths;
use keybind::keymap::{ConfigError, EventType, StrictOrder};
use tempfile::TempDir;

// ========================================================================
// Config Paths Tests
// ========================================================================

#[test]
fn test_config_dir_contains_app_name() {
    let Some(dir) = config_paths::config_dir() else {
        return;
    };
    assert!(dir.to_string_lossy().contains("keybind"));
}

#[test]
fn test_bindings_file_ends_with_yaml() {
    if let Some(path) = config_paths::bindings_file() {
        assert!(path.to_string_lossy().ends_with("bindings.yaml"));
    }
}

// ========================================================================
// Loading
// ========================================================================

const SAMPLE: &str = r#"
sequence_interval_ms: 400
context: editor
bindings:
  - bind_keys: "ctrl+s"
    label: save
    context: editor
  - bind_keys: ["g->g", "home"]
    label: top
  - bind_keys: "shift+a"
    label: shift-a
    on: both
    prevent_same: true
  - bind_keys: "ctrl+a"
    label: strict
    strict_order: equal
    event_type: keyCode
  - bind_keys: "nosuchkey"
    label: broken
"#;

fn write_sample(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("bindings.yaml");
    fs::write(&path, SAMPLE).unwrap();
    path
}

#[test]
fn test_load_file() {
    let dir = TempDir::new().unwrap();
    let config = BindingsConfig::load_file(write_sample(&dir)).unwrap();

    assert_eq!(config.sequence_interval_ms, 400);
    assert_eq!(config.context.as_deref(), Some("editor"));
    assert_eq!(config.bindings.len(), 5);

    let strict = &config.bindings[3];
    assert_eq!(strict.options.config.strict_order, StrictOrder::Equal);
    assert_eq!(strict.options.config.event_type, EventType::NumericCode);
    assert_eq!(config.bindings[2].on, Trigger::Both);
}

#[test]
fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = BindingsConfig::load_file(dir.path().join("missing.yaml"));
    assert!(matches!(result, Err(ConfigError::Io { .. })));
}

#[test]
fn test_load_invalid_yaml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bindings.yaml");
    fs::write(&path, "bindings:\n  - bind_keys: [unclosed\n").unwrap();
    assert!(matches!(
        BindingsConfig::load_file(&path),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn test_invalid_strict_order_is_a_parse_error() {
    let yaml = "bindings:\n  - bind_keys: a+b\n    strict_order: maybe\n";
    assert!(BindingsConfig::parse(yaml).is_err());
}

// ========================================================================
// Installing into a registry
// ========================================================================

fn install(kb: &mut Keyboard, journal: &Journal) -> usize {
    let dir = TempDir::new().unwrap();
    let config = BindingsConfig::load_file(write_sample(&dir)).unwrap();
    config.apply_settings(&mut kb.registry);
    config
        .bind_all(&mut kb.registry, |entry| {
            journal
                .callback(&entry.display_label())
                .expect("journal callback")
        })
        .len()
}

#[test]
fn test_bind_all_skips_broken_entries() {
    let mut kb = Keyboard::new();
    let journal = Journal::new();

    // ctrl+s, g->g, home, shift+a, ctrl+a; "nosuchkey" is dropped
    assert_eq!(install(&mut kb, &journal), 5);
    assert_eq!(kb.registry.current_context(), Some("editor"));
}

#[test]
fn test_installed_bindings_fire() {
    let mut kb = Keyboard::new();
    let journal = Journal::new();
    install(&mut kb, &journal);

    kb.down("ctrl");
    kb.down("s");
    kb.up("s");
    kb.up("ctrl");

    kb.advance(1000);
    kb.type_keys(&["g", "g"], 100);

    kb.down("shift");
    kb.down("a");
    kb.up("a");
    kb.up("shift");

    assert_eq!(journal.entries(), vec!["save", "top", "shift-a", "shift-a"]);
}

#[test]
fn test_installed_interval_applies() {
    let mut kb = Keyboard::new();
    let journal = Journal::new();
    install(&mut kb, &journal);

    kb.tap("g");
    kb.advance(450);
    kb.tap("g");
    assert!(journal.entries().is_empty());
}

#[test]
fn test_installed_strict_order() {
    let mut kb = Keyboard::new();
    let journal = Journal::new();
    install(&mut kb, &journal);

    kb.down("a");
    kb.down("ctrl");
    assert!(journal.entries().is_empty());

    kb.blur();
    kb.down("ctrl");
    kb.down("a");
    assert_eq!(journal.entries(), vec!["strict"]);
}

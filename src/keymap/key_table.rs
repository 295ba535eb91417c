//! Canonical key-name table
//!
//! Maps the symbolic names used in pattern strings ("a", "shift", "numpad0",
//! "command") to the three identities a keyboard event carries. Numeric codes
//! differ between hosts, so the table is built once per [`HostProfile`].

use std::collections::HashMap;

use indexmap::IndexMap;

use super::error::UnknownKeyName;
use super::event::{EventType, KeyRepr};

/// The three identities of one key
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEntry {
    pub key: &'static str,
    pub numeric_code: u32,
    pub physical_code: &'static str,
}

impl KeyEntry {
    /// The representation of this key for the given event type
    pub fn repr(&self, event_type: EventType) -> KeyRepr {
        match event_type {
            EventType::Key => KeyRepr::name(self.key),
            EventType::NumericCode => KeyRepr::Code(self.numeric_code),
            EventType::PhysicalCode => KeyRepr::name(self.physical_code),
        }
    }
}

/// Operating system the events come from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Platform {
    Mac,
    Windows,
    Linux,
    #[default]
    Other,
}

/// Browser engine family, where events are produced by a web host
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Browser {
    Chrome,
    Safari,
    Firefox,
    /// Presto-era Opera; Chromium-based Opera reports as `Chrome`
    Opera,
}

/// Describes where key events come from, which decides numeric-code overrides
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HostProfile {
    pub platform: Platform,
    pub browser: Option<Browser>,
}

impl HostProfile {
    pub const fn new(platform: Platform, browser: Option<Browser>) -> Self {
        Self { platform, browser }
    }

    /// Profile for a native (non-browser) host on the compile target
    pub fn native() -> Self {
        let platform = if cfg!(target_os = "macos") {
            Platform::Mac
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else {
            Platform::Other
        };
        Self::new(platform, None)
    }

    /// Derive the profile from a user agent and a `navigator.platform`-style string
    pub fn from_user_agent(user_agent: &str, platform: &str) -> Self {
        let platform = if platform.contains("Mac") {
            Platform::Mac
        } else if platform.contains("Win") {
            Platform::Windows
        } else if platform.contains("Linux") {
            Platform::Linux
        } else {
            Platform::Other
        };

        let browser = if user_agent.contains("Firefox") {
            Some(Browser::Firefox)
        } else if user_agent.contains("Chrome") {
            Some(Browser::Chrome)
        } else if user_agent.contains("Safari") {
            Some(Browser::Safari)
        } else if user_agent.contains("Opera") {
            Some(Browser::Opera)
        } else {
            None
        };

        Self::new(platform, browser)
    }

    pub fn is_mac(&self) -> bool {
        self.platform == Platform::Mac
    }
}

/// (name, key, numeric code, physical code)
const BASE_KEYS: &[(&str, &str, u32, &str)] = &[
    ("cancel", "Cancel", 3, "Cancel"),
    ("backspace", "Backspace", 8, "Backspace"),
    ("tab", "Tab", 9, "Tab"),
    ("clear", "Clear", 12, "Clear"),
    ("enter", "Enter", 13, "Enter"),
    ("shift", "Shift", 16, "ShiftLeft"),
    ("shiftLeft", "Shift", 16, "ShiftLeft"),
    ("shiftRight", "Shift", 16, "ShiftRight"),
    ("ctrl", "Control", 17, "ControlLeft"),
    ("ctrlLeft", "Control", 17, "ControlLeft"),
    ("ctrlRight", "Control", 17, "ControlRight"),
    ("alt", "Alt", 18, "AltLeft"),
    ("altLeft", "Alt", 18, "AltLeft"),
    ("altRight", "Alt", 18, "AltRight"),
    ("menu", "ContextMenu", 93, "ContextMenu"),
    ("pause", "Pause", 19, "Pause"),
    ("break", "Pause", 19, "Pause"),
    ("capslock", "CapsLock", 20, "CapsLock"),
    ("escape", "Escape", 27, "Escape"),
    ("esc", "Escape", 27, "Escape"),
    ("space", " ", 32, "Space"),
    ("spacebar", " ", 32, "Space"),
    ("pageUp", "PageUp", 33, "PageUp"),
    ("pageDown", "PageDown", 34, "PageDown"),
    ("end", "End", 35, "End"),
    ("home", "Home", 36, "Home"),
    ("left", "ArrowLeft", 37, "ArrowLeft"),
    ("up", "ArrowUp", 38, "ArrowUp"),
    ("right", "ArrowRight", 39, "ArrowRight"),
    ("down", "ArrowDown", 40, "ArrowDown"),
    ("select", "Select", 41, "Select"),
    ("printScreen", "PrintScreen", 42, "PrintScreen"),
    ("execute", "Execute", 43, "Execute"),
    ("snapshot", "SnapShot", 44, "SnapShot"),
    ("insert", "Insert", 45, "Insert"),
    ("ins", "Insert", 45, "Insert"),
    ("delete", "Delete", 46, "Delete"),
    ("del", "Delete", 46, "Delete"),
    ("help", "Help", 47, "Help"),
    ("scrollLock", "ScrollLock", 145, "ScrollLock"),
    // Punctuation
    (",", ",", 188, "Comma"),
    ("<", "<", 188, "Comma"),
    (".", ".", 190, "Period"),
    (">", ">", 190, "Period"),
    ("/", "/", 191, "Slash"),
    ("?", "?", 191, "Slash"),
    ("`", "`", 192, "Backquote"),
    ("~", "~", 192, "Backquote"),
    ("[", "[", 219, "BracketLeft"),
    ("{", "{", 219, "BracketLeft"),
    ("\\", "\\", 220, "Backslash"),
    ("|", "|", 220, "Backslash"),
    ("]", "]", 221, "BracketRight"),
    ("}", "}", 221, "BracketRight"),
    ("'", "'", 222, "Quote"),
    ("\"", "\"", 222, "Quote"),
    (";", ";", 186, "Semicolon"),
    (":", ":", 186, "Semicolon"),
    ("-", "-", 189, "Minus"),
    ("_", "_", 189, "Minus"),
    ("=", "=", 187, "Equal"),
    ("equal", "+", 187, "Equal"),
    // Digit row
    ("0", "0", 48, "Digit0"),
    (")", ")", 48, "Digit0"),
    ("1", "1", 49, "Digit1"),
    ("!", "!", 49, "Digit1"),
    ("2", "2", 50, "Digit2"),
    ("@", "@", 50, "Digit2"),
    ("3", "3", 51, "Digit3"),
    ("#", "#", 51, "Digit3"),
    ("4", "4", 52, "Digit4"),
    ("$", "$", 52, "Digit4"),
    ("5", "5", 53, "Digit5"),
    ("%", "%", 53, "Digit5"),
    ("6", "6", 54, "Digit6"),
    ("^", "^", 54, "Digit6"),
    ("7", "7", 55, "Digit7"),
    ("&", "&", 55, "Digit7"),
    ("8", "8", 56, "Digit8"),
    ("*", "*", 56, "Digit8"),
    ("9", "9", 57, "Digit9"),
    ("(", "(", 57, "Digit9"),
    // Numpad
    ("numpad0", "0", 96, "Numpad0"),
    ("numpad1", "1", 97, "Numpad1"),
    ("numpad2", "2", 98, "Numpad2"),
    ("numpad3", "3", 99, "Numpad3"),
    ("numpad4", "4", 100, "Numpad4"),
    ("numpad5", "5", 101, "Numpad5"),
    ("numpad6", "6", 102, "Numpad6"),
    ("numpad7", "7", 103, "Numpad7"),
    ("numpad8", "8", 104, "Numpad8"),
    ("numpad9", "9", 105, "Numpad9"),
    ("numpadDivide", "/", 111, "NumpadDivide"),
    ("numpadMultiply", "*", 106, "NumpadMultiply"),
    ("numpadSubtract", "-", 109, "NumpadSubtract"),
    ("numpadAdd", "+", 107, "NumpadAdd"),
    ("numpadEnter", "Enter", 13, "NumpadEnter"),
    // Letters
    ("a", "a", 65, "KeyA"),
    ("A", "A", 65, "KeyA"),
    ("b", "b", 66, "KeyB"),
    ("B", "B", 66, "KeyB"),
    ("c", "c", 67, "KeyC"),
    ("C", "C", 67, "KeyC"),
    ("d", "d", 68, "KeyD"),
    ("D", "D", 68, "KeyD"),
    ("e", "e", 69, "KeyE"),
    ("E", "E", 69, "KeyE"),
    ("f", "f", 70, "KeyF"),
    ("F", "F", 70, "KeyF"),
    ("g", "g", 71, "KeyG"),
    ("G", "G", 71, "KeyG"),
    ("h", "h", 72, "KeyH"),
    ("H", "H", 72, "KeyH"),
    ("i", "i", 73, "KeyI"),
    ("I", "I", 73, "KeyI"),
    ("j", "j", 74, "KeyJ"),
    ("J", "J", 74, "KeyJ"),
    ("k", "k", 75, "KeyK"),
    ("K", "K", 75, "KeyK"),
    ("l", "l", 76, "KeyL"),
    ("L", "L", 76, "KeyL"),
    ("m", "m", 77, "KeyM"),
    ("M", "M", 77, "KeyM"),
    ("n", "n", 78, "KeyN"),
    ("N", "N", 78, "KeyN"),
    ("o", "o", 79, "KeyO"),
    ("O", "O", 79, "KeyO"),
    ("p", "p", 80, "KeyP"),
    ("P", "P", 80, "KeyP"),
    ("q", "q", 81, "KeyQ"),
    ("Q", "Q", 81, "KeyQ"),
    ("r", "r", 82, "KeyR"),
    ("R", "R", 82, "KeyR"),
    ("s", "s", 83, "KeyS"),
    ("S", "S", 83, "KeyS"),
    ("t", "t", 84, "KeyT"),
    ("T", "T", 84, "KeyT"),
    ("u", "u", 85, "KeyU"),
    ("U", "U", 85, "KeyU"),
    ("v", "v", 86, "KeyV"),
    ("V", "V", 86, "KeyV"),
    ("w", "w", 87, "KeyW"),
    ("W", "W", 87, "KeyW"),
    ("x", "x", 88, "KeyX"),
    ("X", "X", 88, "KeyX"),
    ("y", "y", 89, "KeyY"),
    ("Y", "Y", 89, "KeyY"),
    ("z", "z", 90, "KeyZ"),
    ("Z", "Z", 90, "KeyZ"),
    // Platform command key
    ("command", "Meta", 91, "MetaLeft"),
    ("commandLeft", "Meta", 91, "MetaLeft"),
    ("commandRight", "Meta", 93, "MetaRight"),
];

/// Immutable name → [`KeyEntry`] table with host overrides applied
#[derive(Debug, Clone)]
pub struct KeyTable {
    entries: IndexMap<&'static str, KeyEntry>,
    by_physical: HashMap<&'static str, u32>,
    host: HostProfile,
}

impl KeyTable {
    /// Build the table for a host: base entries, then browser and platform overrides
    pub fn new(host: HostProfile) -> Self {
        let mut entries: IndexMap<&'static str, KeyEntry> = BASE_KEYS
            .iter()
            .map(|&(name, key, numeric_code, physical_code)| {
                (
                    name,
                    KeyEntry {
                        key,
                        numeric_code,
                        physical_code,
                    },
                )
            })
            .collect();

        for &(name, code) in browser_overrides(host) {
            patch_numeric_code(&mut entries, name, code);
        }
        for &(name, code) in platform_overrides(host) {
            patch_numeric_code(&mut entries, name, code);
        }

        // First entry wins so "ShiftLeft" resolves through "shift", not an alias
        let mut by_physical = HashMap::new();
        for entry in entries.values() {
            by_physical
                .entry(entry.physical_code)
                .or_insert(entry.numeric_code);
        }

        Self {
            entries,
            by_physical,
            host,
        }
    }

    /// Table for the compile-target platform
    pub fn native() -> Self {
        Self::new(HostProfile::native())
    }

    pub fn host(&self) -> HostProfile {
        self.host
    }

    /// Entry for a symbolic name; the same reference is returned on every call
    pub fn entry(&self, name: &str) -> Option<&KeyEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Resolve a symbolic name to its representation for an event type
    pub fn lookup(&self, name: &str, event_type: EventType) -> Result<KeyRepr, UnknownKeyName> {
        self.entry(name)
            .map(|entry| entry.repr(event_type))
            .ok_or_else(|| UnknownKeyName(name.to_string()))
    }

    /// All symbolic names, in declaration order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    /// Numeric code for a physical code, for hosts that only report the physical key
    pub fn numeric_code_for_physical(&self, physical_code: &str) -> Option<u32> {
        self.by_physical.get(physical_code).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for KeyTable {
    fn default() -> Self {
        Self::native()
    }
}

fn browser_overrides(host: HostProfile) -> &'static [(&'static str, u32)] {
    match host.browser {
        Some(Browser::Firefox) => &[(";", 59), ("-", 173), ("=", 61)],
        _ => &[],
    }
}

fn platform_overrides(host: HostProfile) -> &'static [(&'static str, u32)] {
    if !host.is_mac() {
        return &[];
    }
    match host.browser {
        Some(Browser::Chrome | Browser::Safari) => &[("commandLeft", 91), ("commandRight", 93)],
        Some(Browser::Opera) => &[("commandLeft", 17), ("commandRight", 17)],
        Some(Browser::Firefox) => &[("commandLeft", 224), ("commandRight", 224)],
        None => &[],
    }
}

fn patch_numeric_code(entries: &mut IndexMap<&'static str, KeyEntry>, name: &str, code: u32) {
    if let Some(entry) = entries.get_mut(name) {
        entry.numeric_code = code;
    }
}

//! Raw keyboard input and the key representations matched against it

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::key_table::KeyEntry;

/// Token used in place of a literal `+`, which doubles as the combination separator
pub const PLUS_ALIAS: &str = "equal";

/// Which identity of a key a listener matches against
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// The produced key value ("a", "A", "Shift", "Enter")
    #[default]
    Key,
    /// The legacy numeric key code (65, 16, 13)
    #[serde(alias = "keyCode")]
    NumericCode,
    /// The physical key position ("KeyA", "ShiftLeft")
    #[serde(alias = "code")]
    PhysicalCode,
}

impl EventType {
    pub const ALL: [EventType; 3] = [
        EventType::Key,
        EventType::NumericCode,
        EventType::PhysicalCode,
    ];

    #[inline]
    pub(crate) const fn index(self) -> usize {
        match self {
            EventType::Key => 0,
            EventType::NumericCode => 1,
            EventType::PhysicalCode => 2,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::Key => write!(f, "key"),
            EventType::NumericCode => write!(f, "numeric_code"),
            EventType::PhysicalCode => write!(f, "physical_code"),
        }
    }
}

/// One representation of a key: a name for `Key`/`PhysicalCode`, a number for `NumericCode`
///
/// A literal `+` name is always stored as [`PLUS_ALIAS`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum KeyRepr {
    Name(String),
    Code(u32),
}

impl KeyRepr {
    pub fn name(name: impl Into<String>) -> Self {
        let name = name.into();
        if name == "+" {
            KeyRepr::Name(PLUS_ALIAS.to_string())
        } else {
            KeyRepr::Name(name)
        }
    }

    /// The ASCII letter this representation stands for, if it is a single letter
    pub fn letter(&self) -> Option<char> {
        match self {
            KeyRepr::Name(name) => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_alphabetic() => Some(c),
                    _ => None,
                }
            }
            KeyRepr::Code(_) => None,
        }
    }

    /// Compare two representations, folding letter case when `fold_case` is set
    pub fn matches(&self, other: &KeyRepr, fold_case: bool) -> bool {
        if fold_case {
            if let (Some(a), Some(b)) = (self.letter(), other.letter()) {
                return a.eq_ignore_ascii_case(&b);
            }
        }
        self == other
    }
}

impl fmt::Display for KeyRepr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyRepr::Name(name) => write!(f, "{}", name),
            KeyRepr::Code(code) => write!(f, "{}", code),
        }
    }
}

/// A raw key-down or key-up event as delivered by the host
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    /// Produced key value ("a", "A", "Meta", " ")
    pub key: String,
    /// Legacy numeric key code
    pub key_code: u32,
    /// Physical key position ("KeyA", "MetaLeft")
    pub code: String,
    /// OS auto-repeat
    pub repeat: bool,
    /// When the host observed the event
    pub time: Instant,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>, key_code: u32, code: impl Into<String>, time: Instant) -> Self {
        Self {
            key: key.into(),
            key_code,
            code: code.into(),
            repeat: false,
            time,
        }
    }

    /// Build the event a host would deliver for a table entry
    pub fn from_entry(entry: &KeyEntry, time: Instant) -> Self {
        Self::new(entry.key, entry.numeric_code, entry.physical_code, time)
    }

    /// Mark this event as an OS auto-repeat (builder pattern)
    pub fn with_repeat(mut self, repeat: bool) -> Self {
        self.repeat = repeat;
        self
    }

    /// The representation of this event for the given event type
    pub fn repr(&self, event_type: EventType) -> KeyRepr {
        match event_type {
            EventType::Key => KeyRepr::name(self.key.as_str()),
            EventType::NumericCode => KeyRepr::Code(self.key_code),
            EventType::PhysicalCode => KeyRepr::name(self.code.as_str()),
        }
    }

    /// Whether this is the platform meta/command key
    pub fn is_meta(&self) -> bool {
        self.key == "Meta"
    }
}

/// Everything the registry listens to once mounted
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawInput {
    KeyDown(KeyEvent),
    KeyUp(KeyEvent),
    /// The window lost focus; no release events will follow for held keys
    Blur,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plus_is_aliased() {
        assert_eq!(KeyRepr::name("+"), KeyRepr::Name("equal".to_string()));
        assert_eq!(KeyRepr::name("="), KeyRepr::Name("=".to_string()));
    }

    #[test]
    fn test_letter_detection() {
        assert_eq!(KeyRepr::name("a").letter(), Some('a'));
        assert_eq!(KeyRepr::name("Z").letter(), Some('Z'));
        assert_eq!(KeyRepr::name("Shift").letter(), None);
        assert_eq!(KeyRepr::name("1").letter(), None);
        assert_eq!(KeyRepr::Code(65).letter(), None);
    }

    #[test]
    fn test_matches_folds_only_letters() {
        let lower = KeyRepr::name("a");
        let upper = KeyRepr::name("A");
        assert!(lower.matches(&upper, true));
        assert!(!lower.matches(&upper, false));
        assert!(!KeyRepr::name("Shift").matches(&KeyRepr::name("shift"), true));
    }

    #[test]
    fn test_event_repr_per_type() {
        let event = KeyEvent::new("a", 65, "KeyA", Instant::now());
        assert_eq!(event.repr(EventType::Key), KeyRepr::name("a"));
        assert_eq!(event.repr(EventType::NumericCode), KeyRepr::Code(65));
        assert_eq!(event.repr(EventType::PhysicalCode), KeyRepr::name("KeyA"));
    }

    #[test]
    fn test_event_type_deserialize_aliases() {
        let t: EventType = serde_yaml::from_str("keyCode").unwrap();
        assert_eq!(t, EventType::NumericCode);
        let t: EventType = serde_yaml::from_str("physical_code").unwrap();
        assert_eq!(t, EventType::PhysicalCode);
    }
}

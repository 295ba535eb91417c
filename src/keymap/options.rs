//! Options accepted by `BindingRegistry::bind`

use std::fmt;

use serde::Deserialize;

use super::event::EventType;

/// One pattern string or a list of them
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum BindKeys {
    One(String),
    Many(Vec<String>),
}

impl BindKeys {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            BindKeys::One(pattern) => std::slice::from_ref(pattern),
            BindKeys::Many(patterns) => patterns,
        };
        slice.iter().map(String::as_str)
    }
}

impl fmt::Display for BindKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindKeys::One(pattern) => write!(f, "{:?}", pattern),
            BindKeys::Many(patterns) => write!(f, "{:?}", patterns),
        }
    }
}

/// How strictly the order of held keys must follow a combination's declared order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "StrictOrderValue")]
pub enum StrictOrder {
    /// Any order
    #[default]
    Off,
    /// The held keys must contain the pattern keys as a contiguous, ordered run
    Contains,
    /// The held keys must be exactly the pattern keys, in order
    Equal,
}

/// Config-file spelling: `false`, `true` or `"equal"`
#[derive(Deserialize)]
#[serde(untagged)]
enum StrictOrderValue {
    Flag(bool),
    Named(String),
}

impl TryFrom<StrictOrderValue> for StrictOrder {
    type Error = String;

    fn try_from(value: StrictOrderValue) -> Result<Self, Self::Error> {
        match value {
            StrictOrderValue::Flag(false) => Ok(StrictOrder::Off),
            StrictOrderValue::Flag(true) => Ok(StrictOrder::Contains),
            StrictOrderValue::Named(name) => match name.as_str() {
                "equal" => Ok(StrictOrder::Equal),
                "contains" => Ok(StrictOrder::Contains),
                "off" => Ok(StrictOrder::Off),
                _ => Err(format!("invalid strict_order {:?}", name)),
            },
        }
    }
}

impl From<bool> for StrictOrder {
    fn from(flag: bool) -> Self {
        if flag {
            StrictOrder::Contains
        } else {
            StrictOrder::Off
        }
    }
}

/// Per-listener matching behavior
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListenerConfig {
    #[serde(default)]
    pub event_type: EventType,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default = "default_true")]
    pub prevent_repeat: bool,
    #[serde(default)]
    pub prevent_same: bool,
    #[serde(default)]
    pub strict_order: StrictOrder,
    #[serde(default)]
    pub case_sensitive: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            event_type: EventType::Key,
            context: None,
            prevent_repeat: true,
            prevent_same: false,
            strict_order: StrictOrder::Off,
            case_sensitive: false,
        }
    }
}

/// Patterns plus the listener configuration they are bound with
///
/// Plain strings and string lists convert into options with defaults, so
/// `registry.bind("ctrl+s", ..)` and `registry.bind(BindOptions::new("ctrl+s"), ..)`
/// are equivalent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BindOptions {
    pub bind_keys: BindKeys,
    #[serde(flatten)]
    pub config: ListenerConfig,
}

impl BindOptions {
    pub fn new(bind_keys: impl Into<BindKeys>) -> Self {
        Self {
            bind_keys: bind_keys.into(),
            config: ListenerConfig::default(),
        }
    }

    pub fn event_type(mut self, event_type: EventType) -> Self {
        self.config.event_type = event_type;
        self
    }

    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.config.context = Some(context.into());
        self
    }

    pub fn prevent_repeat(mut self, prevent_repeat: bool) -> Self {
        self.config.prevent_repeat = prevent_repeat;
        self
    }

    pub fn prevent_same(mut self, prevent_same: bool) -> Self {
        self.config.prevent_same = prevent_same;
        self
    }

    pub fn strict_order(mut self, strict_order: impl Into<StrictOrder>) -> Self {
        self.config.strict_order = strict_order.into();
        self
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.config.case_sensitive = case_sensitive;
        self
    }
}

impl From<&str> for BindKeys {
    fn from(pattern: &str) -> Self {
        BindKeys::One(pattern.to_string())
    }
}

impl From<String> for BindKeys {
    fn from(pattern: String) -> Self {
        BindKeys::One(pattern)
    }
}

impl From<Vec<String>> for BindKeys {
    fn from(patterns: Vec<String>) -> Self {
        BindKeys::Many(patterns)
    }
}

impl From<Vec<&str>> for BindKeys {
    fn from(patterns: Vec<&str>) -> Self {
        BindKeys::Many(patterns.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for BindKeys {
    fn from(patterns: &[&str]) -> Self {
        BindKeys::Many(patterns.iter().map(|p| p.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for BindKeys {
    fn from(patterns: [&str; N]) -> Self {
        BindKeys::Many(patterns.iter().map(|p| p.to_string()).collect())
    }
}

macro_rules! bind_options_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for BindOptions {
                fn from(bind_keys: $ty) -> Self {
                    BindOptions::new(bind_keys)
                }
            }
        )*
    };
}

bind_options_from!(BindKeys, &str, String, Vec<String>, Vec<&str>, &[&str]);

impl<const N: usize> From<[&str; N]> for BindOptions {
    fn from(patterns: [&str; N]) -> Self {
        BindOptions::new(patterns)
    }
}

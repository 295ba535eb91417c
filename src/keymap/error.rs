//! Error types for the binding engine
//!
//! Nothing on the public surface panics. Pattern-level problems are dropped
//! (and logged) by `bind`, which only fails when no listener could be built.

use thiserror::Error;

/// A symbolic key name that is not present in the key table
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown key name: {0:?}")]
pub struct UnknownKeyName(pub String);

/// Reasons a single pattern string is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("Pattern mixes '+' and '->' separators: {0:?}")]
    MixedSeparators(String),

    #[error("Pattern {pattern:?} references unknown key {key:?}")]
    UnknownKey { pattern: String, key: String },
}

/// Reasons a listener cannot be constructed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListenerError {
    #[error("Listener has neither a press-down nor a press-up callback")]
    MissingCallback,

    #[error("Sequence {0:?} requires a press-down callback")]
    SequenceWithoutPressDown(String),

    #[error(transparent)]
    UnknownKey(#[from] UnknownKeyName),
}

/// Reasons `BindingRegistry::bind` produced no listeners
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("bind requires a press-down or press-up callback")]
    MissingCallback,

    #[error("No valid pattern in {0}")]
    NoValidPattern(String),
}

/// Errors raised while loading a bindings file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
}

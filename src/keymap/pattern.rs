//! Pattern string parsing
//!
//! `"ctrl+shift+s"` is a combination, `"g->g"` is a sequence. A pattern is
//! either one or the other; mixing separators or naming an unknown key
//! rejects the pattern.

use std::fmt;

use super::error::PatternError;
use super::key_table::KeyTable;
use super::options::BindKeys;

pub const COMBINATION_SEPARATOR: &str = "+";
pub const SEQUENCE_SEPARATOR: &str = "->";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PatternKind {
    /// Keys held together
    Combination,
    /// Keys pressed one after another within the sequence interval
    Sequence,
}

impl PatternKind {
    pub const fn separator(self) -> &'static str {
        match self {
            PatternKind::Combination => COMBINATION_SEPARATOR,
            PatternKind::Sequence => SEQUENCE_SEPARATOR,
        }
    }
}

/// An ordered list of symbolic key names, all present in the key table
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BindingPattern {
    kind: PatternKind,
    keys: Vec<String>,
}

impl BindingPattern {
    /// Parse and validate one pattern string against the key table
    pub fn parse(raw: &str, table: &KeyTable) -> Result<Self, PatternError> {
        let has_sequence = raw.contains(SEQUENCE_SEPARATOR);
        let has_combination = raw.contains(COMBINATION_SEPARATOR);
        if has_sequence && has_combination {
            return Err(PatternError::MixedSeparators(raw.to_string()));
        }

        let kind = if has_sequence {
            PatternKind::Sequence
        } else {
            PatternKind::Combination
        };

        let keys: Vec<String> = raw
            .split(kind.separator())
            .map(|key| key.trim().to_string())
            .collect();

        if let Some(unknown) = keys.iter().find(|key| !table.contains(key)) {
            return Err(PatternError::UnknownKey {
                pattern: raw.to_string(),
                key: unknown.clone(),
            });
        }

        Ok(Self { kind, keys })
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn is_sequence(&self) -> bool {
        self.kind == PatternKind::Sequence
    }
}

impl fmt::Display for BindingPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keys.join(self.kind.separator()))
    }
}

/// Parse every pattern in `bind_keys`, dropping the invalid ones
pub fn parse_bind_keys(bind_keys: &BindKeys, table: &KeyTable) -> Vec<BindingPattern> {
    bind_keys
        .iter()
        .filter_map(|raw| match BindingPattern::parse(raw, table) {
            Ok(pattern) => Some(pattern),
            Err(e) => {
                tracing::debug!("Dropping pattern: {}", e);
                None
            }
        })
        .collect()
}

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Group that flat (undotted) flag names are filed under.
pub const MISC_GROUP: &str = "misc";

/// Value stored under a flag.
///
/// Dialogue actions only ever write `Bool(true)`, but games may store
/// counters or labels under the same names and conditions test them for
/// truthiness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    /// A boolean value.
    Bool(bool),
    /// A 64-bit signed integer value.
    Integer(i64),
    /// A text value.
    Text(String),
}

impl FlagValue {
    /// Whether the value counts as set: `true`, a non-zero integer, or
    /// non-empty text.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Integer(n) => *n != 0,
            Self::Text(s) => !s.is_empty(),
        }
    }

    /// Parse a value the way a command line would write it.
    ///
    /// `true`/`false` become booleans, anything that parses as `i64` becomes
    /// an integer, everything else is text.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "true" => Self::Bool(true),
            "false" => Self::Bool(false),
            other => other
                .parse::<i64>()
                .map_or_else(|_| Self::Text(other.to_string()), Self::Integer),
        }
    }

    /// Split a `name=value` assignment. A bare `name` means `name=true`.
    pub fn parse_assignment(raw: &str) -> StoreResult<(String, Self)> {
        let (name, value) = match raw.split_once('=') {
            Some((name, value)) => (name.trim(), Self::parse(value)),
            None => (raw.trim(), Self::Bool(true)),
        };
        if name.is_empty() {
            return Err(StoreError::InvalidAssignment(raw.to_string()));
        }
        Ok((name.to_string(), value))
    }
}

impl From<bool> for FlagValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FlagValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for FlagValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

/// A flag name split into its group and the name within that group.
///
/// `story.met_alien` lives in group `story`; a flat name such as
/// `alien_talked` lives in [`MISC_GROUP`], so `alien_talked` and
/// `misc.alien_talked` address the same flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlagKey {
    /// Group the flag belongs to.
    pub group: String,
    /// Name within the group. May itself contain dots.
    pub name: String,
}

impl FlagKey {
    /// Normalize a raw flag name.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.split_once('.') {
            Some((group, name)) if !group.is_empty() && !name.is_empty() => Self {
                group: group.to_string(),
                name: name.to_string(),
            },
            _ => Self {
                group: MISC_GROUP.to_string(),
                name: raw.trim_matches('.').to_string(),
            },
        }
    }
}

impl fmt::Display for FlagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.group, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness() {
        assert!(FlagValue::Bool(true).is_truthy());
        assert!(!FlagValue::Bool(false).is_truthy());
        assert!(FlagValue::Integer(-2).is_truthy());
        assert!(!FlagValue::Integer(0).is_truthy());
        assert!(FlagValue::Text("calm".into()).is_truthy());
        assert!(!FlagValue::Text(String::new()).is_truthy());
    }

    #[test]
    fn parse_values() {
        assert_eq!(FlagValue::parse("true"), FlagValue::Bool(true));
        assert_eq!(FlagValue::parse(" false "), FlagValue::Bool(false));
        assert_eq!(FlagValue::parse("42"), FlagValue::Integer(42));
        assert_eq!(FlagValue::parse("angry"), FlagValue::Text("angry".into()));
    }

    #[test]
    fn parse_assignment() {
        let (name, value) = FlagValue::parse_assignment("story.met=3").unwrap();
        assert_eq!(name, "story.met");
        assert_eq!(value, FlagValue::Integer(3));

        let (name, value) = FlagValue::parse_assignment("lamp_on").unwrap();
        assert_eq!(name, "lamp_on");
        assert_eq!(value, FlagValue::Bool(true));

        assert!(FlagValue::parse_assignment("=1").is_err());
    }

    #[test]
    fn grouped_key() {
        let key = FlagKey::parse("story.met_alien");
        assert_eq!(key.group, "story");
        assert_eq!(key.name, "met_alien");
        assert_eq!(key.to_string(), "story.met_alien");
    }

    #[test]
    fn flat_key_goes_to_misc() {
        assert_eq!(FlagKey::parse("alien_talked"), FlagKey::parse("misc.alien_talked"));
        assert_eq!(FlagKey::parse("alien_talked").group, MISC_GROUP);
    }

    #[test]
    fn nested_dots_stay_in_name() {
        let key = FlagKey::parse("once.zyx.start.0");
        assert_eq!(key.group, "once");
        assert_eq!(key.name, "zyx.start.0");
    }
}

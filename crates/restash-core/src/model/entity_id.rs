// ── Core identity type ──
//
// Entity ids arrive from the wire as JSON numbers or strings; temporary
// ids for in-flight creates are client-generated strings. EntityId
// unifies all three behind a single ergonomic interface.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Prefix of client-generated temporary ids.
///
/// Server-assigned ids never start with this, so a temp id can always be
/// told apart from a real one.
pub const TEMP_ID_PREFIX: &str = "_tmp_";

/// Canonical identifier for any entity in the collection.
///
/// Transparently wraps either a numeric id or a string id (including
/// client-generated temporary ids). Consumers never care which.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Num(i64),
    Str(String),
}

impl EntityId {
    pub fn as_num(&self) -> Option<i64> {
        match self {
            Self::Num(n) => Some(*n),
            Self::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            Self::Num(_) => None,
        }
    }

    /// Whether this is a client-generated temporary id.
    pub fn is_temp(&self) -> bool {
        matches!(self, Self::Str(s) if s.starts_with(TEMP_ID_PREFIX))
    }

    /// Format the n-th temporary id. The counter that feeds `n` is
    /// monotonic and never reset, so temp ids are never reused.
    pub(crate) fn temp(n: u64) -> Self {
        Self::Str(format!("{TEMP_ID_PREFIX}{n}"))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "{s}"),
        }
    }
}

impl FromStr for EntityId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_owned()))
    }
}

impl From<i64> for EntityId {
    fn from(n: i64) -> Self {
        Self::Num(n)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        match s.parse::<i64>() {
            Ok(n) => Self::Num(n),
            Err(_) => Self::Str(s),
        }
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn numeric_string_parses_to_num() {
        let id = EntityId::from("42");
        assert_eq!(id.as_num(), Some(42));
    }

    #[test]
    fn non_numeric_string_stays_str() {
        let id = EntityId::from("post-abc");
        assert_eq!(id.as_str(), Some("post-abc"));
    }

    #[test]
    fn temp_ids_carry_the_prefix() {
        let id = EntityId::temp(3);
        assert!(id.is_temp());
        assert_eq!(id.to_string(), "_tmp_3");
    }

    #[test]
    fn real_ids_are_not_temp() {
        assert!(!EntityId::Num(3).is_temp());
        assert!(!EntityId::from("abc").is_temp());
    }

    #[test]
    fn deserializes_untagged() {
        let num: EntityId = serde_json::from_str("7").unwrap();
        let s: EntityId = serde_json::from_str("\"seven\"").unwrap();
        assert_eq!(num, EntityId::Num(7));
        assert_eq!(s, EntityId::Str("seven".to_owned()));
    }
}

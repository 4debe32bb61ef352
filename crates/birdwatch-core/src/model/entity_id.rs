// ── Record identity ──
//
// The backend has served bird ids both as integers and as strings. Both
// forms are opaque to this crate; `EntityId` keeps whichever arrived so
// it can be echoed back unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical identifier for a bird record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Numeric(u64),
    Opaque(String),
}

impl EntityId {
    pub fn as_numeric(&self) -> Option<u64> {
        match self {
            Self::Numeric(n) => Some(*n),
            Self::Opaque(_) => None,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Opaque(s) => write!(f, "{s}"),
        }
    }
}

impl FromStr for EntityId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_owned()))
    }
}

impl From<u64> for EntityId {
    fn from(n: u64) -> Self {
        Self::Numeric(n)
    }
}

/// Strings stay opaque, even all-digit ones: `"007"` and `7` are
/// different records.
impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self::Opaque(s)
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
    fn digit_strings_stay_opaque() {
        assert_eq!(EntityId::from("42"), EntityId::Opaque("42".into()));
        assert_eq!(EntityId::from("007").to_string(), "007");
        assert_ne!(EntityId::from("7"), EntityId::Numeric(7));
    }

    #[test]
    fn other_strings_stay_opaque() {
        let id: EntityId = "b-7".parse().unwrap();
        assert_eq!(id, EntityId::Opaque("b-7".into()));
    }

    #[test]
    fn display_round_trips_both_forms() {
        assert_eq!(EntityId::Numeric(9).to_string(), "9");
        assert_eq!(EntityId::from("b-7").to_string(), "b-7");
    }

    #[test]
    fn serializes_untagged() {
        assert_eq!(serde_json::to_string(&EntityId::Numeric(3)).unwrap(), "3");
        assert_eq!(
            serde_json::to_string(&EntityId::from("x")).unwrap(),
            "\"x\""
        );
        assert_eq!(
            serde_json::to_string(&EntityId::from("42")).unwrap(),
            "\"42\""
        );
    }
}

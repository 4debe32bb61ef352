// ── Query keys ──
//
// Every cached query is addressed by a `QueryKey`. Mutations invalidate
// by `QueryFamily`, so `BirdDetails` for every name goes stale at once.

use std::fmt;

/// Stable identity of a cached query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    AllBirdData,
    BirdDetails(String),
    AllLocations,
    FileReferences,
    CallerProfile,
    CallerRole,
}

/// A key without its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryFamily {
    AllBirdData,
    BirdDetails,
    AllLocations,
    FileReferences,
    CallerProfile,
    CallerRole,
}

impl QueryKey {
    pub fn family(&self) -> QueryFamily {
        match self {
            Self::AllBirdData => QueryFamily::AllBirdData,
            Self::BirdDetails(_) => QueryFamily::BirdDetails,
            Self::AllLocations => QueryFamily::AllLocations,
            Self::FileReferences => QueryFamily::FileReferences,
            Self::CallerProfile => QueryFamily::CallerProfile,
            Self::CallerRole => QueryFamily::CallerRole,
        }
    }
}

impl fmt::Display for QueryFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AllBirdData => "allBirdData",
            Self::BirdDetails => "birdDetails",
            Self::AllLocations => "allLocations",
            Self::FileReferences => "fileReferences",
            Self::CallerProfile => "callerProfile",
            Self::CallerRole => "callerRole",
        })
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BirdDetails(name) => write!(f, "{}:{name}", self.family()),
            _ => write!(f, "{}", self.family()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_forms() {
        assert_eq!(QueryKey::AllBirdData.to_string(), "allBirdData");
        assert_eq!(
            QueryKey::BirdDetails("Sooty Falcon".into()).to_string(),
            "birdDetails:Sooty Falcon"
        );
    }

    #[test]
    fn parameterized_keys_share_a_family() {
        assert_eq!(
            QueryKey::BirdDetails("a".into()).family(),
            QueryKey::BirdDetails("b".into()).family()
        );
        assert_ne!(QueryKey::BirdDetails("a".into()), QueryKey::BirdDetails("b".into()));
    }
}

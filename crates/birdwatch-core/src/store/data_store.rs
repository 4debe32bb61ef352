// ── Central query store ──
//
// Owns one typed `QueryCache` per payload. Invalidation fans out to all of
// them; a cache that holds no key of the family ignores it.

use std::time::Duration;

use tracing::debug;

use super::key::QueryFamily;
use super::query::QueryCache;
use crate::model::{BirdRecord, FileReference, LocationEntry, UserProfile, UserRole};

/// Every cached query for one session.
pub struct DataStore {
    pub(crate) birds: QueryCache<Vec<BirdRecord>>,
    pub(crate) bird_details: QueryCache<Option<BirdRecord>>,
    pub(crate) locations: QueryCache<Vec<LocationEntry>>,
    pub(crate) file_references: QueryCache<Vec<FileReference>>,
    pub(crate) profile: QueryCache<Option<UserProfile>>,
    pub(crate) role: QueryCache<UserRole>,
}

impl DataStore {
    pub fn new(stale_time: Duration) -> Self {
        Self {
            birds: QueryCache::new(stale_time),
            bird_details: QueryCache::new(stale_time),
            locations: QueryCache::new(stale_time),
            file_references: QueryCache::new(stale_time),
            profile: QueryCache::new(stale_time),
            role: QueryCache::new(stale_time),
        }
    }

    /// Mark every key of the given families stale.
    pub fn invalidate(&self, families: &[QueryFamily]) {
        for &family in families {
            match family {
                QueryFamily::AllBirdData => self.birds.invalidate_family(family),
                QueryFamily::BirdDetails => self.bird_details.invalidate_family(family),
                QueryFamily::AllLocations => self.locations.invalidate_family(family),
                QueryFamily::FileReferences => self.file_references.invalidate_family(family),
                QueryFamily::CallerProfile => self.profile.invalidate_family(family),
                QueryFamily::CallerRole => self.role.invalidate_family(family),
            }
        }
    }

    /// Drop all cached data (logout or identity change).
    pub fn clear(&self) {
        self.birds.clear();
        self.bird_details.clear();
        self.locations.clear();
        self.file_references.clear();
        self.profile.clear();
        self.role.clear();
        debug!("query store cleared");
    }

    /// Number of live cache entries across all payload types.
    pub fn entry_count(&self) -> usize {
        self.birds.len()
            + self.bird_details.len()
            + self.locations.len()
            + self.file_references.len()
            + self.profile.len()
            + self.role.len()
    }
}

// ── Command API ──
//
// All write operations flow through a unified `Command` enum. Each
// variant declares which query families it invalidates, and `Session`
// marks those stale once the backend accepts the write.

pub mod requests;

use crate::error::CoreError;
use crate::model::{BirdRecord, EntityId, FileReference, LocationEntry, UserProfile};
use crate::store::QueryFamily;

pub use requests::BirdRequest;

const BIRD_READS: &[QueryFamily] = &[
    QueryFamily::AllBirdData,
    QueryFamily::BirdDetails,
    QueryFamily::AllLocations,
];

/// All write operations against the bird data service.
#[derive(Debug, Clone)]
pub enum Command {
    // ── Birds ────────────────────────────────────────────────────────
    AddBird(BirdRequest),
    UpdateBird {
        id: EntityId,
        bird: BirdRequest,
    },
    DeleteBird {
        id: EntityId,
    },

    // ── Locations ────────────────────────────────────────────────────
    AddLocation {
        bird_id: EntityId,
        location: LocationEntry,
    },
    DeleteLocation {
        bird_id: EntityId,
        index: usize,
    },

    // ── Files ────────────────────────────────────────────────────────
    RegisterFileReference {
        path: String,
        hash: String,
    },
    DropFileReference {
        path: String,
    },

    // ── Caller ───────────────────────────────────────────────────────
    SaveProfile(UserProfile),
}

/// Result of a successfully executed command.
#[derive(Debug, Clone)]
pub enum CommandResult {
    Ok,
    Bird(BirdRecord),
    FileReference(FileReference),
}

impl Command {
    /// Query families that go stale once this command succeeds.
    pub fn invalidates(&self) -> &'static [QueryFamily] {
        match self {
            Self::AddBird(_)
            | Self::UpdateBird { .. }
            | Self::DeleteBird { .. }
            | Self::AddLocation { .. }
            | Self::DeleteLocation { .. } => BIRD_READS,
            Self::RegisterFileReference { .. } | Self::DropFileReference { .. } => {
                &[QueryFamily::FileReferences]
            }
            Self::SaveProfile(_) => &[QueryFamily::CallerProfile],
        }
    }

    /// Local checks run before any network call.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::AddBird(bird) | Self::UpdateBird { bird, .. } => bird.validate(),
            Self::AddLocation { location, .. } => requests::validate_location(location)
                .map_err(|message| CoreError::ValidationFailed { message }),
            Self::RegisterFileReference { path, .. } | Self::DropFileReference { path } => {
                if path.trim().is_empty() {
                    Err(CoreError::ValidationFailed {
                        message: "file path must not be empty".into(),
                    })
                } else {
                    Ok(())
                }
            }
            Self::SaveProfile(profile) => {
                if profile.name.trim().is_empty() {
                    Err(CoreError::ValidationFailed {
                        message: "profile name must not be empty".into(),
                    })
                } else {
                    Ok(())
                }
            }
            Self::DeleteBird { .. } | Self::DeleteLocation { .. } => Ok(()),
        }
    }

    /// Short operation name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddBird(_) => "add_bird",
            Self::UpdateBird { .. } => "update_bird",
            Self::DeleteBird { .. } => "delete_bird",
            Self::AddLocation { .. } => "add_location",
            Self::DeleteLocation { .. } => "delete_location",
            Self::RegisterFileReference { .. } => "register_file_reference",
            Self::DropFileReference { .. } => "drop_file_reference",
            Self::SaveProfile(_) => "save_profile",
        }
    }
}

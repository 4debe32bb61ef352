// ── Typed request structs for Command payloads ──

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::{BirdRecord, LocationEntry};

/// Full bird payload for create and update. Updates replace the whole
/// record; there is no partial merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BirdRequest {
    pub local_name: String,
    pub arabic_name: String,
    pub english_name: String,
    pub scientific_name: String,
    pub description: String,
    pub notes: String,
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    pub locations: Vec<LocationEntry>,
}

impl BirdRequest {
    /// Reject payloads the backend would store in an unusable shape.
    pub fn validate(&self) -> Result<(), CoreError> {
        let named = [
            &self.local_name,
            &self.arabic_name,
            &self.english_name,
            &self.scientific_name,
        ]
        .into_iter()
        .any(|n| !n.trim().is_empty());
        if !named {
            return Err(CoreError::ValidationFailed {
                message: "a bird needs at least one name".into(),
            });
        }

        for (idx, location) in self.locations.iter().enumerate() {
            validate_location(location)
                .map_err(|message| CoreError::ValidationFailed {
                    message: format!("location #{idx}: {message}"),
                })?;
        }

        if self.images.iter().any(|p| p.trim().is_empty()) {
            return Err(CoreError::ValidationFailed {
                message: "image paths must not be empty".into(),
            });
        }
        Ok(())
    }
}

impl From<&BirdRecord> for BirdRequest {
    /// Start an edit from the stored record.
    fn from(bird: &BirdRecord) -> Self {
        Self {
            local_name: bird.local_name.clone(),
            arabic_name: bird.arabic_name.clone(),
            english_name: bird.english_name.clone(),
            scientific_name: bird.scientific_name.clone(),
            description: bird.description.clone(),
            notes: bird.notes.clone(),
            images: bird.images.clone(),
            audio: bird.audio.clone(),
            locations: bird.locations.clone(),
        }
    }
}

/// Coordinates must be finite and inside WGS84 ranges. `(0, 0)` passes
/// and is stored as "no coordinate".
pub(crate) fn validate_location(location: &LocationEntry) -> Result<(), String> {
    if location.in_range() {
        Ok(())
    } else {
        Err(format!(
            "coordinate ({}, {}) outside ±90/±180",
            location.latitude, location.longitude
        ))
    }
}

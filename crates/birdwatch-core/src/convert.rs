// ── API-to-domain type conversions ──
//
// Bridges the permissive `birdwatch_api::types` shapes into the strict
// `birdwatch_core::model` types. Shape mismatches fail fast with
// `CoreError::InvalidRecord`; absent optional text becomes `""` and
// absent lists become empty.

use serde_json::Value;

use birdwatch_api::types::{
    BirdBody, BirdData, FileReferenceData, LocationBody, LocationData, ProfileData, RoleData,
};

use crate::command::BirdRequest;
use crate::error::CoreError;
use crate::model::{BirdRecord, EntityId, FileReference, LocationEntry, UserProfile, UserRole};

// ── Helpers ────────────────────────────────────────────────────────

fn invalid(entity: &'static str, reason: impl Into<String>) -> CoreError {
    CoreError::InvalidRecord {
        entity,
        reason: reason.into(),
    }
}

/// Parse a wire id (integer or non-empty string).
fn parse_id(raw: Option<&Value>) -> Result<EntityId, CoreError> {
    match raw {
        Some(Value::Number(n)) => n
            .as_u64()
            .map(EntityId::Numeric)
            .ok_or_else(|| invalid("bird", format!("id {n} is not a non-negative integer"))),
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(EntityId::Opaque(s.clone())),
        Some(Value::Null) | None => Err(invalid("bird", "missing id")),
        Some(other) => Err(invalid("bird", format!("unsupported id {other}"))),
    }
}

/// Coerce a wire coordinate: number, numeric string, or absent (→ 0.0).
///
/// Finite values outside `-limit..=limit` are rejected. Non-finite values
/// pass through and are filtered by the map projection.
fn parse_coordinate(raw: Option<&Value>, axis: &str, limit: f64) -> Result<f64, CoreError> {
    let value = match raw {
        None | Some(Value::Null) => return Ok(0.0),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| invalid("location", format!("{axis} {n} is not representable")))?,
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(0.0),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| invalid("location", format!("{axis} {s:?} is not a number")))?,
        Some(other) => {
            return Err(invalid("location", format!("{axis} {other} is not a number")));
        }
    };

    if value.is_finite() && !(-limit..=limit).contains(&value) {
        return Err(invalid(
            "location",
            format!("{axis} {value} outside ±{limit}"),
        ));
    }
    Ok(value)
}

fn text(raw: Option<String>) -> String {
    raw.unwrap_or_default()
}

// ── Location ───────────────────────────────────────────────────────

impl TryFrom<LocationData> for LocationEntry {
    type Error = CoreError;

    fn try_from(raw: LocationData) -> Result<Self, Self::Error> {
        Ok(Self {
            latitude: parse_coordinate(raw.latitude.as_ref(), "latitude", 90.0)?,
            longitude: parse_coordinate(raw.longitude.as_ref(), "longitude", 180.0)?,
            place_name: text(raw.place_name),
            region: text(raw.region),
            landmarks: text(raw.landmarks),
            notes: text(raw.notes),
        })
    }
}

impl From<&LocationEntry> for LocationBody {
    fn from(loc: &LocationEntry) -> Self {
        Self {
            latitude: loc.latitude,
            longitude: loc.longitude,
            place_name: loc.place_name.clone(),
            region: loc.region.clone(),
            landmarks: loc.landmarks.clone(),
            notes: loc.notes.clone(),
        }
    }
}

// ── Bird ───────────────────────────────────────────────────────────

impl TryFrom<BirdData> for BirdRecord {
    type Error = CoreError;

    fn try_from(raw: BirdData) -> Result<Self, Self::Error> {
        let id = parse_id(raw.id.as_ref())?;
        let locations = raw
            .locations
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(idx, loc)| {
                LocationEntry::try_from(loc).map_err(|e| match e {
                    CoreError::InvalidRecord { reason, .. } => invalid(
                        "bird",
                        format!("bird {id} location #{idx}: {reason}"),
                    ),
                    other => other,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id,
            local_name: text(raw.local_name),
            arabic_name: text(raw.arabic_name),
            english_name: text(raw.english_name),
            scientific_name: text(raw.scientific_name),
            description: text(raw.description),
            notes: text(raw.notes),
            images: raw
                .images
                .unwrap_or_default()
                .into_iter()
                .filter(|p| !p.is_empty())
                .collect(),
            audio: raw.audio_file.filter(|p| !p.is_empty()),
            locations,
        })
    }
}

/// Convert a batch, failing on the first malformed record.
pub(crate) fn birds_from_wire(raw: Vec<BirdData>) -> Result<Vec<BirdRecord>, CoreError> {
    raw.into_iter().map(BirdRecord::try_from).collect()
}

pub(crate) fn locations_from_wire(
    raw: Vec<LocationData>,
) -> Result<Vec<LocationEntry>, CoreError> {
    raw.into_iter().map(LocationEntry::try_from).collect()
}

// ── Files & caller ─────────────────────────────────────────────────

impl TryFrom<FileReferenceData> for FileReference {
    type Error = CoreError;

    fn try_from(raw: FileReferenceData) -> Result<Self, Self::Error> {
        let path = raw
            .path
            .filter(|p| !p.is_empty())
            .ok_or_else(|| invalid("file reference", "missing path"))?;
        Ok(Self {
            path,
            hash: text(raw.hash),
        })
    }
}

impl From<ProfileData> for UserProfile {
    fn from(raw: ProfileData) -> Self {
        Self {
            name: text(raw.name),
        }
    }
}

impl From<RoleData> for UserRole {
    /// Unknown or missing roles degrade to `Guest`.
    fn from(raw: RoleData) -> Self {
        raw.role
            .and_then(|r| r.parse().ok())
            .unwrap_or(UserRole::Guest)
    }
}

// ── Request bodies ─────────────────────────────────────────────────

impl From<&BirdRequest> for BirdBody {
    fn from(bird: &BirdRequest) -> Self {
        Self {
            local_name: bird.local_name.clone(),
            arabic_name: bird.arabic_name.clone(),
            english_name: bird.english_name.clone(),
            scientific_name: bird.scientific_name.clone(),
            description: bird.description.clone(),
            notes: bird.notes.clone(),
            images: bird.images.clone(),
            audio_file: bird.audio.clone(),
            locations: bird.locations.iter().map(LocationBody::from).collect(),
        }
    }
}

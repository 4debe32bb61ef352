// Wire types for the birdwatch data service.
//
// Responses are deliberately permissive: every field is optional and ids
// and coordinates arrive as raw JSON values, because the backend has
// served numbers, numeric strings, and nulls for the same field over
// time. `birdwatch-core` validates these into the strict domain model.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Responses ───────────────────────────────────────────────────────

/// A bird record as served by `GET v1/birds`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BirdData {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub local_name: Option<String>,
    #[serde(default)]
    pub arabic_name: Option<String>,
    #[serde(default)]
    pub english_name: Option<String>,
    #[serde(default)]
    pub scientific_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub audio_file: Option<String>,
    #[serde(default)]
    pub locations: Option<Vec<LocationData>>,
    /// Fields this client does not model yet.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// A sighting location nested in [`BirdData`] or listed by `GET v1/locations`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationData {
    #[serde(default)]
    pub latitude: Option<Value>,
    #[serde(default)]
    pub longitude: Option<Value>,
    #[serde(default)]
    pub place_name: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub landmarks: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// An uploaded file registered with the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileReferenceData {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub hash: Option<String>,
}

/// The caller's stored profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileData {
    #[serde(default)]
    pub name: Option<String>,
}

/// Response of `GET v1/me/role`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleData {
    #[serde(default)]
    pub role: Option<String>,
}

/// Response of `GET v1/me/is-admin`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStatus {
    #[serde(default)]
    pub is_admin: bool,
}

// ── Request bodies ──────────────────────────────────────────────────

/// Body for `POST v1/birds` and `PUT v1/birds/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BirdBody {
    pub local_name: String,
    pub arabic_name: String,
    pub english_name: String,
    pub scientific_name: String,
    pub description: String,
    pub notes: String,
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_file: Option<String>,
    pub locations: Vec<LocationBody>,
}

/// Body for `POST v1/birds/{id}/locations` and nested in [`BirdBody`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationBody {
    pub latitude: f64,
    pub longitude: f64,
    pub place_name: String,
    pub region: String,
    pub landmarks: String,
    pub notes: String,
}

/// Body for `POST v1/files`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReferenceBody {
    pub path: String,
    pub hash: String,
}

/// Body for `PUT v1/me/profile`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileBody {
    pub name: String,
}

use serde::{Deserialize, Serialize};

use super::{EntityId, LocationEntry};

/// Display name for a bird with every name field empty.
pub const UNNAMED: &str = "(unnamed)";

/// A bird species record with its sightings and media.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirdRecord {
    pub id: EntityId,
    pub local_name: String,
    pub arabic_name: String,
    pub english_name: String,
    pub scientific_name: String,
    pub description: String,
    pub notes: String,
    /// Blob storage paths, in display order.
    pub images: Vec<String>,
    /// Blob storage path of the call recording.
    pub audio: Option<String>,
    pub locations: Vec<LocationEntry>,
}

impl BirdRecord {
    /// An empty record with the given id.
    pub fn new(id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            local_name: String::new(),
            arabic_name: String::new(),
            english_name: String::new(),
            scientific_name: String::new(),
            description: String::new(),
            notes: String::new(),
            images: Vec::new(),
            audio: None,
            locations: Vec::new(),
        }
    }

    /// Display name: the first non-empty of local, English, and scientific
    /// names.
    pub fn name(&self) -> &str {
        [
            self.local_name.as_str(),
            self.english_name.as_str(),
            self.scientific_name.as_str(),
        ]
        .into_iter()
        .map(str::trim)
        .find(|n| !n.is_empty())
        .unwrap_or(UNNAMED)
    }

    /// Whether any name field matches `needle` (case-insensitive substring).
    pub fn matches_name(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        [
            &self.local_name,
            &self.arabic_name,
            &self.english_name,
            &self.scientific_name,
        ]
        .into_iter()
        .any(|n| n.to_lowercase().contains(&needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_prefers_local_then_english() {
        let mut bird = BirdRecord::new(1);
        bird.english_name = "Eurasian Hoopoe".into();
        bird.scientific_name = "Upupa epops".into();
        assert_eq!(bird.name(), "Eurasian Hoopoe");

        bird.local_name = "Hudhud".into();
        assert_eq!(bird.name(), "Hudhud");
    }

    #[test]
    fn blank_names_fall_back() {
        let mut bird = BirdRecord::new(1);
        bird.local_name = "   ".into();
        assert_eq!(bird.name(), UNNAMED);
    }

    #[test]
    fn matches_name_checks_every_field() {
        let mut bird = BirdRecord::new(1);
        bird.arabic_name = "هدهد".into();
        bird.scientific_name = "Upupa epops".into();
        assert!(bird.matches_name("upupa"));
        assert!(bird.matches_name("هدهد"));
        assert!(!bird.matches_name("falcon"));
    }
}

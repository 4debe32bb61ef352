use serde::Serialize;

use crate::model::{BirdRecord, EntityId, LocationEntry};

/// One (bird × location) row for list views.
///
/// A bird without locations still gets one row, with zero coordinates
/// and empty location text, so it stays visible.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BirdRow {
    pub bird_id: EntityId,
    pub name: String,
    pub local_name: String,
    pub arabic_name: String,
    pub english_name: String,
    pub scientific_name: String,
    pub description: String,
    pub notes: String,
    pub images: Vec<String>,
    pub audio: Option<String>,
    /// Position in the bird's location list; `None` on a sentinel row.
    pub location_index: Option<usize>,
    pub latitude: f64,
    pub longitude: f64,
    pub place_name: String,
    pub region: String,
    pub landmarks: String,
    pub location_notes: String,
}

impl BirdRow {
    fn new(bird: &BirdRecord, index: Option<usize>, location: &LocationEntry) -> Self {
        Self {
            bird_id: bird.id.clone(),
            name: bird.name().to_owned(),
            local_name: bird.local_name.clone(),
            arabic_name: bird.arabic_name.clone(),
            english_name: bird.english_name.clone(),
            scientific_name: bird.scientific_name.clone(),
            description: bird.description.clone(),
            notes: bird.notes.clone(),
            images: bird.images.clone(),
            audio: bird.audio.clone(),
            location_index: index,
            latitude: location.latitude,
            longitude: location.longitude,
            place_name: location.place_name.clone(),
            region: location.region.clone(),
            landmarks: location.landmarks.clone(),
            location_notes: location.notes.clone(),
        }
    }
}

/// Flatten records into one row per location, keeping record order.
pub fn flatten(records: &[BirdRecord]) -> Vec<BirdRow> {
    let sentinel = LocationEntry::default();
    records
        .iter()
        .flat_map(|bird| {
            if bird.locations.is_empty() {
                vec![BirdRow::new(bird, None, &sentinel)]
            } else {
                bird.locations
                    .iter()
                    .enumerate()
                    .map(|(idx, loc)| BirdRow::new(bird, Some(idx), loc))
                    .collect()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bird(id: u64, locations: usize) -> BirdRecord {
        let mut bird = BirdRecord::new(id);
        bird.locations = (0..locations)
            .map(|i| LocationEntry::new(10.0 + f64::from(u32::try_from(i).unwrap_or(0)), 20.0))
            .collect();
        bird
    }

    #[test]
    fn row_count_is_sum_of_max_one_and_locations() {
        let records = vec![bird(1, 0), bird(2, 3), bird(3, 1), bird(4, 0)];
        let expected: usize = records.iter().map(|b| b.locations.len().max(1)).sum();
        assert_eq!(flatten(&records).len(), expected);
        assert_eq!(expected, 6);
    }

    #[test]
    fn bird_without_locations_gets_sentinel_row() {
        let rows = flatten(&[bird(1, 0)]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].location_index, None);
        assert_eq!((rows[0].latitude, rows[0].longitude), (0.0, 0.0));
        assert_eq!(rows[0].place_name, "");
    }

    #[test]
    fn bird_fields_repeat_on_every_row() {
        let mut hoopoe = bird(2, 2);
        hoopoe.english_name = "Eurasian Hoopoe".into();
        let rows = flatten(&[hoopoe]);
        assert!(rows.iter().all(|r| r.english_name == "Eurasian Hoopoe"));
        assert_eq!(rows[1].location_index, Some(1));
        assert_eq!(rows[1].latitude, 11.0);
    }

    #[test]
    fn empty_input_yields_no_rows() {
        assert!(flatten(&[]).is_empty());
    }
}

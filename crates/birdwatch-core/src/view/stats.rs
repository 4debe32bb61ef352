use std::collections::BTreeMap;

use serde::Serialize;

use super::geo::{Hemisphere, Zone, hemisphere, zone};
use crate::model::BirdRecord;

/// Region label for locations with an empty region.
const UNSPECIFIED_REGION: &str = "Unspecified";

/// Summary counts for the statistics view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BirdStatistics {
    pub total_birds: usize,
    pub total_locations: usize,
    /// Locations with a plottable coordinate.
    pub mapped_locations: usize,
    pub birds_with_locations: usize,
    pub birds_with_images: usize,
    pub total_images: usize,
    pub birds_with_audio: usize,
    /// Location count per region, including unmapped locations.
    pub by_region: BTreeMap<String, usize>,
    /// Mapped location count per climate zone.
    pub by_zone: BTreeMap<Zone, usize>,
    /// Mapped location count per hemisphere.
    pub by_hemisphere: BTreeMap<Hemisphere, usize>,
}

pub fn statistics(records: &[BirdRecord]) -> BirdStatistics {
    let mut stats = BirdStatistics {
        total_birds: records.len(),
        ..BirdStatistics::default()
    };

    for bird in records {
        stats.total_locations += bird.locations.len();
        stats.total_images += bird.images.len();
        stats.birds_with_locations += usize::from(!bird.locations.is_empty());
        stats.birds_with_images += usize::from(!bird.images.is_empty());
        stats.birds_with_audio += usize::from(bird.audio.is_some());

        for location in &bird.locations {
            let region = location.region.trim();
            let region = if region.is_empty() {
                UNSPECIFIED_REGION
            } else {
                region
            };
            *stats.by_region.entry(region.to_owned()).or_default() += 1;

            if !location.has_coordinate() {
                continue;
            }
            stats.mapped_locations += 1;
            *stats
                .by_hemisphere
                .entry(hemisphere(location.latitude))
                .or_default() += 1;
            if let Some(zone) = zone(location.latitude) {
                *stats.by_zone.entry(zone).or_default() += 1;
            }
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LocationEntry;

    fn at(lat: f64, lng: f64, region: &str) -> LocationEntry {
        LocationEntry {
            region: region.into(),
            ..LocationEntry::new(lat, lng)
        }
    }

    #[test]
    fn counts_birds_media_and_locations() {
        let mut hoopoe = BirdRecord::new(1);
        hoopoe.images = vec!["a.jpg".into(), "b.jpg".into()];
        hoopoe.audio = Some("hoopoe.mp3".into());
        hoopoe.locations = vec![at(23.6, 58.5, "Muscat"), at(0.0, 0.0, "")];

        let mut falcon = BirdRecord::new(2);
        falcon.locations = vec![at(-17.0, 54.1, "Dhofar"), at(70.0, 20.0, "Dhofar")];

        let stats = statistics(&[hoopoe, falcon, BirdRecord::new(3)]);

        assert_eq!(stats.total_birds, 3);
        assert_eq!(stats.total_locations, 4);
        assert_eq!(stats.mapped_locations, 3);
        assert_eq!(stats.birds_with_locations, 2);
        assert_eq!(stats.birds_with_images, 1);
        assert_eq!(stats.total_images, 2);
        assert_eq!(stats.birds_with_audio, 1);
        assert_eq!(stats.by_region.get("Dhofar"), Some(&2));
        assert_eq!(stats.by_region.get(UNSPECIFIED_REGION), Some(&1));
        assert_eq!(stats.by_zone.get(&Zone::Tropical), Some(&2));
        assert_eq!(stats.by_zone.get(&Zone::Polar), Some(&1));
        assert_eq!(stats.by_hemisphere.get(&Hemisphere::South), Some(&1));
    }

    #[test]
    fn empty_input_is_all_zero() {
        assert_eq!(statistics(&[]), BirdStatistics::default());
    }
}

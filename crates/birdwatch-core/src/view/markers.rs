use serde::Serialize;

use super::geo::{Hemisphere, Zone, hemisphere, zone};
use crate::model::{BirdRecord, EntityId};

/// A plottable sighting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub bird_id: EntityId,
    pub bird_name: String,
    /// Every non-empty name of the bird, for name filtering.
    #[serde(skip)]
    pub names: Vec<String>,
    pub location_index: usize,
    pub latitude: f64,
    pub longitude: f64,
    pub place_name: String,
    pub region: String,
    pub hemisphere: Hemisphere,
    pub zone: Zone,
}

/// Extract markers, skipping unset `(0, 0)` and non-finite coordinates.
pub fn markers(records: &[BirdRecord]) -> Vec<MapMarker> {
    records
        .iter()
        .flat_map(|bird| {
            let names: Vec<String> = [
                &bird.local_name,
                &bird.arabic_name,
                &bird.english_name,
                &bird.scientific_name,
            ]
            .into_iter()
            .filter(|n| !n.is_empty())
            .cloned()
            .collect();
            bird.locations
                .iter()
                .enumerate()
                .filter(|(_, loc)| loc.has_coordinate())
                .filter_map(move |(idx, loc)| {
                    Some(MapMarker {
                        bird_id: bird.id.clone(),
                        bird_name: bird.name().to_owned(),
                        names: names.clone(),
                        location_index: idx,
                        latitude: loc.latitude,
                        longitude: loc.longitude,
                        place_name: loc.place_name.clone(),
                        region: loc.region.clone(),
                        hemisphere: hemisphere(loc.latitude),
                        zone: zone(loc.latitude)?,
                    })
                })
        })
        .collect()
}

/// Map view filters. Every set field must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerFilter {
    /// Case-insensitive substring of any of the bird's names.
    pub name: Option<String>,
    /// Case-insensitive region match.
    pub region: Option<String>,
    pub hemisphere: Option<Hemisphere>,
    pub zone: Option<Zone>,
}

impl MarkerFilter {
    pub fn matches(&self, marker: &MapMarker) -> bool {
        if let Some(ref name) = self.name {
            let needle = name.to_lowercase();
            if !marker
                .names
                .iter()
                .chain(std::iter::once(&marker.bird_name))
                .any(|n| n.to_lowercase().contains(&needle))
            {
                return false;
            }
        }
        if let Some(ref region) = self.region {
            if !marker.region.eq_ignore_ascii_case(region) {
                return false;
            }
        }
        if self.hemisphere.is_some_and(|h| h != marker.hemisphere) {
            return false;
        }
        if self.zone.is_some_and(|z| z != marker.zone) {
            return false;
        }
        true
    }
}

pub fn filter_markers(markers: &[MapMarker], filter: &MarkerFilter) -> Vec<MapMarker> {
    markers
        .iter()
        .filter(|m| filter.matches(m))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LocationEntry;

    fn located(id: u64, name: &str, coords: &[(f64, f64)]) -> BirdRecord {
        let mut bird = BirdRecord::new(id);
        bird.english_name = name.into();
        bird.locations = coords
            .iter()
            .map(|&(lat, lng)| LocationEntry::new(lat, lng))
            .collect();
        bird
    }

    #[test]
    fn origin_and_non_finite_are_excluded() {
        let records = vec![located(
            1,
            "Hoopoe",
            &[(0.0, 0.0), (23.6, 58.5), (f64::NAN, 3.0), (-17.0, 54.1)],
        )];
        let out = markers(&records);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].location_index, 1);
        assert_eq!(out[1].hemisphere, Hemisphere::South);
    }

    #[test]
    fn one_unset_and_two_valid_yield_two() {
        let records = vec![
            located(1, "A", &[(0.0, 0.0)]),
            located(2, "B", &[(10.0, 20.0)]),
            located(3, "C", &[(-5.0, 100.0)]),
        ];
        assert_eq!(markers(&records).len(), 2);
    }

    #[test]
    fn filter_by_name_and_region() {
        let mut falcon = located(1, "Sooty Falcon", &[(23.0, 58.0), (17.0, 54.0)]);
        falcon.locations[1].region = "Dhofar".into();
        let hoopoe = located(2, "Hoopoe", &[(17.1, 54.2)]);
        let all = markers(&[falcon, hoopoe]);

        let by_name = filter_markers(
            &all,
            &MarkerFilter {
                name: Some("falcon".into()),
                ..MarkerFilter::default()
            },
        );
        assert_eq!(by_name.len(), 2);

        let by_region = filter_markers(
            &all,
            &MarkerFilter {
                region: Some("dhofar".into()),
                ..MarkerFilter::default()
            },
        );
        assert_eq!(by_region.len(), 1);
        assert_eq!(by_region[0].bird_name, "Sooty Falcon");
    }

    #[test]
    fn filter_by_name_checks_every_name() {
        let mut hoopoe = located(1, "Eurasian Hoopoe", &[(23.6, 58.5)]);
        hoopoe.arabic_name = "هدهد".into();
        hoopoe.scientific_name = "Upupa epops".into();
        let all = markers(&[hoopoe, located(2, "Sooty Falcon", &[(17.0, 54.0)])]);

        for needle in ["هدهد", "upupa", "hoopoe"] {
            let found = filter_markers(
                &all,
                &MarkerFilter {
                    name: Some(needle.into()),
                    ..MarkerFilter::default()
                },
            );
            assert_eq!(found.len(), 1, "{needle}");
            assert_eq!(found[0].bird_name, "Eurasian Hoopoe");
        }
    }

    #[test]
    fn filter_by_zone() {
        let all = markers(&[located(1, "Tern", &[(10.0, 1.0), (70.0, 1.0)])]);
        let polar = filter_markers(
            &all,
            &MarkerFilter {
                zone: Some(Zone::Polar),
                ..MarkerFilter::default()
            },
        );
        assert_eq!(polar.len(), 1);
        assert_eq!(polar[0].latitude, 70.0);
    }
}

use serde::{Deserialize, Serialize};

/// A single sighting location attached to a bird.
///
/// A `(0.0, 0.0)` coordinate pair means "no coordinate recorded". The
/// backend stores unset coordinates as zero, so every view treats the
/// pair as absent rather than as a point in the Gulf of Guinea.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationEntry {
    pub latitude: f64,
    pub longitude: f64,
    pub place_name: String,
    pub region: String,
    pub landmarks: String,
    pub notes: String,
}

impl LocationEntry {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            ..Self::default()
        }
    }

    /// Whether this entry carries a plottable coordinate.
    pub fn has_coordinate(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && !(self.latitude == 0.0 && self.longitude == 0.0)
    }

    /// Whether both values fall inside the WGS84 ranges.
    pub fn in_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::LocationEntry;

    #[test]
    fn origin_is_not_a_coordinate() {
        assert!(!LocationEntry::new(0.0, 0.0).has_coordinate());
        assert!(LocationEntry::new(0.0, 12.5).has_coordinate());
    }

    #[test]
    fn non_finite_is_not_a_coordinate() {
        assert!(!LocationEntry::new(f64::NAN, 10.0).has_coordinate());
        assert!(!LocationEntry::new(10.0, f64::INFINITY).has_coordinate());
    }

    #[test]
    fn range_check() {
        assert!(LocationEntry::new(-90.0, 180.0).in_range());
        assert!(!LocationEntry::new(91.0, 0.0).in_range());
        assert!(!LocationEntry::new(0.0, -180.5).in_range());
        assert!(!LocationEntry::new(f64::NAN, 0.0).in_range());
    }
}

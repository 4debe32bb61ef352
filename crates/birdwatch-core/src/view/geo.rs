// Latitude classification.

use serde::Serialize;
use strum::Display;

/// Tropic of Cancer / Capricorn.
const TROPIC: f64 = 23.5;
/// Poleward edge of the temperate belt. The warm (23.5–35) and cool
/// (35–50) temperate bands both classify as `Temperate`.
const TEMPERATE_LIMIT: f64 = 50.0;
/// Arctic / Antarctic circle. Latitudes of exactly this value are subpolar.
const POLAR_CIRCLE: f64 = 66.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Hemisphere {
    North,
    South,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Zone {
    Tropical,
    Temperate,
    Subpolar,
    Polar,
}

/// `North` for latitudes `>= 0` (the equator is northern), else `South`.
pub fn hemisphere(latitude: f64) -> Hemisphere {
    if latitude >= 0.0 {
        Hemisphere::North
    } else {
        Hemisphere::South
    }
}

/// Climate zone by absolute latitude. `None` for non-finite input.
pub fn zone(latitude: f64) -> Option<Zone> {
    if !latitude.is_finite() {
        return None;
    }
    let abs = latitude.abs();
    let zone = if abs < TROPIC {
        Zone::Tropical
    } else if abs < TEMPERATE_LIMIT {
        Zone::Temperate
    } else if abs <= POLAR_CIRCLE {
        Zone::Subpolar
    } else {
        Zone::Polar
    };
    Some(zone)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equator_is_north() {
        assert_eq!(hemisphere(0.0), Hemisphere::North);
        assert_eq!(hemisphere(-0.0001), Hemisphere::South);
    }

    #[test]
    fn opposite_latitudes_change_hemisphere() {
        for lat in [0.5, 12.0, 45.0, 89.9] {
            assert_ne!(hemisphere(lat), hemisphere(-lat));
        }
    }

    #[test]
    fn band_edges() {
        assert_eq!(zone(0.0), Some(Zone::Tropical));
        assert_eq!(zone(23.49), Some(Zone::Tropical));
        assert_eq!(zone(23.5), Some(Zone::Temperate));
        assert_eq!(zone(-35.0), Some(Zone::Temperate));
        assert_eq!(zone(49.99), Some(Zone::Temperate));
        assert_eq!(zone(50.0), Some(Zone::Subpolar));
        assert_eq!(zone(66.5), Some(Zone::Subpolar));
        assert_eq!(zone(-66.51), Some(Zone::Polar));
        assert_eq!(zone(90.0), Some(Zone::Polar));
    }

    #[test]
    fn non_finite_has_no_zone() {
        assert_eq!(zone(f64::NAN), None);
        assert_eq!(zone(f64::NEG_INFINITY), None);
    }

    #[test]
    fn display_is_lowercase() {
        assert_eq!(Zone::Subpolar.to_string(), "subpolar");
        assert_eq!(Hemisphere::South.to_string(), "south");
    }
}

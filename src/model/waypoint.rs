//! Geographic waypoints on a simulated route.

use serde::{Deserialize, Deserializer, Serialize};

/// A single `{lng, lat}` coordinate on a simulated route.
///
/// Coordinates coming off the wire are parsed leniently: numbers, numeric
/// strings, `null` and missing fields are all accepted. Anything that does not
/// yield a number becomes `NaN`, which the player later skips as an invalid
/// waypoint instead of rejecting the whole route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    #[serde(default = "missing", deserialize_with = "lenient_coord")]
    pub lng: f64,
    #[serde(default = "missing", deserialize_with = "lenient_coord")]
    pub lat: f64,
}

impl Waypoint {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Returns true when both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.lng.is_finite() && self.lat.is_finite()
    }
}

impl From<(f64, f64)> for Waypoint {
    fn from((lng, lat): (f64, f64)) -> Self {
        Self { lng, lat }
    }
}

fn missing() -> f64 {
    f64::NAN
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCoord {
    Number(f64),
    Text(String),
    Null(()),
}

fn lenient_coord<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawCoord::deserialize(deserializer)? {
        RawCoord::Number(value) => value,
        RawCoord::Text(text) => text.trim().parse().unwrap_or(f64::NAN),
        RawCoord::Null(_) => f64::NAN,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_numbers_and_numeric_strings() {
        let wp: Waypoint = serde_json::from_str(r#"{"lng": 116.4, "lat": "39.9"}"#).unwrap();
        assert_eq!(wp, Waypoint::new(116.4, 39.9));
        assert!(wp.is_finite());
    }

    #[test]
    fn test_null_or_missing_coordinates_become_nan() {
        let wp: Waypoint = serde_json::from_str(r#"{"lng": null}"#).unwrap();
        assert!(wp.lng.is_nan());
        assert!(wp.lat.is_nan());
        assert!(!wp.is_finite());

        let wp: Waypoint = serde_json::from_str(r#"{"lng": "east", "lat": 1}"#).unwrap();
        assert!(!wp.is_finite());
    }
}

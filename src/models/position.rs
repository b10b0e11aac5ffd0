use crate::geometry::spherical;
use crate::models::DistanceMeters;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A WGS-84 location sample or maze vertex, in degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
}

impl Position {
    pub fn new(lat: f64, lng: f64) -> Result<Self, String> {
        let position = Position { lat, lng };
        position.validate()?;
        Ok(position)
    }

    /// Re-check a position that may have been built through the public fields.
    pub fn validate(&self) -> Result<(), String> {
        if !self.lat.is_finite() || !self.lng.is_finite() {
            return Err(format!(
                "Non-finite coordinates: ({}, {})",
                self.lat, self.lng
            ));
        }
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(format!(
                "Invalid latitude: {} (must be between -90 and 90)",
                self.lat
            ));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(format!(
                "Invalid longitude: {} (must be between -180 and 180)",
                self.lng
            ));
        }
        Ok(())
    }

    /// Great-circle distance to `other`.
    pub fn distance_to(&self, other: &Position) -> DistanceMeters {
        spherical::distance(self, other)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_validation() {
        assert!(Position::new(41.17826, -8.59821).is_ok());
        assert!(Position::new(91.0, 0.0).is_err());
        assert!(Position::new(0.0, 181.0).is_err());
        assert!(Position::new(f64::NAN, 0.0).is_err());
        assert!(Position::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_catches_field_construction() {
        let p = Position {
            lat: f64::NAN,
            lng: 2.0,
        };
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_distance_calculation() {
        let paris = Position::new(48.8566, 2.3522).unwrap();
        let london = Position::new(51.5074, -0.1278).unwrap();

        // Paris to London is approximately 344 km
        let distance = paris.distance_to(&london).as_meters();
        assert!((distance - 344_000.0).abs() < 10_000.0);
    }

    #[test]
    fn test_display() {
        let p = Position::new(41.5, -8.25).unwrap();
        assert_eq!(p.to_string(), "(41.500000, -8.250000)");
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// Non-negative distance in meters. Also used for tolerance radii.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct DistanceMeters(pub f64);

impl DistanceMeters {
    pub fn new(meters: f64) -> Result<Self, String> {
        if meters < 0.0 {
            return Err("Distance cannot be negative".to_string());
        }
        if !meters.is_finite() {
            return Err("Distance must be a finite number".to_string());
        }
        Ok(DistanceMeters(meters))
    }

    /// Get the raw meters value
    pub fn as_meters(self) -> f64 {
        self.0
    }

    /// Create from raw value without validation (use carefully)
    pub fn from_raw(meters: f64) -> Self {
        DistanceMeters(meters)
    }

    pub fn min(self, other: Self) -> Self {
        if other.0 < self.0 {
            other
        } else {
            self
        }
    }
}

impl fmt::Display for DistanceMeters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}m", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_meters_creation() {
        assert!(DistanceMeters::new(500.0).is_ok());
        assert!(DistanceMeters::new(0.0).is_ok());
        assert!(DistanceMeters::new(-1.0).is_err());
        assert!(DistanceMeters::new(f64::INFINITY).is_err());
        assert!(DistanceMeters::new(f64::NAN).is_err());
    }

    #[test]
    fn test_distance_meters_min() {
        let a = DistanceMeters::from_raw(3.0);
        let b = DistanceMeters::from_raw(7.5);
        assert_eq!(a.min(b), a);
        assert_eq!(b.min(a), a);
    }

    #[test]
    fn test_distance_meters_display() {
        let d = DistanceMeters::new(150.5).unwrap();
        assert_eq!(format!("{}", d), "150.5m");
    }
}

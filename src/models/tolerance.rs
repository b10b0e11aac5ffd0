use crate::constants::{DEFAULT_DRIFT_TOLERANCE_M, DEFAULT_PROXIMITY_TOLERANCE_M};
use crate::models::DistanceMeters;

/// Radii used to classify samples and detect drift.
/// Injected into the engine and tracker so tests can override them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Max distance from entrance, exit or corridor to count as on the maze
    pub proximity: DistanceMeters,
    /// Max displacement from the last valid position before guidance
    /// switches to return-to-path
    pub drift: DistanceMeters,
}

impl Tolerance {
    pub fn new(proximity_m: f64, drift_m: f64) -> Result<Self, String> {
        Ok(Tolerance {
            proximity: radius("Proximity", proximity_m)?,
            drift: radius("Drift", drift_m)?,
        })
    }
}

fn radius(label: &str, meters: f64) -> Result<DistanceMeters, String> {
    let radius = DistanceMeters::new(meters)
        .map_err(|e| format!("{} tolerance {}: {}", label, meters, e))?;
    if radius.as_meters() == 0.0 {
        return Err(format!("{} tolerance must be greater than 0", label));
    }
    Ok(radius)
}

impl Default for Tolerance {
    fn default() -> Self {
        Tolerance {
            proximity: DistanceMeters::from_raw(DEFAULT_PROXIMITY_TOLERANCE_M),
            drift: DistanceMeters::from_raw(DEFAULT_DRIFT_TOLERANCE_M),
        }
    }
}

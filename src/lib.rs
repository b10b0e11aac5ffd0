// Library exports for testing and reusability

pub mod config;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use services::proximity::PathProximityEngine;
pub use services::session::TrackingSession;
pub use services::tracking::{Guidance, PlayerTrackingStateMachine};

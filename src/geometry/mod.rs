//! Geometric primitives on a spherical Earth model.

pub mod polyline;
pub mod spherical;

pub use spherical::{distance, distance_to_segment};

pub mod distance;
pub mod maze;
pub mod play;
pub mod position;
pub mod tolerance;

pub use distance::DistanceMeters;
pub use maze::{CorridorDocument, MazeDefinition, MazeDocument, PathSegment};
pub use play::PlayResult;
pub use position::Position;
pub use tolerance::Tolerance;

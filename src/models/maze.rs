use crate::error::{AppError, Result};
use crate::geometry::polyline;
use crate::models::Position;
use serde::{Deserialize, Serialize};

/// One corridor of the maze: an ordered polyline of at least two vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSegment {
    points: Vec<Position>,
    geodesic: bool,
}

impl PathSegment {
    pub fn new(points: Vec<Position>, geodesic: bool) -> Result<Self> {
        if points.len() < 2 {
            return Err(AppError::InvalidMaze(format!(
                "Corridor needs at least 2 vertices, got {}",
                points.len()
            )));
        }
        for p in &points {
            p.validate().map_err(AppError::InvalidMaze)?;
        }
        Ok(PathSegment { points, geodesic })
    }

    /// Build a corridor from a Google encoded polyline string
    pub fn from_encoded(encoded: &str, geodesic: bool) -> Result<Self> {
        let points = polyline::decode(encoded).map_err(AppError::InvalidMaze)?;
        Self::new(points, geodesic)
    }

    pub fn points(&self) -> &[Position] {
        &self.points
    }

    /// Whether distances along this corridor follow great circles
    /// rather than straight chords
    pub fn is_geodesic(&self) -> bool {
        self.geodesic
    }

    /// Same corridor traversed in the opposite direction
    pub fn reversed(&self) -> Self {
        let mut points = self.points.clone();
        points.reverse();
        PathSegment {
            points,
            geodesic: self.geodesic,
        }
    }
}

/// The walkable path: entrance, exit and the corridors joining them.
#[derive(Debug, Clone, PartialEq)]
pub struct MazeDefinition {
    pub name: String,
    pub entrance: Position,
    pub exit: Position,
    pub corridors: Vec<PathSegment>,
}

impl MazeDefinition {
    pub fn new(
        name: impl Into<String>,
        entrance: Position,
        exit: Position,
        corridors: Vec<PathSegment>,
    ) -> Result<Self> {
        entrance
            .validate()
            .map_err(|e| AppError::InvalidMaze(format!("entrance: {}", e)))?;
        exit.validate()
            .map_err(|e| AppError::InvalidMaze(format!("exit: {}", e)))?;

        let name = name.into();
        if corridors.is_empty() {
            tracing::warn!(
                maze = %name,
                "Maze '{}' has no corridors; only entrance and exit count as on-path",
                name
            );
        }

        Ok(MazeDefinition {
            name,
            entrance,
            exit,
            corridors,
        })
    }
}

// Wire format exchanged with the backend

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MazeDocument {
    pub name: String,
    pub entrance: Position,
    pub exit: Position,
    #[serde(default)]
    pub corridors: Vec<CorridorDocument>,
}

/// A corridor is sent either as explicit vertices or as an encoded polyline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorridorDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<Position>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoded: Option<String>,
    #[serde(default)]
    pub geodesic: bool,
}

impl TryFrom<CorridorDocument> for PathSegment {
    type Error = AppError;

    fn try_from(doc: CorridorDocument) -> Result<Self> {
        match (doc.points, doc.encoded) {
            (Some(points), None) => PathSegment::new(points, doc.geodesic),
            (None, Some(encoded)) => PathSegment::from_encoded(&encoded, doc.geodesic),
            (Some(_), Some(_)) => Err(AppError::InvalidMaze(
                "Corridor has both 'points' and 'encoded'".to_string(),
            )),
            (None, None) => Err(AppError::InvalidMaze(
                "Corridor has neither 'points' nor 'encoded'".to_string(),
            )),
        }
    }
}

impl TryFrom<MazeDocument> for MazeDefinition {
    type Error = AppError;

    fn try_from(doc: MazeDocument) -> Result<Self> {
        let corridors = doc
            .corridors
            .into_iter()
            .map(PathSegment::try_from)
            .collect::<Result<Vec<_>>>()?;
        MazeDefinition::new(doc.name, doc.entrance, doc.exit, corridors)
    }
}

use crate::geometry::{distance, distance_to_segment};
use crate::models::{MazeDefinition, Position, Tolerance};

/// Which maze element a sample was matched against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathMatch {
    Entrance,
    Exit,
    /// Index into `MazeDefinition::corridors`
    Corridor(usize),
}

/// Classifies positions against a maze. Stateless: every call is a pure
/// function of its inputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathProximityEngine;

impl PathProximityEngine {
    pub fn new() -> Self {
        PathProximityEngine
    }

    /// True when `p` lies strictly within the proximity tolerance of the
    /// entrance, the exit or any corridor. A sample at exactly the tolerance
    /// distance is off-path.
    pub fn is_on_path(&self, p: &Position, maze: &MazeDefinition, tol: &Tolerance) -> bool {
        self.locate(p, maze, tol).is_some()
    }

    /// Like [`is_on_path`](Self::is_on_path) but reports the first element
    /// that matched. Cheap point checks run before any corridor projection.
    pub fn locate(
        &self,
        p: &Position,
        maze: &MazeDefinition,
        tol: &Tolerance,
    ) -> Option<PathMatch> {
        if distance(p, &maze.entrance) < tol.proximity {
            return Some(PathMatch::Entrance);
        }
        if distance(p, &maze.exit) < tol.proximity {
            return Some(PathMatch::Exit);
        }

        maze.corridors
            .iter()
            .position(|corridor| distance_to_segment(p, corridor) < tol.proximity)
            .map(PathMatch::Corridor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PathSegment;

    fn p(lat: f64, lng: f64) -> Position {
        Position::new(lat, lng).unwrap()
    }

    fn test_maze() -> MazeDefinition {
        let entrance = p(41.17826, -8.59821);
        let exit = p(41.17767, -8.59573);
        let corridor = PathSegment::new(vec![entrance, p(41.1780, -8.5970), exit], false).unwrap();
        MazeDefinition::new("test", entrance, exit, vec![corridor]).unwrap()
    }

    #[test]
    fn entrance_and_exit_match_first() {
        let engine = PathProximityEngine::new();
        let maze = test_maze();
        let tol = Tolerance::default();

        assert_eq!(
            engine.locate(&maze.entrance, &maze, &tol),
            Some(PathMatch::Entrance)
        );
        assert_eq!(engine.locate(&maze.exit, &maze, &tol), Some(PathMatch::Exit));
    }

    #[test]
    fn corridor_vertex_matches_corridor() {
        let engine = PathProximityEngine::new();
        let maze = test_maze();
        let tol = Tolerance::default();

        assert_eq!(
            engine.locate(&p(41.1780, -8.5970), &maze, &tol),
            Some(PathMatch::Corridor(0))
        );
    }

    #[test]
    fn far_sample_is_off_path() {
        let engine = PathProximityEngine::new();
        let maze = test_maze();
        let tol = Tolerance::default();

        // ~110 m north of the entrance
        assert!(!engine.is_on_path(&p(41.17926, -8.59821), &maze, &tol));
    }

    #[test]
    fn boundary_is_exclusive() {
        let engine = PathProximityEngine::new();
        let entrance = p(10.0, 10.0);
        let exit = p(10.5, 10.5);
        let maze = MazeDefinition::new("boundary", entrance, exit, vec![]).unwrap();

        let sample = p(10.00003, 10.0);
        let exact = distance(&sample, &entrance).as_meters();

        let at_boundary = Tolerance::new(exact, 20.0).unwrap();
        assert!(!engine.is_on_path(&sample, &maze, &at_boundary));

        let just_wider = Tolerance::new(exact * 1.000_001, 20.0).unwrap();
        assert!(engine.is_on_path(&sample, &maze, &just_wider));
    }

    #[test]
    fn corridor_order_does_not_matter() {
        let engine = PathProximityEngine::new();
        let entrance = p(41.0, -8.0);
        let exit = p(41.01, -8.0);
        let east = PathSegment::new(vec![p(41.005, -7.99), p(41.005, -7.98)], false).unwrap();
        let west = PathSegment::new(vec![p(41.005, -8.01), p(41.005, -8.02)], true).unwrap();
        let tol = Tolerance::default();

        let forward =
            MazeDefinition::new("f", entrance, exit, vec![east.clone(), west.clone()]).unwrap();
        let backward = MazeDefinition::new("b", entrance, exit, vec![west, east]).unwrap();

        for sample in [p(41.005, -7.985), p(41.005, -8.015), p(41.02, -8.0)] {
            assert_eq!(
                engine.is_on_path(&sample, &forward, &tol),
                engine.is_on_path(&sample, &backward, &tol)
            );
        }
    }
}

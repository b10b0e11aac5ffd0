use crate::error::{AppError, Result};
use crate::geometry::distance;
use crate::models::{DistanceMeters, MazeDefinition, Position, Tolerance};
use crate::services::proximity::{PathMatch, PathProximityEngine};
use serde::Serialize;

/// Guidance shown to the player after each sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Guidance {
    OnTrack,
    ReturnToPath,
}

/// How the last valid position evolves while the player walks the maze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LastValidPolicy {
    /// Last valid position stays at the entrance for the whole session,
    /// so drift is always measured from the start of the maze.
    #[default]
    PinnedAtEntrance,
    /// Every on-path, low-drift sample becomes the new last valid position.
    AdvanceOnTrack,
}

impl std::str::FromStr for LastValidPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pinned" => Ok(LastValidPolicy::PinnedAtEntrance),
            "advance" => Ok(LastValidPolicy::AdvanceOnTrack),
            _ => Err(format!(
                "Invalid last-valid policy: {}. Use 'pinned' or 'advance'",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerState {
    /// Most recent sample, may be off-path
    pub last_known_position: Position,
    /// Drift reference; never replaced by an off-path sample
    pub last_valid_position: Position,
    pub guidance: Guidance,
    /// Whether the last-valid marker should be shown
    pub marker_visible: bool,
}

/// What the tracker emits after evaluating one sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackingUpdate {
    pub position: Position,
    pub guidance: Guidance,
    pub marker_visible: bool,
    pub last_valid_position: Position,
    /// Maze element matched, `None` when off-path
    pub matched: Option<PathMatch>,
    /// Distance to the last valid position, only computed for on-path samples
    pub drift: Option<DistanceMeters>,
}

impl TrackingUpdate {
    pub fn is_on_path(&self) -> bool {
        self.matched.is_some()
    }
}

/// Per-session state machine: `Unknown` until the first sample, then
/// `Evaluated` for the remainder of the session.
pub struct PlayerTrackingStateMachine {
    engine: PathProximityEngine,
    maze: MazeDefinition,
    tolerance: Tolerance,
    policy: LastValidPolicy,
    state: Option<PlayerState>,
}

impl PlayerTrackingStateMachine {
    pub fn new(maze: MazeDefinition, tolerance: Tolerance) -> Self {
        PlayerTrackingStateMachine {
            engine: PathProximityEngine::new(),
            maze,
            tolerance,
            policy: LastValidPolicy::default(),
            state: None,
        }
    }

    pub fn with_policy(mut self, policy: LastValidPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn maze(&self) -> &MazeDefinition {
        &self.maze
    }

    pub fn tolerance(&self) -> &Tolerance {
        &self.tolerance
    }

    /// `None` while no sample has been evaluated yet
    pub fn state(&self) -> Option<&PlayerState> {
        self.state.as_ref()
    }

    /// Evaluate a new sample.
    ///
    /// Malformed samples are rejected before any state is touched; the
    /// previous state is kept as-is.
    pub fn observe(&mut self, sample: Position) -> Result<TrackingUpdate> {
        sample.validate().map_err(AppError::InvalidSample)?;

        let last_valid = self
            .state
            .map(|s| s.last_valid_position)
            .unwrap_or(self.maze.entrance);

        let matched = self.engine.locate(&sample, &self.maze, &self.tolerance);

        let (guidance, marker_visible, drift) = match matched {
            Some(_) => {
                let drift = distance(&sample, &last_valid);
                if drift > self.tolerance.drift {
                    (Guidance::ReturnToPath, true, Some(drift))
                } else {
                    (Guidance::OnTrack, false, Some(drift))
                }
            }
            None => (Guidance::ReturnToPath, true, None),
        };

        let last_valid_position = match (self.policy, guidance) {
            (LastValidPolicy::AdvanceOnTrack, Guidance::OnTrack) => sample,
            _ => last_valid,
        };

        self.state = Some(PlayerState {
            last_known_position: sample,
            last_valid_position,
            guidance,
            marker_visible,
        });

        tracing::debug!(
            position = %sample,
            on_path = matched.is_some(),
            guidance = ?guidance,
            "Sample {} evaluated: {:?}",
            sample,
            guidance
        );

        Ok(TrackingUpdate {
            position: sample,
            guidance,
            marker_visible,
            last_valid_position,
            matched,
            drift,
        })
    }
}

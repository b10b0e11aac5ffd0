use crate::constants::{
    LOCATION_REQUEST_FASTEST_INTERVAL_MS, LOCATION_REQUEST_INTERVAL_MS,
    LOCATION_UNAVAILABLE_NOTICE, RETURN_TO_PATH_NOTICE,
};
use crate::error::{AppError, Result};
use crate::models::{PlayResult, Position};
use crate::services::proximity::PathMatch;
use crate::services::tracking::{Guidance, PlayerTrackingStateMachine, TrackingUpdate};
use std::time::Duration;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationPriority {
    HighAccuracy,
    Balanced,
    LowPower,
}

/// Subscription parameters handed to the position-update provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationRequest {
    pub interval: Duration,
    pub fastest_interval: Duration,
    pub priority: LocationPriority,
}

impl Default for LocationRequest {
    fn default() -> Self {
        LocationRequest {
            interval: Duration::from_millis(LOCATION_REQUEST_INTERVAL_MS),
            fastest_interval: Duration::from_millis(LOCATION_REQUEST_FASTEST_INTERVAL_MS),
            priority: LocationPriority::HighAccuracy,
        }
    }
}

/// Outcome of checking the device's location settings against the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationSettingsStatus {
    Satisfied,
    /// Settings can be fixed by asking the user
    ResolutionRequired,
    /// Settings cannot be fixed on this device
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionOutcome {
    Accepted,
    Declined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    Entrance,
    Exit,
    LastValid,
    Player,
}

/// Intents for the map/notification collaborator
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    PlacePolyline {
        corridor: usize,
        points: Vec<Position>,
        geodesic: bool,
    },
    PlaceMarker {
        kind: MarkerKind,
        position: Position,
        visible: bool,
    },
    RemoveMarker {
        kind: MarkerKind,
    },
    SetMarkerVisible {
        kind: MarkerKind,
        visible: bool,
    },
    Recenter {
        position: Position,
    },
    Notify {
        message: String,
    },
    /// Result of evaluating one sample
    Guidance {
        position: Position,
        guidance: Guidance,
        marker_visible: bool,
    },
}

/// Narrow interface to whatever draws the map and shows notices
pub trait RenderSink {
    fn render(&mut self, command: RenderCommand);
}

impl RenderSink for Vec<RenderCommand> {
    fn render(&mut self, command: RenderCommand) {
        self.push(command);
    }
}

impl RenderSink for UnboundedSender<RenderCommand> {
    fn render(&mut self, command: RenderCommand) {
        if self.send(command).is_err() {
            tracing::debug!("Render receiver dropped, discarding command");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    AwaitingSettings,
    AwaitingResolution,
    /// Map drawn, waiting for location permission
    Ready,
    Tracking,
    Ended,
}

/// One play session: owns the tracker and talks to the renderer.
pub struct TrackingSession<R: RenderSink> {
    id: Uuid,
    tracker: PlayerTrackingStateMachine,
    renderer: R,
    phase: SessionPhase,
    started_at: OffsetDateTime,
    samples: u32,
    off_path_samples: u32,
    reached_exit: bool,
    player_marker_placed: bool,
}

impl<R: RenderSink> TrackingSession<R> {
    pub fn new(tracker: PlayerTrackingStateMachine, renderer: R) -> Self {
        let id = Uuid::new_v4();
        tracing::info!(
            session_id = %id,
            maze = %tracker.maze().name,
            "Session created for maze '{}'",
            tracker.maze().name
        );
        TrackingSession {
            id,
            tracker,
            renderer,
            phase: SessionPhase::AwaitingSettings,
            started_at: OffsetDateTime::now_utc(),
            samples: 0,
            off_path_samples: 0,
            reached_exit: false,
            player_marker_placed: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn tracker(&self) -> &PlayerTrackingStateMachine {
        &self.tracker
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Parameters to subscribe to the position provider with
    pub fn location_request(&self) -> LocationRequest {
        LocationRequest::default()
    }

    /// Only valid while awaiting the settings check. An ended session stays
    /// ended.
    pub fn on_settings_result(&mut self, status: LocationSettingsStatus) -> Result<SessionPhase> {
        self.expect_phase(SessionPhase::AwaitingSettings, "a settings result")?;
        match status {
            LocationSettingsStatus::Satisfied => self.draw_maze(),
            LocationSettingsStatus::ResolutionRequired => {
                tracing::info!(session_id = %self.id, "Location settings need user resolution");
                self.phase = SessionPhase::AwaitingResolution;
            }
            LocationSettingsStatus::Unavailable => return self.abort_unsatisfiable(),
        }
        Ok(self.phase)
    }

    /// Only valid after `ResolutionRequired`
    pub fn on_resolution(&mut self, outcome: ResolutionOutcome) -> Result<SessionPhase> {
        self.expect_phase(SessionPhase::AwaitingResolution, "a resolution outcome")?;
        match outcome {
            ResolutionOutcome::Accepted => self.draw_maze(),
            ResolutionOutcome::Declined => return self.abort_unsatisfiable(),
        }
        Ok(self.phase)
    }

    /// A denied permission is not an error: the session simply never
    /// receives samples.
    pub fn on_permission(&mut self, status: PermissionStatus) -> SessionPhase {
        match (status, self.phase) {
            (PermissionStatus::Granted, SessionPhase::Ready) => {
                self.phase = SessionPhase::Tracking;
                tracing::info!(session_id = %self.id, "Location permission granted, tracking");
            }
            (PermissionStatus::Denied, _) => {
                tracing::info!(
                    session_id = %self.id,
                    "Location permission denied; no samples will arrive"
                );
            }
            _ => {}
        }
        self.phase
    }

    /// Feed one position sample. Nothing is rendered unless the sample was
    /// evaluated successfully.
    pub fn on_position(&mut self, sample: Position) -> Result<TrackingUpdate> {
        if !matches!(self.phase, SessionPhase::Ready | SessionPhase::Tracking) {
            return Err(AppError::SessionState(format!(
                "cannot accept samples while {:?}",
                self.phase
            )));
        }

        let previous_valid = self.tracker.state().map(|s| s.last_valid_position);
        let update = self.tracker.observe(sample)?;

        self.samples += 1;
        if !update.is_on_path() {
            self.off_path_samples += 1;
        }
        if update.matched == Some(PathMatch::Exit) {
            self.reached_exit = true;
        }

        self.render_update(&update, previous_valid);
        Ok(update)
    }

    /// Finish the session and summarise it
    pub fn end(mut self) -> PlayResult {
        self.phase = SessionPhase::Ended;
        let finished_at = OffsetDateTime::now_utc();

        tracing::info!(
            session_id = %self.id,
            samples = self.samples,
            off_path = self.off_path_samples,
            reached_exit = self.reached_exit,
            "Session ended after {} samples",
            self.samples
        );

        PlayResult {
            session_id: self.id,
            maze_name: self.tracker.maze().name.clone(),
            started_at: self.started_at.format(&Rfc3339).unwrap_or_default(),
            finished_at: finished_at.format(&Rfc3339).unwrap_or_default(),
            samples: self.samples,
            off_path_samples: self.off_path_samples,
            reached_exit: self.reached_exit,
        }
    }

    fn expect_phase(&self, expected: SessionPhase, what: &str) -> Result<()> {
        if self.phase != expected {
            tracing::warn!(
                session_id = %self.id,
                "Ignoring {} while {:?}",
                what,
                self.phase
            );
            return Err(AppError::SessionState(format!(
                "cannot accept {} while {:?}",
                what, self.phase
            )));
        }
        Ok(())
    }

    fn abort_unsatisfiable(&mut self) -> Result<SessionPhase> {
        tracing::warn!(session_id = %self.id, "Location settings cannot be satisfied");
        self.renderer.render(RenderCommand::Notify {
            message: LOCATION_UNAVAILABLE_NOTICE.to_string(),
        });
        self.phase = SessionPhase::Ended;
        Err(AppError::SettingsUnsatisfiable(
            LOCATION_UNAVAILABLE_NOTICE.to_string(),
        ))
    }

    fn draw_maze(&mut self) {
        let maze = self.tracker.maze();
        let mut commands = Vec::with_capacity(maze.corridors.len() + 4);

        for (corridor, segment) in maze.corridors.iter().enumerate() {
            commands.push(RenderCommand::PlacePolyline {
                corridor,
                points: segment.points().to_vec(),
                geodesic: segment.is_geodesic(),
            });
        }
        commands.push(RenderCommand::PlaceMarker {
            kind: MarkerKind::Entrance,
            position: maze.entrance,
            visible: true,
        });
        commands.push(RenderCommand::PlaceMarker {
            kind: MarkerKind::LastValid,
            position: maze.entrance,
            visible: false,
        });
        commands.push(RenderCommand::PlaceMarker {
            kind: MarkerKind::Exit,
            position: maze.exit,
            visible: true,
        });
        commands.push(RenderCommand::Recenter {
            position: maze.entrance,
        });

        for command in commands {
            self.renderer.render(command);
        }
        self.phase = SessionPhase::Ready;
    }

    fn render_update(&mut self, update: &TrackingUpdate, previous_valid: Option<Position>) {
        if self.player_marker_placed {
            self.renderer.render(RenderCommand::RemoveMarker {
                kind: MarkerKind::Player,
            });
        }
        self.renderer.render(RenderCommand::PlaceMarker {
            kind: MarkerKind::Player,
            position: update.position,
            visible: true,
        });
        self.player_marker_placed = true;

        self.renderer.render(RenderCommand::Recenter {
            position: update.position,
        });

        if previous_valid.is_some_and(|p| p != update.last_valid_position) {
            self.renderer.render(RenderCommand::RemoveMarker {
                kind: MarkerKind::LastValid,
            });
            self.renderer.render(RenderCommand::PlaceMarker {
                kind: MarkerKind::LastValid,
                position: update.last_valid_position,
                visible: update.marker_visible,
            });
        } else {
            self.renderer.render(RenderCommand::SetMarkerVisible {
                kind: MarkerKind::LastValid,
                visible: update.marker_visible,
            });
        }

        if update.guidance == Guidance::ReturnToPath {
            self.renderer.render(RenderCommand::Notify {
                message: RETURN_TO_PATH_NOTICE.to_string(),
            });
        }

        self.renderer.render(RenderCommand::Guidance {
            position: update.position,
            guidance: update.guidance,
            marker_visible: update.marker_visible,
        });
    }
}

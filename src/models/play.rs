use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome of one play session, submitted to the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayResult {
    pub session_id: Uuid,
    pub maze_name: String,
    /// RFC 3339 timestamps
    pub started_at: String,
    pub finished_at: String,
    pub samples: u32,
    pub off_path_samples: u32,
    pub reached_exit: bool,
}

impl PlayResult {
    /// Fraction of samples that were classified on-path (0.0-1.0)
    pub fn on_path_ratio(&self) -> f64 {
        if self.samples == 0 {
            return 0.0;
        }
        self.samples.saturating_sub(self.off_path_samples) as f64 / self.samples as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(samples: u32, off: u32) -> PlayResult {
        PlayResult {
            session_id: Uuid::new_v4(),
            maze_name: "feup".to_string(),
            started_at: "2026-10-17T10:00:00Z".to_string(),
            finished_at: "2026-10-17T10:20:00Z".to_string(),
            samples,
            off_path_samples: off,
            reached_exit: true,
        }
    }

    #[test]
    fn on_path_ratio() {
        assert_eq!(result(0, 0).on_path_ratio(), 0.0);
        assert_eq!(result(4, 1).on_path_ratio(), 0.75);
    }

    #[test]
    fn serializes_with_snake_case_fields() {
        let json = serde_json::to_value(result(10, 2)).unwrap();
        assert_eq!(json["maze_name"], "feup");
        assert_eq!(json["off_path_samples"], 2);
        assert_eq!(json["reached_exit"], true);
    }
}

//! Wire types for the LearnLab API.

use learnlab_playback::ProgressReport;
use serde::{Deserialize, Serialize};

/// Request body for `POST /api/podcasts/{id}/progress`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressPayload {
    pub position_seconds: f64,
    pub completion_percentage: f64,
}

impl From<&ProgressReport> for ProgressPayload {
    fn from(report: &ProgressReport) -> Self {
        Self {
            position_seconds: report.position_seconds,
            completion_percentage: report.completion_percentage,
        }
    }
}

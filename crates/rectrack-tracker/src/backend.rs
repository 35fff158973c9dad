//! Collaborator seams: whatever produces rectangle candidates and whatever
//! follows a known rectangle into the next frame.

use rectrack_core::{Frame, Normalized, Quad};

use crate::params::DetectorConfig;

/// Failure reported by an external vision collaborator.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("rectangle detection failed: {0}")]
    Detection(String),
    #[error("rectangle tracking failed: {0}")]
    Tracking(String),
    #[error("classification failed: {0}")]
    Classification(String),
}

/// Full per-frame rectangle detection.
pub trait RectangleDetector {
    /// Candidates in normalized coordinates, ranked by confidence. An empty
    /// vector means "nothing found" and is not an error.
    fn detect(
        &mut self,
        frame: &Frame<'_>,
        config: &DetectorConfig,
    ) -> Result<Vec<Quad<Normalized>>, BackendError>;
}

/// Input of a tracking pass.
#[derive(Clone, Copy, Debug)]
pub struct TrackRequest<'r, 'f> {
    /// Frame the seed should be located in.
    pub frame: &'r Frame<'f>,
    /// Target from the previous frame.
    pub seed: &'r Quad<Normalized>,
    /// This frame's filtered detections, best first.
    pub candidates: &'r [Quad<Normalized>],
}

/// Lightweight update of a known quad against the current frame.
pub trait TrackingPass {
    /// `Ok(None)` when the seed could not be followed.
    fn track(
        &mut self,
        request: TrackRequest<'_, '_>,
    ) -> Result<Option<Quad<Normalized>>, BackendError>;
}

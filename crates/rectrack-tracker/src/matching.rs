use serde::{Deserialize, Serialize};

use rectrack_core::{Normalized, Quad};

use crate::backend::{BackendError, TrackRequest, TrackingPass};

/// Tracking pass that follows the seed by matching it against the current
/// frame's detections.
///
/// The candidate with the smallest mean corner displacement wins if that
/// displacement stays within `max_corner_shift` (normalized units).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandidateMatchingPass {
    pub max_corner_shift: f32,
}

impl Default for CandidateMatchingPass {
    fn default() -> Self {
        Self {
            max_corner_shift: 0.05,
        }
    }
}

impl CandidateMatchingPass {
    pub fn new(max_corner_shift: f32) -> Self {
        Self { max_corner_shift }
    }
}

impl TrackingPass for CandidateMatchingPass {
    fn track(
        &mut self,
        request: TrackRequest<'_, '_>,
    ) -> Result<Option<Quad<Normalized>>, BackendError> {
        let best = request
            .candidates
            .iter()
            .map(|c| (c, c.mean_corner_distance(request.seed)))
            .filter(|(_, d)| d.is_finite())
            .min_by(|a, b| a.1.total_cmp(&b.1));

        Ok(match best {
            Some((c, d)) if d <= self.max_corner_shift => {
                log::trace!("matched seed with mean corner shift {d:.4}");
                Some(*c)
            }
            _ => None,
        })
    }
}

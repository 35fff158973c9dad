//! Rectangle tracker built on top of `rectrack-core`.
//!
//! ## Quickstart
//!
//! ```
//! use rectrack_core::{FrameBuffer, GrayImage, Normalized, Quad, Rect};
//! use rectrack_tracker::{
//!     BackendError, CandidateMatchingPass, DetectorConfig, RectangleDetector, RectangleTracker,
//!     TrackingMode,
//! };
//!
//! struct Still(Quad<Normalized>);
//!
//! impl RectangleDetector for Still {
//!     fn detect(
//!         &mut self,
//!         _frame: &rectrack_core::Frame<'_>,
//!         _config: &DetectorConfig,
//!     ) -> Result<Vec<Quad<Normalized>>, BackendError> {
//!         Ok(vec![self.0])
//!     }
//! }
//!
//! let frame = FrameBuffer::new(0, GrayImage::new(64, 64));
//! let mut detector = Still(Quad::from_rect(Rect::new(0.2, 0.2, 0.5, 0.5), 0.9));
//! let mut pass = CandidateMatchingPass::default();
//! let mut tracker = RectangleTracker::default();
//!
//! tracker.step(&frame.as_frame(), &mut detector, &mut pass).unwrap();
//! let out = tracker.step(&frame.as_frame(), &mut detector, &mut pass).unwrap();
//! assert_eq!(out.target.mode, TrackingMode::Locked);
//! ```
//!
//! Per frame:
//! 1. Run the detector, filter and rank candidates.
//! 2. Idle: adopt the best candidate as provisional target.
//! 3. Acquiring: a successful tracking pass on the provisional target locks it.
//! 4. Locked: a tracking pass refines the target; misses beyond the retry
//!    budget drop it.
//! 5. Anything whose bounding box leaves the frame is discarded and the
//!    state kept.

mod backend;
mod matching;
mod params;
mod select;
mod tracker;

pub use backend::{BackendError, RectangleDetector, TrackRequest, TrackingPass};
pub use matching::CandidateMatchingPass;
pub use params::{AcquirePolicy, DetectorConfig, TrackerParams};
pub use select::filter_candidates;
pub use tracker::{
    within_frame, RectangleTracker, StepOutcome, TrackedTarget, TrackerError, TrackingMode,
    Transition,
};

use serde::{Deserialize, Serialize};

use rectrack_core::{scale_rect, Frame, Normalized, Quad};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::backend::{BackendError, RectangleDetector, TrackRequest, TrackingPass};
use crate::params::{AcquirePolicy, TrackerParams};
use crate::select::filter_candidates;

/// Errors surfaced by [`RectangleTracker::step`]. The tracker state is left
/// untouched whenever one is returned.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TrackerError {
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Public view of the tracker state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingMode {
    /// No target.
    #[default]
    Idle,
    /// Provisional target, not yet confirmed by a tracking pass.
    Acquiring,
    /// Committed target, refined by a tracking pass every frame.
    Locked,
}

/// Immutable per-frame snapshot of the tracked target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackedTarget {
    pub mode: TrackingMode,
    pub quad: Option<Quad<Normalized>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: TrackingMode,
    pub to: TrackingMode,
}

/// Result of one tracker step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub target: TrackedTarget,
    /// Set when the mode changed during this step.
    pub transition: Option<Transition>,
    /// A candidate or tracked result fell outside the frame and was discarded.
    pub out_of_bounds: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum State {
    Idle,
    Acquiring {
        provisional: Quad<Normalized>,
    },
    Locked {
        target: Quad<Normalized>,
        misses: u32,
    },
}

impl State {
    fn mode(&self) -> TrackingMode {
        match self {
            State::Idle => TrackingMode::Idle,
            State::Acquiring { .. } => TrackingMode::Acquiring,
            State::Locked { .. } => TrackingMode::Locked,
        }
    }

    fn quad(&self) -> Option<Quad<Normalized>> {
        match self {
            State::Idle => None,
            State::Acquiring { provisional } => Some(*provisional),
            State::Locked { target, .. } => Some(*target),
        }
    }
}

/// Keeps one stable quadrilateral across a stream of noisy detections.
///
/// Detection runs every frame. While acquiring or locked, a tracking pass
/// seeded with the previous target decides whether the target survives; the
/// detections serve as recovery path. All state lives in this struct and is
/// only handed out as [`TrackedTarget`] snapshots.
#[derive(Clone, Debug)]
pub struct RectangleTracker {
    params: TrackerParams,
    state: State,
}

impl RectangleTracker {
    pub fn new(params: TrackerParams) -> Self {
        Self {
            params,
            state: State::Idle,
        }
    }

    #[inline]
    pub fn params(&self) -> &TrackerParams {
        &self.params
    }

    #[inline]
    pub fn mode(&self) -> TrackingMode {
        self.state.mode()
    }

    pub fn snapshot(&self) -> TrackedTarget {
        TrackedTarget {
            mode: self.state.mode(),
            quad: self.state.quad(),
        }
    }

    /// Consecutive failed tracking passes of the locked target.
    pub fn misses(&self) -> u32 {
        match self.state {
            State::Locked { misses, .. } => misses,
            _ => 0,
        }
    }

    /// Drop the target and return to idle, whatever the current state.
    pub fn reset(&mut self) -> TrackedTarget {
        if self.state != State::Idle {
            log::debug!("tracker reset from {:?}", self.state.mode());
        }
        self.state = State::Idle;
        self.snapshot()
    }

    /// Advance the state machine by one frame.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip_all, fields(frame = frame.index, mode = ?self.state.mode()))
    )]
    pub fn step<D, P>(
        &mut self,
        frame: &Frame<'_>,
        detector: &mut D,
        pass: &mut P,
    ) -> Result<StepOutcome, TrackerError>
    where
        D: RectangleDetector + ?Sized,
        P: TrackingPass + ?Sized,
    {
        let raw = detector.detect(frame, &self.params.detector)?;
        let candidates = filter_candidates(raw, &self.params);
        let best = candidates.first().copied();

        let mut out_of_bounds = false;
        let mut guard = |q: &Quad<Normalized>, what: &str| -> bool {
            if within_frame(frame, q) {
                true
            } else {
                log::warn!(
                    "rectangle out of bounds: {what} {:?} on frame {} ({}x{})",
                    q.bounding_box(),
                    frame.index,
                    frame.image.width,
                    frame.image.height
                );
                out_of_bounds = true;
                false
            }
        };

        let next = match self.state {
            State::Idle => match best {
                Some(c) if guard(&c, "candidate") => State::Acquiring { provisional: c },
                _ => State::Idle,
            },
            State::Acquiring { provisional } => match best {
                None => State::Idle,
                Some(c) => match self.follow(frame, &provisional, &candidates, pass)? {
                    Some(t) if guard(&t, "tracked") => State::Locked {
                        target: t,
                        misses: 0,
                    },
                    Some(_) => self.state,
                    None if guard(&c, "candidate") => State::Acquiring { provisional: c },
                    None => self.state,
                },
            },
            State::Locked { target, misses } => {
                match self.follow(frame, &target, &candidates, pass)? {
                    Some(t) if guard(&t, "tracked") => State::Locked {
                        target: t,
                        misses: 0,
                    },
                    Some(_) => self.state,
                    None => {
                        let reacquire = self.params.policy == AcquirePolicy::ContinuousReacquire;
                        match best {
                            Some(c) if reacquire && guard(&c, "candidate") => {
                                State::Acquiring { provisional: c }
                            }
                            _ if misses + 1 > self.params.retry_budget => {
                                log::info!(
                                    "target lost after {} missed frames (frame {})",
                                    misses + 1,
                                    frame.index
                                );
                                State::Idle
                            }
                            _ => State::Locked {
                                target,
                                misses: misses + 1,
                            },
                        }
                    }
                }
            }
        };

        let from = self.state.mode();
        self.state = next;
        let to = self.state.mode();
        let transition = (from != to).then_some(Transition { from, to });
        if let Some(t) = transition {
            log::debug!("frame {}: {:?} -> {:?}", frame.index, t.from, t.to);
        }

        Ok(StepOutcome {
            target: self.snapshot(),
            transition,
            out_of_bounds,
        })
    }

    /// Run the tracking pass and keep only confident, well-formed results.
    fn follow<P: TrackingPass + ?Sized>(
        &self,
        frame: &Frame<'_>,
        seed: &Quad<Normalized>,
        candidates: &[Quad<Normalized>],
        pass: &mut P,
    ) -> Result<Option<Quad<Normalized>>, TrackerError> {
        let tracked = pass.track(TrackRequest {
            frame,
            seed,
            candidates,
        })?;
        Ok(tracked.filter(|q| {
            q.confidence.is_finite()
                && q.confidence >= self.params.min_tracking_confidence
                && !q.is_degenerate(self.params.degeneracy_tolerance)
        }))
    }
}

impl Default for RectangleTracker {
    fn default() -> Self {
        Self::new(TrackerParams::default())
    }
}

/// The quad's bounding box, in frame pixels, lies inside the frame extent.
pub fn within_frame(frame: &Frame<'_>, quad: &Quad<Normalized>) -> bool {
    let bbox = scale_rect(quad.bounding_box(), frame.image.size());
    frame.image.extent().contains_rect(&bbox)
}

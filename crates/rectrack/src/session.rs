//! Per-frame orchestration: tracker, overlay, rectified preview and labels.

use rectrack_core::{Frame, FrameDimensions};
use rectrack_rectify::{PerspectiveRectifier, RectifyParams};
use rectrack_tracker::{
    RectangleDetector, RectangleTracker, TrackedTarget, TrackerError, TrackingPass,
};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::classify::{label_text, Classifier, ClassifyParams};
use crate::io::RectrackConfig;
use crate::overlay::OverlayMapper;
use crate::sink::SinkCommand;

/// What the presentation side shows besides the outline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentationMode {
    #[default]
    OverlayOnly,
    /// Also show the perspective-corrected crop of the target.
    RectifiedPreview,
}

impl PresentationMode {
    pub fn toggled(self) -> Self {
        match self {
            PresentationMode::OverlayOnly => PresentationMode::RectifiedPreview,
            PresentationMode::RectifiedPreview => PresentationMode::OverlayOnly,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error(transparent)]
    Tracker(#[from] TrackerError),
}

/// One tracking session over a stream of frames of fixed dimensions.
///
/// Owns every piece of mutable state of the pipeline. Not shared between
/// threads; see [`FrameWorker`](crate::FrameWorker) for running it off the
/// capture thread.
pub struct Session {
    tracker: RectangleTracker,
    rectifier: PerspectiveRectifier,
    mapper: OverlayMapper,
    classifier: Option<Box<dyn Classifier + Send>>,
    classify: ClassifyParams,
    mode: PresentationMode,
    toggle_mode_on_reset: bool,
    overlay_shown: bool,
}

impl Session {
    /// Build a session for frames of `dims`.
    ///
    /// The overlay and the rectifier read the same normalized quad, so
    /// `config.detector_origin` applies to both; `config.rectify.origin` is
    /// ignored here.
    pub fn new(config: &RectrackConfig, dims: FrameDimensions) -> Self {
        if config.rectify.origin != config.detector_origin {
            log::debug!(
                "rectifier origin {:?} overridden by detector origin {:?}",
                config.rectify.origin,
                config.detector_origin
            );
        }
        let rectify = RectifyParams {
            origin: config.detector_origin,
            ..config.rectify
        };

        Self {
            tracker: RectangleTracker::new(config.tracker.clone()),
            rectifier: PerspectiveRectifier::new(rectify),
            mapper: OverlayMapper::new(
                dims,
                config.capture_orientation,
                config.viewport,
                config.detector_origin,
            ),
            classifier: None,
            classify: config.classify,
            mode: config.mode,
            toggle_mode_on_reset: config.toggle_mode_on_reset,
            overlay_shown: false,
        }
    }

    pub fn with_classifier(mut self, classifier: Box<dyn Classifier + Send>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    #[inline]
    pub fn mode(&self) -> PresentationMode {
        self.mode
    }

    #[inline]
    pub fn target(&self) -> TrackedTarget {
        self.tracker.snapshot()
    }

    #[inline]
    pub fn tracker(&self) -> &RectangleTracker {
        &self.tracker
    }

    #[inline]
    pub fn mapper(&self) -> &OverlayMapper {
        &self.mapper
    }

    #[inline]
    pub fn rectifier(&self) -> &PerspectiveRectifier {
        &self.rectifier
    }

    pub fn set_mode(&mut self, mode: PresentationMode) {
        if mode != self.mode {
            log::debug!("presentation mode {:?} -> {:?}", self.mode, mode);
        }
        self.mode = mode;
    }

    pub fn toggle_mode(&mut self) -> PresentationMode {
        self.set_mode(self.mode.toggled());
        self.mode
    }

    /// Forget the target and clear the display.
    pub fn reset(&mut self) -> Vec<SinkCommand> {
        self.tracker.reset();
        self.overlay_shown = false;
        if self.toggle_mode_on_reset {
            self.toggle_mode();
        }
        vec![SinkCommand::Reset]
    }

    /// Run one frame through the pipeline and return what to display.
    ///
    /// Only tracker collaborator failures are errors. A failed rectification
    /// keeps the previous preview and a failing classifier just produces no
    /// labels.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip_all, fields(frame = frame.index, mode = ?self.mode))
    )]
    pub fn process_frame<D, P>(
        &mut self,
        frame: &Frame<'_>,
        detector: &mut D,
        pass: &mut P,
    ) -> Result<Vec<SinkCommand>, SessionError>
    where
        D: RectangleDetector + ?Sized,
        P: TrackingPass + ?Sized,
    {
        if frame.dimensions() != self.mapper.dims() {
            log::debug!(
                "frame {} is {:?}, session configured for {:?}",
                frame.index,
                frame.dimensions(),
                self.mapper.dims()
            );
        }

        let step = self.tracker.step(frame, detector, pass)?;
        let mut out = Vec::new();

        match step.target.quad {
            Some(quad) => {
                out.push(SinkCommand::DrawOverlay(self.mapper.map(&quad)));
                self.overlay_shown = true;

                if self.mode == PresentationMode::RectifiedPreview {
                    match self.rectifier.rectify(frame, &quad) {
                        Ok(rectified) => out.push(SinkCommand::ShowPreview(rectified.image)),
                        Err(e) => log::warn!("frame {}: rectification skipped: {e}", frame.index),
                    }
                }
            }
            None if self.overlay_shown => {
                out.push(SinkCommand::ClearOverlay);
                self.overlay_shown = false;
            }
            None => {}
        }

        if let Some(classifier) = self.classifier.as_mut() {
            match classifier.classify(frame) {
                Ok(results) => out.push(SinkCommand::Labels(label_text(results, &self.classify))),
                Err(e) => log::warn!("frame {}: classifier unavailable: {e}", frame.index),
            }
        }

        Ok(out)
    }
}

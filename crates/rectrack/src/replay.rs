//! Offline replay of scripted detections.

use std::path::{Path, PathBuf};

use rectrack_core::{Frame, FrameBuffer, FrameDimensions, GrayImage, Normalized, Quad};
use rectrack_tracker::{
    BackendError, CandidateMatchingPass, DetectorConfig, RectangleDetector, TrackingMode,
};
use serde::{Deserialize, Serialize};

use crate::io::{load_json, write_json, RectrackConfig, RectrackIoError};
use crate::overlay::Overlay;
use crate::session::{Session, SessionError};
use crate::sink::SinkCommand;

/// Detector that plays back one candidate list per frame index.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReplayDetector {
    frames: Vec<Vec<Quad<Normalized>>>,
}

impl ReplayDetector {
    pub fn new(frames: Vec<Vec<Quad<Normalized>>>) -> Self {
        Self { frames }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl RectangleDetector for ReplayDetector {
    fn detect(
        &mut self,
        frame: &Frame<'_>,
        _config: &DetectorConfig,
    ) -> Result<Vec<Quad<Normalized>>, BackendError> {
        let idx = usize::try_from(frame.index).unwrap_or(usize::MAX);
        Ok(self.frames.get(idx).cloned().unwrap_or_default())
    }
}

/// One scripted frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayFrame {
    /// Image to load for this frame, relative to the config file. A blank
    /// frame of `frame_size` is used when absent.
    #[serde(default)]
    pub image: Option<PathBuf>,
    #[serde(default)]
    pub candidates: Vec<Quad<Normalized>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReplayConfig {
    pub frame_size: FrameDimensions,
    pub frames: Vec<ReplayFrame>,
    #[serde(default)]
    pub session: RectrackConfig,
    #[serde(default)]
    pub output_path: Option<PathBuf>,
    /// Directory receiving one PNG per rectified preview.
    #[serde(default)]
    pub preview_dir: Option<PathBuf>,
}

impl ReplayConfig {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, RectrackIoError> {
        load_json(path)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), RectrackIoError> {
        write_json(self, path)
    }

    /// Resolve the report path.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("rectrack_replay_report.json"))
    }

    pub fn detector(&self) -> ReplayDetector {
        ReplayDetector::new(self.frames.iter().map(|f| f.candidates.clone()).collect())
    }

    pub fn blank_frame(&self, index: u64) -> FrameBuffer {
        let image = GrayImage::new(
            self.frame_size.width as usize,
            self.frame_size.height as usize,
        );
        FrameBuffer::new(index, image).with_orientation(self.session.capture_orientation)
    }
}

/// What the display showed after one frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub index: u64,
    pub mode: TrackingMode,
    pub quad: Option<Quad<Normalized>>,
    pub overlay: Option<Overlay>,
    pub preview_size: Option<[usize; 2]>,
    pub labels: Option<String>,
    /// The overlay was removed on this frame.
    pub cleared: bool,
    #[serde(skip)]
    pub preview: Option<GrayImage>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayReport {
    pub frames: Vec<FrameRecord>,
    pub locked_frames: usize,
}

/// Run a scripted session over `frames`, using the built-in matching pass.
pub fn run_replay(
    config: &ReplayConfig,
    frames: impl IntoIterator<Item = FrameBuffer>,
) -> Result<ReplayReport, SessionError> {
    let mut session = Session::new(&config.session, config.frame_size);
    let mut detector = config.detector();
    let mut pass = CandidateMatchingPass::default();
    let mut report = ReplayReport::default();

    for buf in frames {
        let frame = buf.as_frame();
        let cmds = session.process_frame(&frame, &mut detector, &mut pass)?;
        let target = session.target();

        let mut record = FrameRecord {
            index: buf.index,
            mode: target.mode,
            quad: target.quad,
            overlay: None,
            preview_size: None,
            labels: None,
            cleared: false,
            preview: None,
        };
        for cmd in cmds {
            match cmd {
                SinkCommand::DrawOverlay(o) => record.overlay = Some(o),
                SinkCommand::ShowPreview(img) => {
                    record.preview_size = Some([img.width, img.height]);
                    record.preview = Some(img);
                }
                SinkCommand::ClearOverlay | SinkCommand::Reset => record.cleared = true,
                SinkCommand::Labels(text) => record.labels = Some(text),
            }
        }
        if record.mode == TrackingMode::Locked {
            report.locked_frames += 1;
        }
        report.frames.push(record);
    }

    log::info!(
        "replayed {} frames, locked on {}",
        report.frames.len(),
        report.locked_frames
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::PresentationMode;
    use rectrack_core::Rect;

    fn script() -> ReplayConfig {
        let doc = Quad::from_rect(Rect::new(0.1, 0.1, 0.5, 0.5), 0.9);
        let mut frames = vec![
            ReplayFrame {
                image: None,
                candidates: vec![doc],
            };
            3
        ];
        frames.push(ReplayFrame::default());
        ReplayConfig {
            frame_size: FrameDimensions::new(64, 48),
            frames,
            session: RectrackConfig {
                mode: PresentationMode::RectifiedPreview,
                ..RectrackConfig::default()
            },
            output_path: None,
            preview_dir: None,
        }
    }

    #[test]
    fn detector_is_indexed_by_frame() {
        let cfg = script();
        let mut det = cfg.detector();
        let late = cfg.blank_frame(10);
        let found = det
            .detect(&late.as_frame(), &DetectorConfig::default())
            .unwrap();
        assert!(found.is_empty());
        let first = cfg.blank_frame(0);
        assert_eq!(
            det.detect(&first.as_frame(), &DetectorConfig::default())
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn replay_reports_modes_and_previews() {
        let cfg = script();
        let frames: Vec<FrameBuffer> = (0..4).map(|i| cfg.blank_frame(i)).collect();
        let report = run_replay(&cfg, frames).unwrap();

        let modes: Vec<TrackingMode> = report.frames.iter().map(|f| f.mode).collect();
        assert_eq!(
            modes,
            vec![
                TrackingMode::Acquiring,
                TrackingMode::Locked,
                TrackingMode::Locked,
                TrackingMode::Locked,
            ]
        );
        assert_eq!(report.locked_frames, 3);
        assert_eq!(report.frames[1].preview_size, Some([32, 24]));
        assert!(report.frames.iter().all(|f| f.overlay.is_some()));
    }

    #[test]
    fn report_serializes_without_pixels() {
        let cfg = script();
        let report = run_replay(&cfg, vec![cfg.blank_frame(0)]).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["frames"][0].get("preview").is_none());
        assert_eq!(json["frames"][0]["mode"], "acquiring");
    }
}

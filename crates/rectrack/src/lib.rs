//! Live rectangle tracking and perspective rectification.
//!
//! This crate ties the pieces together:
//! - re-exports of `rectrack-core`, `rectrack-tracker` and `rectrack-rectify`
//! - [`Session`]: per-frame orchestration of tracker, overlay mapping,
//!   rectified preview and optional classification
//! - [`FrameWorker`]: runs a session on its own thread with drop-on-busy
//!   frame hand-over
//! - JSON configuration ([`RectrackConfig`]) and scripted replay
//! - (feature `image`) conversions from `image::GrayImage`
//!
//! ## Quickstart
//!
//! ```
//! use rectrack::core::{FrameBuffer, GrayImage, Quad, Rect};
//! use rectrack::tracker::CandidateMatchingPass;
//! use rectrack::{ReplayDetector, RectrackConfig, Session, SinkCommand};
//!
//! let doc = Quad::from_rect(Rect::new(0.2, 0.2, 0.6, 0.6), 0.9);
//! let frame = FrameBuffer::new(0, GrayImage::new(64, 48));
//! let mut detector = ReplayDetector::new(vec![vec![doc]]);
//! let mut pass = CandidateMatchingPass::default();
//!
//! let mut session = Session::new(&RectrackConfig::default(), frame.as_frame().dimensions());
//! let cmds = session
//!     .process_frame(&frame.as_frame(), &mut detector, &mut pass)
//!     .unwrap();
//! assert!(matches!(cmds[0], SinkCommand::DrawOverlay(_)));
//! ```

pub use rectrack_core as core;
pub use rectrack_rectify as rectify;
pub use rectrack_tracker as tracker;

mod classify;
mod io;
mod overlay;
mod replay;
mod session;
mod sink;
mod worker;

#[cfg(feature = "image")]
pub mod imaging;

pub use classify::{label_text, Classification, Classifier, ClassifyParams};
pub use io::{load_json, write_json, RectrackConfig, RectrackIoError};
pub use overlay::{Overlay, OverlayMapper};
pub use replay::{run_replay, FrameRecord, ReplayConfig, ReplayDetector, ReplayFrame, ReplayReport};
pub use session::{PresentationMode, Session, SessionError};
pub use sink::{SinkCommand, SinkState};
pub use worker::{ControlMessage, FrameWorker, SubmitOutcome};

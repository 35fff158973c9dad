use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use rectrack::core::{Frame, FrameBuffer, GrayImage, Normalized, Quad, Rect};
use rectrack::tracker::{
    BackendError, CandidateMatchingPass, DetectorConfig, RectangleDetector, TrackingMode,
};
use rectrack::{
    ControlMessage, FrameWorker, PresentationMode, RectrackConfig, ReplayDetector, Session,
    SinkCommand, SinkState, SubmitOutcome,
};

const TIMEOUT: Duration = Duration::from_secs(5);

fn doc() -> Quad<Normalized> {
    Quad::from_rect(Rect::new(0.2, 0.2, 0.5, 0.5), 0.9)
}

fn frame(index: u64) -> FrameBuffer {
    FrameBuffer::new(index, GrayImage::new(64, 48))
}

fn session() -> Session {
    Session::new(&RectrackConfig::default(), frame(0).as_frame().dimensions())
}

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Retry until the worker is idle and takes the frame.
fn submit_when_idle(worker: &FrameWorker, index: u64) {
    let deadline = Instant::now() + TIMEOUT;
    loop {
        match worker.submit(frame(index)) {
            SubmitOutcome::Accepted => return,
            SubmitOutcome::Dropped => {
                assert!(Instant::now() < deadline, "worker never became idle");
                thread::sleep(Duration::from_millis(1));
            }
            SubmitOutcome::Closed => panic!("worker closed"),
        }
    }
}

/// Blocks inside detection until released.
struct Gated {
    gate: Receiver<()>,
}

impl RectangleDetector for Gated {
    fn detect(
        &mut self,
        _frame: &Frame<'_>,
        _config: &DetectorConfig,
    ) -> Result<Vec<Quad<Normalized>>, BackendError> {
        let _ = self.gate.recv_timeout(TIMEOUT);
        Ok(vec![doc()])
    }
}

#[test]
fn busy_worker_drops_frames_without_blocking() {
    init_logs();
    let (sink_tx, sink_rx) = mpsc::channel();
    let (gate_tx, gate_rx) = mpsc::channel();
    let worker = FrameWorker::spawn(
        session(),
        Gated { gate: gate_rx },
        CandidateMatchingPass::default(),
        sink_tx,
    )
    .unwrap();

    submit_when_idle(&worker, 0);
    // frame 0 is parked in detection
    let start = Instant::now();
    assert_eq!(worker.submit(frame(1)), SubmitOutcome::Dropped);
    assert_eq!(worker.submit(frame(2)), SubmitOutcome::Dropped);
    assert!(start.elapsed() < Duration::from_secs(1));

    gate_tx.send(()).unwrap();
    let cmd = sink_rx.recv_timeout(TIMEOUT).unwrap();
    assert!(matches!(cmd, SinkCommand::DrawOverlay(_)));

    let session = worker.shutdown().unwrap();
    assert_eq!(session.target().mode, TrackingMode::Acquiring);
}

#[test]
fn reset_clears_display_and_restarts_tracking() {
    init_logs();
    let (sink_tx, sink_rx) = mpsc::channel();
    let detector = ReplayDetector::new(vec![vec![doc()]; 3]);
    let worker =
        FrameWorker::spawn(session(), detector, CandidateMatchingPass::default(), sink_tx).unwrap();

    submit_when_idle(&worker, 0);
    submit_when_idle(&worker, 1);
    // frame 1 may still be in flight; the reset lands between it and frame 2
    assert!(worker.reset());
    submit_when_idle(&worker, 2);

    let session = worker.shutdown().unwrap();
    assert_eq!(session.target().mode, TrackingMode::Acquiring);

    let cmds: Vec<SinkCommand> = sink_rx.try_iter().collect();
    let resets = cmds.iter().filter(|c| **c == SinkCommand::Reset).count();
    assert_eq!(resets, 2);
    assert!(matches!(cmds.last(), Some(SinkCommand::DrawOverlay(_))));

    let mut display = SinkState::default();
    display.apply_all(cmds);
    assert!(display.overlay.is_some());
}

#[test]
fn reset_during_inflight_frame_discards_its_output() {
    init_logs();
    let (sink_tx, sink_rx) = mpsc::channel();
    let (gate_tx, gate_rx) = mpsc::channel();
    let worker = FrameWorker::spawn(
        session(),
        Gated { gate: gate_rx },
        CandidateMatchingPass::default(),
        sink_tx,
    )
    .unwrap();

    submit_when_idle(&worker, 0);
    // frame 0 is parked in detection
    assert!(worker.reset());
    gate_tx.send(()).unwrap();

    let session = worker.shutdown().unwrap();
    assert_eq!(session.target().mode, TrackingMode::Idle);

    let cmds: Vec<SinkCommand> = sink_rx.try_iter().collect();
    assert_eq!(cmds.first(), Some(&SinkCommand::Reset));
    assert!(!cmds
        .iter()
        .any(|c| matches!(c, SinkCommand::DrawOverlay(_) | SinkCommand::ShowPreview(_))));

    let mut display = SinkState::default();
    display.apply_all(cmds);
    assert!(display.is_clear());
}

#[test]
fn control_sent_during_a_frame_waits_for_the_next_one() {
    init_logs();
    let (sink_tx, sink_rx) = mpsc::channel();
    let (gate_tx, gate_rx) = mpsc::channel();
    let worker = FrameWorker::spawn(
        session(),
        Gated { gate: gate_rx },
        CandidateMatchingPass::default(),
        sink_tx,
    )
    .unwrap();

    submit_when_idle(&worker, 0);
    assert!(worker.send(ControlMessage::SetMode(PresentationMode::RectifiedPreview)));
    gate_tx.send(()).unwrap();
    assert!(matches!(
        sink_rx.recv_timeout(TIMEOUT).unwrap(),
        SinkCommand::DrawOverlay(_)
    ));

    gate_tx.send(()).unwrap();
    submit_when_idle(&worker, 1);
    let session = worker.shutdown().unwrap();
    assert_eq!(session.mode(), PresentationMode::RectifiedPreview);

    // frame 0 ran in overlay-only mode, frame 1 with the preview
    let rest: Vec<SinkCommand> = sink_rx.try_iter().collect();
    assert!(matches!(rest.first(), Some(SinkCommand::DrawOverlay(_))));
    assert!(rest.iter().any(|c| matches!(c, SinkCommand::ShowPreview(_))));
}

#[test]
fn control_messages_apply_before_next_frame() {
    let (sink_tx, sink_rx) = mpsc::channel();
    let detector = ReplayDetector::new(vec![vec![doc()]; 2]);
    let worker =
        FrameWorker::spawn(session(), detector, CandidateMatchingPass::default(), sink_tx).unwrap();

    assert!(worker.send(ControlMessage::SetMode(PresentationMode::RectifiedPreview)));
    submit_when_idle(&worker, 0);

    let deadline = Instant::now() + TIMEOUT;
    loop {
        let cmd = sink_rx.recv_timeout(TIMEOUT).unwrap();
        if matches!(cmd, SinkCommand::ShowPreview(_)) {
            break;
        }
        assert!(Instant::now() < deadline, "no preview received");
    }

    assert!(worker.send(ControlMessage::ToggleMode));
    let session = worker.shutdown().unwrap();
    // pending control messages are applied before the thread exits
    assert_eq!(session.mode(), PresentationMode::OverlayOnly);
}

struct Flaky;

impl RectangleDetector for Flaky {
    fn detect(
        &mut self,
        frame: &Frame<'_>,
        _config: &DetectorConfig,
    ) -> Result<Vec<Quad<Normalized>>, BackendError> {
        match frame.index {
            0 => panic!("detector crashed"),
            1 => Err(BackendError::Detection("no buffer".into())),
            _ => Ok(vec![doc()]),
        }
    }
}

#[test]
fn failing_frames_are_skipped() {
    init_logs();
    let (sink_tx, sink_rx) = mpsc::channel();
    let worker =
        FrameWorker::spawn(session(), Flaky, CandidateMatchingPass::default(), sink_tx).unwrap();

    for i in 0..3 {
        submit_when_idle(&worker, i);
    }
    let session = worker.shutdown().unwrap();
    assert_eq!(session.target().mode, TrackingMode::Acquiring);
    assert_eq!(sink_rx.try_iter().count(), 1);
}

#[test]
fn idle_worker_shuts_down_cleanly() {
    let (sink_tx, sink_rx) = mpsc::channel();
    let worker = FrameWorker::spawn(
        session(),
        ReplayDetector::default(),
        CandidateMatchingPass::default(),
        sink_tx,
    )
    .unwrap();

    let session = worker.shutdown().unwrap();
    assert_eq!(session.target().mode, TrackingMode::Idle);
    // every sender is gone once the handle and thread are
    assert!(sink_rx.recv_timeout(TIMEOUT).is_err());
}

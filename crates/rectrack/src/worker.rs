//! Background frame processing.
//!
//! One dedicated thread owns the [`Session`] and its collaborators. The
//! capture side hands frames over without ever blocking: a frame is only
//! accepted while the worker is idle and waiting, anything arriving during
//! processing is dropped. Sink commands go out fire-and-forget.
//!
//! Frames and control messages share one sequence counter. A control message
//! applies before every frame submitted after it and after every frame
//! submitted before it, whatever order the two channels are drained in. A
//! reset also invalidates the frame in flight: its commands are discarded so
//! nothing drawn for the old target reaches the sink after the reset.

use std::collections::VecDeque;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, SyncSender, TrySendError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use rectrack_core::FrameBuffer;
use rectrack_tracker::{RectangleDetector, TrackingPass};

use crate::session::{PresentationMode, Session};
use crate::sink::SinkCommand;

/// User-originated control signals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlMessage {
    Reset,
    SetMode(PresentationMode),
    ToggleMode,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The worker took the frame.
    Accepted,
    /// The worker was busy; the frame was discarded.
    Dropped,
    /// The worker has stopped.
    Closed,
}

/// Ordering state shared by the handle and the worker thread.
#[derive(Default)]
struct Shared {
    /// Bumped by every control message; frames carry the value current at
    /// submission.
    seq: AtomicU64,
    /// Sequence number of the latest reset. Held while talking to the sink so
    /// a reset and a frame's commands never interleave.
    reset_at: Mutex<u64>,
}

impl Shared {
    fn reset_guard(&self) -> MutexGuard<'_, u64> {
        self.reset_at.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }
}

struct Stamped<T> {
    seq: u64,
    item: T,
}

/// Handle to the processing thread. Dropping it stops the thread.
pub struct FrameWorker {
    frames: Option<SyncSender<Stamped<FrameBuffer>>>,
    control: Sender<Stamped<ControlMessage>>,
    sink: Sender<SinkCommand>,
    shared: Arc<Shared>,
    handle: Option<JoinHandle<Session>>,
}

impl FrameWorker {
    pub fn spawn<D, P>(
        session: Session,
        detector: D,
        pass: P,
        sink: Sender<SinkCommand>,
    ) -> io::Result<Self>
    where
        D: RectangleDetector + Send + 'static,
        P: TrackingPass + Send + 'static,
    {
        let (frame_tx, frame_rx) = mpsc::sync_channel(0);
        let (control_tx, control_rx) = mpsc::channel();
        let shared = Arc::new(Shared::default());

        let worker = Worker {
            session,
            sink: sink.clone(),
            shared: Arc::clone(&shared),
            pending: VecDeque::new(),
        };
        let handle = thread::Builder::new()
            .name("rectrack-worker".into())
            .spawn(move || worker.run(detector, pass, frame_rx, control_rx))?;

        Ok(Self {
            frames: Some(frame_tx),
            control: control_tx,
            sink,
            shared,
            handle: Some(handle),
        })
    }

    /// Offer a frame without blocking.
    pub fn submit(&self, frame: FrameBuffer) -> SubmitOutcome {
        let Some(frames) = self.frames.as_ref() else {
            return SubmitOutcome::Closed;
        };
        let stamped = Stamped {
            seq: self.shared.seq.load(Ordering::SeqCst),
            item: frame,
        };
        match frames.try_send(stamped) {
            Ok(()) => SubmitOutcome::Accepted,
            Err(TrySendError::Full(f)) => {
                log::trace!("worker busy, dropping frame {}", f.item.index);
                SubmitOutcome::Dropped
            }
            Err(TrySendError::Disconnected(_)) => SubmitOutcome::Closed,
        }
    }

    /// Queue a control message. It takes effect before any frame submitted
    /// from now on. `ControlMessage::Reset` behaves like [`FrameWorker::reset`].
    pub fn send(&self, msg: ControlMessage) -> bool {
        if msg == ControlMessage::Reset {
            return self.reset();
        }
        let seq = self.shared.next_seq();
        self.control.send(Stamped { seq, item: msg }).is_ok()
    }

    /// Clear the display right away and reset the session.
    ///
    /// Commands of a frame still being processed are discarded. Returns
    /// `false` once the worker has stopped.
    pub fn reset(&self) -> bool {
        let mut reset_at = self.shared.reset_guard();
        let seq = self.shared.next_seq();
        *reset_at = seq;
        if self.sink.send(SinkCommand::Reset).is_err() {
            log::debug!("sink closed before reset");
        }
        let queued = self
            .control
            .send(Stamped {
                seq,
                item: ControlMessage::Reset,
            })
            .is_ok();
        if !queued {
            log::debug!("worker stopped before reset");
        }
        queued
    }

    /// Stop the thread and hand the session back. `None` if the worker
    /// thread panicked outside frame processing.
    pub fn shutdown(mut self) -> Option<Session> {
        self.stop()
    }

    fn stop(&mut self) -> Option<Session> {
        self.frames.take();
        let handle = self.handle.take()?;
        match handle.join() {
            Ok(session) => Some(session),
            Err(_) => {
                log::error!("frame worker thread panicked");
                None
            }
        }
    }
}

impl Drop for FrameWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

struct Worker {
    session: Session,
    sink: Sender<SinkCommand>,
    shared: Arc<Shared>,
    pending: VecDeque<Stamped<ControlMessage>>,
}

impl Worker {
    fn run<D, P>(
        mut self,
        mut detector: D,
        mut pass: P,
        frames: Receiver<Stamped<FrameBuffer>>,
        control: Receiver<Stamped<ControlMessage>>,
    ) -> Session
    where
        D: RectangleDetector,
        P: TrackingPass,
    {
        log::debug!("frame worker started");

        while let Ok(Stamped { seq, item: buf }) = frames.recv() {
            self.collect(&control);
            self.apply_pending(seq);

            if seq < *self.shared.reset_guard() {
                log::debug!("frame {} predates a reset, skipped", buf.index);
                continue;
            }

            let frame = buf.as_frame();
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                self.session.process_frame(&frame, &mut detector, &mut pass)
            }));

            match result {
                Ok(Ok(cmds)) => {
                    let reset_at = self.shared.reset_guard();
                    if seq < *reset_at {
                        drop(reset_at);
                        log::debug!("frame {} overtaken by a reset, output dropped", buf.index);
                        self.collect(&control);
                        self.apply_pending(u64::MAX);
                        continue;
                    }
                    for cmd in cmds {
                        // Receiver gone means nobody is watching; keep tracking.
                        let _ = self.sink.send(cmd);
                    }
                }
                Ok(Err(e)) => log::error!("frame {} skipped: {e}", buf.index),
                Err(_) => log::error!("frame {} skipped: panic during processing", buf.index),
            }
        }

        self.collect(&control);
        self.apply_pending(u64::MAX);
        log::debug!("frame worker stopped");
        self.session
    }

    /// Move arrived control messages into `pending`, ordered by stamp.
    fn collect(&mut self, control: &Receiver<Stamped<ControlMessage>>) {
        let before = self.pending.len();
        self.pending.extend(control.try_iter());
        if self.pending.len() > before {
            self.pending.make_contiguous().sort_by_key(|m| m.seq);
        }
    }

    /// Apply queued control messages stamped at or before `upto`, in order.
    fn apply_pending(&mut self, upto: u64) {
        while self.pending.front().is_some_and(|m| m.seq <= upto) {
            if let Some(Stamped { item, .. }) = self.pending.pop_front() {
                self.apply(item);
            }
        }
    }

    fn apply(&mut self, msg: ControlMessage) {
        log::debug!("control: {msg:?}");
        match msg {
            ControlMessage::Reset => {
                for cmd in self.session.reset() {
                    let _ = self.sink.send(cmd);
                }
            }
            ControlMessage::SetMode(mode) => self.session.set_mode(mode),
            ControlMessage::ToggleMode => {
                self.session.toggle_mode();
            }
        }
    }
}

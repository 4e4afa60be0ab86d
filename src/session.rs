//! Scan session
//!
//! Runs frame analysis on a dedicated worker thread. The camera side hands
//! frames to `ScanSession::offer`; the UI side reads decoded text from the
//! receiver returned by `ScanSession::start`.
//!
//! Backpressure is a single pending-frame slot. While the worker is busy a
//! newly offered frame replaces whatever was waiting, so at most one frame
//! is queued and at most one decode is in flight. When the worker frees up
//! it always picks the newest frame.

use crate::decoder::Decoder;
use crate::error::{QrError, Result};
use crate::models::LuminanceFrame;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// Per-frame analysis run on the session worker
pub trait FrameAnalyzer: Send + 'static {
    /// Inspect one frame and return decoded text, if any
    fn analyze(&mut self, frame: &LuminanceFrame) -> Option<String>;
}

impl FrameAnalyzer for Decoder {
    fn analyze(&mut self, frame: &LuminanceFrame) -> Option<String> {
        self.decode(frame)
    }
}

impl<F> FrameAnalyzer for F
where
    F: FnMut(&LuminanceFrame) -> Option<String> + Send + 'static,
{
    fn analyze(&mut self, frame: &LuminanceFrame) -> Option<String> {
        self(frame)
    }
}

/// Session statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Frames offered by the camera
    pub frames_received: u64,
    /// Frames the worker actually analysed
    pub frames_analyzed: u64,
    /// Frames replaced in the slot before the worker reached them
    pub frames_dropped: u64,
    /// Analyses that produced non-empty text
    pub codes_found: u64,
}

#[derive(Default)]
struct SessionStatsInner {
    frames_received: AtomicU64,
    frames_analyzed: AtomicU64,
    frames_dropped: AtomicU64,
    codes_found: AtomicU64,
}

impl SessionStatsInner {
    fn to_stats(&self) -> SessionStats {
        SessionStats {
            frames_received: self.frames_received.load(Ordering::Relaxed),
            frames_analyzed: self.frames_analyzed.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            codes_found: self.codes_found.load(Ordering::Relaxed),
        }
    }
}

#[derive(Default)]
struct Slot {
    pending: Option<LuminanceFrame>,
    closed: bool,
}

struct Shared {
    slot: Mutex<Slot>,
    ready: Condvar,
    stats: SessionStatsInner,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Slot> {
        // A panicking analyzer must not wedge the camera side.
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Mark the slot closed, discarding any frame still waiting
    fn close(&self) {
        let mut slot = self.lock();
        slot.closed = true;
        if slot.pending.take().is_some() {
            self.stats.frames_dropped.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Handle to a running scan worker. Dropping it tears the worker down.
pub struct ScanSession {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl ScanSession {
    /// Start a worker using the default decoder
    pub fn start() -> Result<(Self, Receiver<String>)> {
        Self::with_analyzer(Decoder::default())
    }

    /// Start a worker running `analyzer` on each frame it picks up
    pub fn with_analyzer<A: FrameAnalyzer>(analyzer: A) -> Result<(Self, Receiver<String>)> {
        let shared = Arc::new(Shared {
            slot: Mutex::new(Slot::default()),
            ready: Condvar::new(),
            stats: SessionStatsInner::default(),
        });
        let (tx, rx) = mpsc::channel();

        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name("qr-scan".into())
            .spawn(move || run_worker(worker_shared, analyzer, tx))?;

        info!("scan session started");
        Ok((
            Self {
                shared,
                worker: Some(worker),
            },
            rx,
        ))
    }

    /// Hand a frame to the worker, replacing any frame still waiting.
    ///
    /// Fails with `SessionClosed` once the session is stopped. Dropping the
    /// result receiver closes the session too, but only after the worker
    /// next tries to deliver a decoded value.
    pub fn offer(&self, frame: LuminanceFrame) -> Result<()> {
        let mut slot = self.shared.lock();
        if slot.closed {
            return Err(QrError::SessionClosed);
        }
        self.shared.stats.frames_received.fetch_add(1, Ordering::Relaxed);
        if slot.pending.replace(frame).is_some() {
            self.shared.stats.frames_dropped.fetch_add(1, Ordering::Relaxed);
        }
        drop(slot);
        self.shared.ready.notify_one();
        Ok(())
    }

    /// Whether the session still accepts frames
    pub fn is_running(&self) -> bool {
        !self.shared.lock().closed
    }

    /// Current statistics
    pub fn stats(&self) -> SessionStats {
        self.shared.stats.to_stats()
    }

    /// Stop accepting frames and wait for the worker to finish its
    /// current frame. A frame still waiting in the slot is discarded and
    /// counted as dropped.
    pub fn stop(&mut self) {
        self.shared.close();
        self.shared.ready.notify_all();

        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("scan worker panicked");
            }
            let stats = self.stats();
            info!(
                "scan session stopped: received={}, analyzed={}, dropped={}, found={}",
                stats.frames_received, stats.frames_analyzed, stats.frames_dropped, stats.codes_found
            );
        }
    }
}

impl Drop for ScanSession {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_worker<A: FrameAnalyzer>(shared: Arc<Shared>, mut analyzer: A, results: Sender<String>) {
    loop {
        let frame = {
            let mut slot = shared.lock();
            loop {
                if slot.closed {
                    return;
                }
                if let Some(frame) = slot.pending.take() {
                    break frame;
                }
                slot = shared.ready.wait(slot).unwrap_or_else(|poisoned| poisoned.into_inner());
            }
        };

        let outcome = analyzer.analyze(&frame);
        shared.stats.frames_analyzed.fetch_add(1, Ordering::Relaxed);
        drop(frame);

        let Some(text) = outcome.filter(|t| !t.is_empty()) else {
            continue;
        };
        shared.stats.codes_found.fetch_add(1, Ordering::Relaxed);
        debug!("frame decoded, {} chars", text.len());

        if results.send(text).is_err() {
            debug!("result receiver dropped, closing scan session");
            shared.close();
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn tagged(tag: usize) -> LuminanceFrame {
        // Width doubles as a frame id
        LuminanceFrame::new(tag, 1, vec![0; tag])
    }

    #[test]
    fn results_reach_the_receiver() {
        let (mut session, rx) =
            ScanSession::with_analyzer(|f: &LuminanceFrame| Some(format!("frame-{}", f.width()))).unwrap();
        session.offer(tagged(7)).unwrap();
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), "frame-7");
        session.stop();
        assert_eq!(session.stats().codes_found, 1);
    }

    #[test]
    fn empty_results_are_not_forwarded() {
        let (mut session, rx) = ScanSession::with_analyzer(|_: &LuminanceFrame| Some(String::new())).unwrap();
        session.offer(tagged(1)).unwrap();
        session.offer(tagged(2)).unwrap();
        session.stop();
        assert!(rx.try_recv().is_err());
        assert_eq!(session.stats().codes_found, 0);
    }

    #[test]
    fn frames_offered_during_analysis_collapse_to_latest() {
        let (started_tx, started_rx) = mpsc::channel::<usize>();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let analyzer = move |f: &LuminanceFrame| {
            started_tx.send(f.width()).ok();
            release_rx.recv().ok();
            None::<String>
        };
        let (mut session, _rx) = ScanSession::with_analyzer(analyzer).unwrap();

        session.offer(tagged(1)).unwrap();
        let timeout = Duration::from_secs(5);
        assert_eq!(started_rx.recv_timeout(timeout).unwrap(), 1);

        // Worker is blocked on frame 1; these pile into the single slot.
        session.offer(tagged(2)).unwrap();
        session.offer(tagged(3)).unwrap();
        session.offer(tagged(4)).unwrap();

        release_tx.send(()).unwrap();
        assert_eq!(started_rx.recv_timeout(timeout).unwrap(), 4);
        release_tx.send(()).unwrap();

        session.stop();
        assert!(started_rx.try_recv().is_err());

        let stats = session.stats();
        assert_eq!(stats.frames_received, 4);
        assert_eq!(stats.frames_dropped, 2);
        assert_eq!(stats.frames_analyzed, 2);
    }

    #[test]
    fn frame_discarded_at_stop_is_counted() {
        let (started_tx, started_rx) = mpsc::channel::<usize>();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let analyzer = move |f: &LuminanceFrame| {
            started_tx.send(f.width()).ok();
            release_rx.recv().ok();
            None::<String>
        };
        let (mut session, _rx) = ScanSession::with_analyzer(analyzer).unwrap();

        session.offer(tagged(1)).unwrap();
        assert_eq!(started_rx.recv_timeout(Duration::from_secs(5)).unwrap(), 1);
        session.offer(tagged(2)).unwrap();

        // Unblock the worker a little after stop has begun; frame 2 is
        // either discarded by stop or analyzed, never lost from the counts.
        let releaser = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            release_tx.send(()).ok();
            release_tx.send(()).ok();
        });
        session.stop();
        releaser.join().unwrap();

        let stats = session.stats();
        assert_eq!(stats.frames_received, 2);
        assert_eq!(stats.frames_analyzed + stats.frames_dropped, stats.frames_received);
    }

    #[test]
    fn stopped_session_rejects_frames() {
        let (mut session, _rx) = ScanSession::start().unwrap();
        assert!(session.is_running());
        session.stop();
        assert!(!session.is_running());
        assert!(matches!(session.offer(tagged(3)), Err(QrError::SessionClosed)));
        // Second stop is a no-op
        session.stop();
    }

    #[test]
    fn dropping_receiver_closes_session() {
        let (session, rx) = ScanSession::with_analyzer(|_: &LuminanceFrame| Some("x".to_string())).unwrap();
        drop(rx);
        session.offer(tagged(1)).unwrap();
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while session.is_running() && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(!session.is_running());
    }
}

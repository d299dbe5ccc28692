//! Off-thread processing with "last request wins" delivery.
//!
//! [`channel`] returns the two halves: a [`Processor`] that submits
//! pipeline runs onto the rayon pool, and [`Completions`] that receives
//! their outcomes as [`ProcessEvent`]s over a `std::sync::mpsc` channel.
//!
//! Every submission gets a fresh [`RequestId`]. Only the newest one is ever
//! surfaced: a run that is superseded before it starts is skipped, a result
//! that is superseded while computing is dropped by the worker, and
//! [`Completions`] filters whatever still slips through. In-flight work is
//! never aborted.
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use photo_resizer::buffer::{PixelBuffer, SourceImage};
//! # use photo_resizer::imaging::ProcessingParams;
//! # use photo_resizer::worker::{self, ProcessEvent};
//! let source = Arc::new(SourceImage::new(PixelBuffer::new(640, 480)?));
//! let (processor, completions) = worker::channel();
//!
//! processor.submit(Arc::clone(&source), ProcessingParams::for_source(320, 240));
//! processor.submit(Arc::clone(&source), ProcessingParams::for_source(160, 120));
//!
//! // Only the 160x120 run is ever reported.
//! if let Some(ProcessEvent::Finished { result, .. }) = completions.recv_latest() {
//!     assert_eq!(result.width(), 160);
//! }
//! # Ok::<(), photo_resizer::imaging::ImagingError>(())
//! ```

use crate::buffer::SourceImage;
use crate::imaging::{ImagingError, ProcessedResult, ProcessingParams, process};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

/// Monotonically increasing id of a submitted request. The first is 1.
pub type RequestId = u64;

/// Outcome of one off-thread pipeline run.
#[derive(Debug)]
pub enum ProcessEvent {
    Finished {
        request: RequestId,
        result: ProcessedResult,
        elapsed: Duration,
    },
    Failed {
        request: RequestId,
        error: ImagingError,
    },
}

impl ProcessEvent {
    pub fn request(&self) -> RequestId {
        match self {
            ProcessEvent::Finished { request, .. } | ProcessEvent::Failed { request, .. } => {
                *request
            }
        }
    }
}

/// Create a connected submit/receive pair.
pub fn channel() -> (Processor, Completions) {
    let latest = Arc::new(AtomicU64::new(0));
    let (tx, rx) = mpsc::channel();
    (
        Processor {
            latest: Arc::clone(&latest),
            tx,
        },
        Completions { latest, rx },
    )
}

/// Submit side. Cheap to clone; all clones share one request counter.
#[derive(Debug, Clone)]
pub struct Processor {
    latest: Arc<AtomicU64>,
    tx: Sender<ProcessEvent>,
}

impl Processor {
    /// Queue a pipeline run and return immediately.
    ///
    /// The new request supersedes every earlier one.
    pub fn submit(&self, source: Arc<SourceImage>, params: ProcessingParams) -> RequestId {
        let request = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let latest = Arc::clone(&self.latest);
        let tx = self.tx.clone();

        rayon::spawn(move || {
            if latest.load(Ordering::SeqCst) != request {
                log::debug!("request {request} superseded before start, skipping");
                return;
            }

            let started = Instant::now();
            let event = match process(&source, &params) {
                Ok(result) => ProcessEvent::Finished {
                    request,
                    result,
                    elapsed: started.elapsed(),
                },
                Err(error) => ProcessEvent::Failed { request, error },
            };

            if latest.load(Ordering::SeqCst) != request {
                log::debug!("request {request} superseded, discarding result");
                return;
            }
            match &event {
                ProcessEvent::Finished {
                    result, elapsed, ..
                } => log::info!(
                    "request {request}: {}x{} in {:.1?}",
                    result.width(),
                    result.height(),
                    elapsed
                ),
                ProcessEvent::Failed { error, .. } => {
                    log::warn!("request {request} failed: {error}")
                }
            }
            // Receiver gone means nobody is waiting any more.
            let _ = tx.send(event);
        });

        log::debug!("submitted request {request}");
        request
    }

    /// Id of the newest submitted request, if any.
    pub fn latest(&self) -> Option<RequestId> {
        match self.latest.load(Ordering::SeqCst) {
            0 => None,
            id => Some(id),
        }
    }
}

/// Receive side. Only ever yields the event for the newest request.
#[derive(Debug)]
pub struct Completions {
    latest: Arc<AtomicU64>,
    rx: Receiver<ProcessEvent>,
}

impl Completions {
    /// Block until the newest request completes.
    ///
    /// Returns `None` once every [`Processor`] and in-flight run is gone.
    /// Blocks indefinitely while a `Processor` is alive and nothing is
    /// outstanding.
    pub fn recv_latest(&self) -> Option<ProcessEvent> {
        loop {
            let event = self.rx.recv().ok()?;
            if self.is_current(&event) {
                return Some(event);
            }
        }
    }

    /// Like [`recv_latest`](Self::recv_latest), giving up after `timeout`.
    pub fn recv_latest_timeout(&self, timeout: Duration) -> Option<ProcessEvent> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(event) if self.is_current(&event) => return Some(event),
                Ok(_) => continue,
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    /// Drain everything already delivered and return the newest request's
    /// event, if it is among them. Never blocks.
    pub fn try_recv_latest(&self) -> Option<ProcessEvent> {
        let mut current = None;
        while let Ok(event) = self.rx.try_recv() {
            if self.is_current(&event) {
                current = Some(event);
            }
        }
        current
    }

    fn is_current(&self, event: &ProcessEvent) -> bool {
        let latest = self.latest.load(Ordering::SeqCst);
        if event.request() == latest {
            true
        } else {
            log::debug!(
                "dropping stale result for request {} (latest {latest})",
                event.request()
            );
            false
        }
    }
}

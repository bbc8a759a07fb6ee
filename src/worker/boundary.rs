use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::decoder::engine::{SymbolDecoder, panic_message};
use crate::error::ScanError;
use crate::models::{DecodeOutcome, PixelFrame};

use super::protocol::{WorkerRequest, WorkerResponse};

const WORKER_THREAD_NAME: &str = "qr-decode-worker";

/// Result of handing a frame to the worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submit {
    /// The worker took the frame
    Accepted,
    /// A previous frame is still decoding; this one was dropped
    Busy,
    /// The worker has been shut down
    Closed,
}

/// Worker reply to one numbered request; `None` is a silent decode
struct Reply {
    seq: u64,
    response: Option<WorkerResponse>,
}

/// Handle to a decode thread
///
/// At most one request is in flight: `submit` refuses new frames until the
/// previous one is completed. Requests are numbered. A request counts as
/// completed once its reply is queued or once the handle has taken that reply,
/// whichever is seen first, so an idle handle never has a reply still on the
/// way and a taken reply always leaves the handle idle.
///
/// The thread is stopped and joined by [`close`](Self::close) or on drop,
/// whichever comes first.
pub struct DecodeWorker {
    requests: Option<Sender<(u64, WorkerRequest)>>,
    replies: Receiver<Reply>,
    /// Number of the last accepted request
    submitted: AtomicU64,
    /// Number of the last request whose reply is queued or taken
    completed: Arc<AtomicU64>,
    /// Number of the last reply taken off the channel
    received: AtomicU64,
    handle: Option<JoinHandle<()>>,
}

impl DecodeWorker {
    /// Start a worker thread that owns `decoder`
    pub fn spawn<D>(decoder: D) -> Result<Self, ScanError>
    where
        D: SymbolDecoder + 'static,
    {
        let (request_tx, request_rx) = mpsc::channel();
        let (reply_tx, reply_rx) = mpsc::channel();
        let completed = Arc::new(AtomicU64::new(0));
        let worker_completed = Arc::clone(&completed);

        let handle = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || run_worker(decoder, request_rx, reply_tx, worker_completed))
            .map_err(ScanError::WorkerSpawn)?;

        tracing::debug!("decode worker started");
        Ok(Self {
            requests: Some(request_tx),
            replies: reply_rx,
            submitted: AtomicU64::new(0),
            completed,
            received: AtomicU64::new(0),
            handle: Some(handle),
        })
    }

    /// Hand a frame to the worker without waiting
    pub fn submit(&self, frame: PixelFrame) -> Submit {
        self.submit_request(WorkerRequest::decode_image(frame))
    }

    /// Hand a raw protocol message to the worker without waiting
    pub fn submit_request(&self, request: WorkerRequest) -> Submit {
        let Some(requests) = &self.requests else {
            return Submit::Closed;
        };
        let done = self.completed.load(Ordering::Acquire);
        if self
            .submitted
            .compare_exchange(done, done + 1, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Submit::Busy;
        }
        match requests.send((done + 1, request)) {
            Ok(()) => Submit::Accepted,
            Err(_) => {
                self.submitted.store(done, Ordering::Release);
                Submit::Closed
            }
        }
    }

    /// Whether a submitted frame is still being decoded
    pub fn is_busy(&self) -> bool {
        self.submitted.load(Ordering::Acquire) != self.completed.load(Ordering::Acquire)
    }

    /// Whether [`close`](Self::close) has run
    pub fn is_closed(&self) -> bool {
        self.requests.is_none()
    }

    /// Next response, if one is already waiting
    pub fn try_recv(&self) -> Option<WorkerResponse> {
        while let Ok(reply) = self.replies.try_recv() {
            if let Some(response) = self.take(reply) {
                return Some(response);
            }
        }
        None
    }

    /// Wait up to `timeout` for a response
    ///
    /// Returns `None` once the reply to the latest request has been taken and
    /// carried nothing, which is how a not-found decode shows up, or when the
    /// timeout runs out first.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<WorkerResponse> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(response) = self.try_recv() {
                return Some(response);
            }
            if self.received.load(Ordering::Acquire) == self.submitted.load(Ordering::Acquire) {
                return None;
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            match self.replies.recv_timeout(deadline - now) {
                Ok(reply) => {
                    if let Some(response) = self.take(reply) {
                        return Some(response);
                    }
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return None;
                }
            }
        }
    }

    fn take(&self, reply: Reply) -> Option<WorkerResponse> {
        self.received.store(reply.seq, Ordering::Release);
        self.completed.fetch_max(reply.seq, Ordering::AcqRel);
        reply.response
    }

    /// Stop the worker thread and wait for it to exit
    ///
    /// An in-flight decode is allowed to finish; its response is discarded.
    pub fn close(&mut self) {
        let Some(requests) = self.requests.take() else {
            return;
        };
        drop(requests);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("decode worker exited with a panic");
            }
        }
        while self.replies.try_recv().is_ok() {}
        tracing::debug!("decode worker stopped");
    }
}

impl Drop for DecodeWorker {
    fn drop(&mut self) {
        self.close();
    }
}

fn run_worker<D: SymbolDecoder>(
    mut decoder: D,
    requests: Receiver<(u64, WorkerRequest)>,
    replies: Sender<Reply>,
    completed: Arc<AtomicU64>,
) {
    while let Ok((seq, request)) = requests.recv() {
        let outcome = handle_request(&mut decoder, request);
        let reply = Reply {
            seq,
            response: WorkerResponse::from_outcome(outcome),
        };
        let delivered = replies.send(reply).is_ok();
        completed.fetch_max(seq, Ordering::AcqRel);
        if !delivered {
            break;
        }
    }
}

fn handle_request<D: SymbolDecoder>(decoder: &mut D, request: WorkerRequest) -> DecodeOutcome {
    match request {
        WorkerRequest::DecodeImage { image_data } => {
            let frame = match image_data.into_frame() {
                Ok(frame) => frame,
                Err(err) => return DecodeOutcome::error(err.to_string()),
            };
            match panic::catch_unwind(AssertUnwindSafe(|| decoder.decode(&frame))) {
                Ok(outcome) => outcome,
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    tracing::error!(%message, "decoder failed inside worker");
                    DecodeOutcome::error(message)
                }
            }
        }
    }
}

//! Runs a blocking detector backend on a dedicated thread
//!
//! Inference backends are usually synchronous and too slow to call from the
//! scheduling loop. `WorkerDetector` owns a named worker thread and hands it
//! one request at a time over a bounded channel; the session awaits the
//! reply, so there is never more than one detection in flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, TrySendError};
use tokio::sync::oneshot;

use super::{DetectionResult, DetectorOptions, LandmarkDetector};
use crate::error::DetectorError;
use crate::source::Frame;

/// Synchronous detector backend, e.g. an ONNX or TFLite session
pub trait BlockingDetector {
    fn configure(&mut self, options: &DetectorOptions) -> Result<(), DetectorError>;

    fn detect(
        &mut self,
        frame: &Frame,
        timestamp: Option<Duration>,
    ) -> Result<DetectionResult, DetectorError>;
}

/// Work sent to the detector thread
enum Request {
    Configure {
        options: DetectorOptions,
        reply: oneshot::Sender<Result<(), DetectorError>>,
    },
    Detect {
        frame: Frame,
        timestamp: Option<Duration>,
        reply: oneshot::Sender<Result<DetectionResult, DetectorError>>,
    },
}

/// Async front for a `BlockingDetector` running on its own thread
pub struct WorkerDetector {
    /// Channel to the detector thread
    sender: Option<Sender<Request>>,
    /// Set once the backend has been configured successfully
    ready: Arc<AtomicBool>,
    thread_handle: Option<std::thread::JoinHandle<()>>,
}

impl WorkerDetector {
    /// Move `backend` onto a new "landmark-detector" thread
    pub fn spawn<B>(backend: B) -> Result<Self, DetectorError>
    where
        B: BlockingDetector + Send + 'static,
    {
        let ready = Arc::new(AtomicBool::new(false));
        let (sender, receiver) = crossbeam_channel::bounded::<Request>(1);

        let ready_clone = ready.clone();
        let thread_handle = std::thread::Builder::new()
            .name("landmark-detector".to_string())
            .spawn(move || {
                Self::worker_thread(backend, receiver, ready_clone);
            })
            .map_err(|e| DetectorError::Inference(format!("Failed to spawn detector thread: {}", e)))?;

        Ok(Self {
            sender: Some(sender),
            ready,
            thread_handle: Some(thread_handle),
        })
    }

    /// Whether the backend finished configuring
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    fn worker_thread<B: BlockingDetector>(
        mut backend: B,
        receiver: Receiver<Request>,
        ready: Arc<AtomicBool>,
    ) {
        tracing::info!("Detector thread started");

        while let Ok(request) = receiver.recv() {
            match request {
                Request::Configure { options, reply } => {
                    let result = backend.configure(&options);
                    ready.store(result.is_ok(), Ordering::Release);
                    if let Err(ref e) = result {
                        tracing::warn!(error = %e, "Detector configuration failed");
                    }
                    let _ = reply.send(result);
                }
                Request::Detect {
                    frame,
                    timestamp,
                    reply,
                } => {
                    let result = if ready.load(Ordering::Acquire) {
                        backend.detect(&frame, timestamp)
                    } else {
                        Err(DetectorError::NotReady)
                    };
                    // The session may have been stopped while this ran
                    let _ = reply.send(result);
                }
            }
        }

        ready.store(false, Ordering::Release);
        tracing::info!("Detector thread stopped");
    }

    fn submit(&self, request: Request) -> Result<(), DetectorError> {
        let sender = self.sender.as_ref().ok_or(DetectorError::WorkerStopped)?;
        sender.try_send(request).map_err(|e| match e {
            TrySendError::Full(_) => DetectorError::Inference("detector is busy".to_string()),
            TrySendError::Disconnected(_) => DetectorError::WorkerStopped,
        })
    }

    /// Close the channel and wait for the thread to finish
    pub fn stop(&mut self) {
        self.sender = None;
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
        self.ready.store(false, Ordering::Release);
    }
}

impl LandmarkDetector for WorkerDetector {
    async fn configure(&mut self, options: &DetectorOptions) -> Result<(), DetectorError> {
        let (reply, response) = oneshot::channel();
        self.submit(Request::Configure {
            options: options.clone(),
            reply,
        })?;
        response.await.map_err(|_| DetectorError::WorkerStopped)?
    }

    async fn detect(
        &mut self,
        frame: &Frame,
        timestamp: Option<Duration>,
    ) -> Result<DetectionResult, DetectorError> {
        let (reply, response) = oneshot::channel();
        self.submit(Request::Detect {
            frame: frame.clone(),
            timestamp,
            reply,
        })?;
        response.await.map_err(|_| DetectorError::WorkerStopped)?
    }

    fn close(&mut self) {
        // The thread stays up; the next `configure` makes it ready again
        self.ready.store(false, Ordering::Release);
    }
}

impl Drop for WorkerDetector {
    fn drop(&mut self) {
        self.stop();
    }
}

use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use thiserror::Error;

use crate::detection::domain::detection::Detection;
use crate::detection::domain::detector_config::DetectorConfig;
use crate::detection::domain::face_detector::{DetectError, FaceDetector};
use crate::shared::constants::CANCEL_POLL_INTERVAL;
use crate::shared::frame::Frame;

pub type DetectResult = Result<Option<Detection>, DetectError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("failed to load detector: {0}")]
    Load(DetectError),
    #[error("detector worker stopped unexpectedly")]
    Disconnected,
}

struct DetectRequest {
    frame: Arc<Frame>,
    config: DetectorConfig,
    with_landmarks: bool,
    reply: Sender<DetectResult>,
}

/// How a pending detection ended.
#[derive(Debug)]
pub enum Resolution {
    Resolved(DetectResult),
    /// The cancellation flag was raised before the detector answered.
    Abandoned,
}

/// Runs a [`FaceDetector`] on its own thread so the loop can wait on it
/// while still honouring cancellation.
pub struct DetectorWorker {
    request_tx: Option<Sender<DetectRequest>>,
    ready: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl DetectorWorker {
    /// Loads the detector on the calling thread, then moves it to a worker.
    pub fn spawn(mut detector: Box<dyn FaceDetector>) -> Result<Self, WorkerError> {
        detector.load().map_err(WorkerError::Load)?;
        let ready = Arc::new(AtomicBool::new(detector.is_loaded()));
        let (request_tx, request_rx) = crossbeam_channel::bounded::<DetectRequest>(1);
        let handle = spawn_detector(detector, request_rx, ready.clone());
        Ok(Self {
            request_tx: Some(request_tx),
            ready,
            handle: Some(handle),
        })
    }

    /// Mirrors the detector's `is_loaded` as of its last call.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Sends one request. The returned handle borrows the worker mutably,
    /// so no second request can be issued until it is consumed.
    pub fn submit(
        &mut self,
        frame: Arc<Frame>,
        config: DetectorConfig,
        with_landmarks: bool,
    ) -> Result<PendingDetection<'_>, WorkerError> {
        let request_tx = self.request_tx.as_ref().ok_or(WorkerError::Disconnected)?;
        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        request_tx
            .send(DetectRequest {
                frame,
                config,
                with_landmarks,
                reply: reply_tx,
            })
            .map_err(|_| WorkerError::Disconnected)?;
        Ok(PendingDetection {
            reply: reply_rx,
            _worker: PhantomData,
        })
    }
}

impl Drop for DetectorWorker {
    fn drop(&mut self) {
        self.request_tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Detector thread panicked");
            }
        }
    }
}

/// An outstanding request; consume it with [`PendingDetection::wait`].
pub struct PendingDetection<'a> {
    reply: Receiver<DetectResult>,
    _worker: PhantomData<&'a mut DetectorWorker>,
}

impl PendingDetection<'_> {
    /// Blocks until the detector answers or `cancelled` is raised.
    pub fn wait(self, cancelled: &AtomicBool) -> Result<Resolution, WorkerError> {
        loop {
            if cancelled.load(Ordering::Relaxed) {
                return Ok(Resolution::Abandoned);
            }
            match self.reply.recv_timeout(CANCEL_POLL_INTERVAL) {
                Ok(result) => return Ok(Resolution::Resolved(result)),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return Err(WorkerError::Disconnected),
            }
        }
    }
}

fn spawn_detector(
    mut detector: Box<dyn FaceDetector>,
    request_rx: Receiver<DetectRequest>,
    ready: Arc<AtomicBool>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        for request in request_rx {
            let result = detector.detect(&request.frame, &request.config, request.with_landmarks);
            ready.store(detector.is_loaded(), Ordering::Release);
            // The loop may have abandoned the wait; a dropped receiver is fine.
            let _ = request.reply.send(result);
        }
    })
}

use super::detection::Detection;
use super::detector_config::DetectorConfig;
use crate::shared::frame::Frame;

/// Error type for detector calls; `Send + Sync` so it can cross the worker
/// thread boundary.
pub type DetectError = Box<dyn std::error::Error + Send + Sync>;

/// Domain interface for single-face detection.
///
/// Implementations may keep state between calls, hence `&mut self`.
/// Calls are synchronous here; [`DetectorWorker`] moves them off the loop
/// thread.
///
/// [`DetectorWorker`]: crate::detection::infrastructure::detector_worker::DetectorWorker
pub trait FaceDetector: Send {
    /// Load weights. Called once before the first detection; a failure is
    /// fatal to initialization.
    fn load(&mut self) -> Result<(), DetectError> {
        Ok(())
    }

    /// Whether weights are present. The loop idles while this is false.
    fn is_loaded(&self) -> bool;

    /// Detects at most one face. Landmarks are filled only when requested.
    fn detect(
        &mut self,
        frame: &Frame,
        config: &DetectorConfig,
        with_landmarks: bool,
    ) -> Result<Option<Detection>, DetectError>;
}

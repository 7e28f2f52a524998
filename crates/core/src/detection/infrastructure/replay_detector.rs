use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::detection::domain::detection::Detection;
use crate::detection::domain::detector_config::DetectorConfig;
use crate::detection::domain::face_detector::{DetectError, FaceDetector};
use crate::shared::frame::Frame;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read detections from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed detections file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Replays recorded detections by frame index.
///
/// The file is a JSON object mapping frame indices to a detection or
/// `null`. Frames without an entry have no face. Recorded scores below the
/// active config's threshold are dropped, like a live model would.
pub struct ReplayDetector {
    source: Option<PathBuf>,
    recorded: Option<Arc<HashMap<usize, Detection>>>,
}

impl ReplayDetector {
    /// Detector that reads `path` when loaded.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            source: Some(path.into()),
            recorded: None,
        }
    }

    /// Already-loaded detector over in-memory recordings.
    pub fn new(recorded: Arc<HashMap<usize, Detection>>) -> Self {
        Self {
            source: None,
            recorded: Some(recorded),
        }
    }

    pub fn read_file(path: &Path) -> Result<HashMap<usize, Detection>, ReplayError> {
        let text = std::fs::read_to_string(path).map_err(|source| ReplayError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let entries: HashMap<usize, Option<Detection>> =
            serde_json::from_str(&text).map_err(|source| ReplayError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(entries
            .into_iter()
            .filter_map(|(index, detection)| detection.map(|d| (index, d)))
            .collect())
    }
}

impl FaceDetector for ReplayDetector {
    fn load(&mut self) -> Result<(), DetectError> {
        let Some(path) = &self.source else {
            return Ok(());
        };
        let recorded = Self::read_file(path)?;
        log::info!(
            "Loaded {} recorded detections from {}",
            recorded.len(),
            path.display()
        );
        self.recorded = Some(Arc::new(recorded));
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.recorded.is_some()
    }

    fn detect(
        &mut self,
        frame: &Frame,
        config: &DetectorConfig,
        with_landmarks: bool,
    ) -> Result<Option<Detection>, DetectError> {
        let recorded = self.recorded.as_ref().ok_or("detections not loaded")?;
        let Some(detection) = recorded.get(&frame.index()) else {
            return Ok(None);
        };
        if let Some(threshold) = config.score_threshold() {
            if detection.face_box.score < threshold {
                return Ok(None);
            }
        }
        let detection = detection.clone();
        Ok(Some(if with_landmarks {
            detection
        } else {
            detection.without_landmarks()
        }))
    }
}

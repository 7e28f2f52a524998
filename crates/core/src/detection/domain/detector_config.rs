use std::fmt;

use serde::{Deserialize, Serialize};

pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.5;
pub const DEFAULT_INPUT_SIZE: u32 = 512;
pub const DEFAULT_SCORE_THRESHOLD: f64 = 0.5;
pub const DEFAULT_MIN_FACE_SIZE: u32 = 20;

/// Which detector variant is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorKind {
    SsdMobilenetV1,
    TinyFaceDetector,
    Mtcnn,
}

impl fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectorKind::SsdMobilenetV1 => write!(f, "SSD MobileNet v1"),
            DetectorKind::TinyFaceDetector => write!(f, "Tiny Face Detector"),
            DetectorKind::Mtcnn => write!(f, "MTCNN"),
        }
    }
}

/// Parameters for the active detector variant.
///
/// Chosen by the configuration surface and forwarded untouched with every
/// detection call; the loop never interprets them.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DetectorConfig {
    SsdMobilenetV1 { min_confidence: f64 },
    TinyFaceDetector { input_size: u32, score_threshold: f64 },
    Mtcnn { min_face_size: u32 },
}

impl DetectorConfig {
    /// Default parameters for a variant.
    pub fn for_kind(kind: DetectorKind) -> Self {
        match kind {
            DetectorKind::SsdMobilenetV1 => DetectorConfig::SsdMobilenetV1 {
                min_confidence: DEFAULT_MIN_CONFIDENCE,
            },
            DetectorKind::TinyFaceDetector => DetectorConfig::TinyFaceDetector {
                input_size: DEFAULT_INPUT_SIZE,
                score_threshold: DEFAULT_SCORE_THRESHOLD,
            },
            DetectorKind::Mtcnn => DetectorConfig::Mtcnn {
                min_face_size: DEFAULT_MIN_FACE_SIZE,
            },
        }
    }

    pub fn kind(&self) -> DetectorKind {
        match self {
            DetectorConfig::SsdMobilenetV1 { .. } => DetectorKind::SsdMobilenetV1,
            DetectorConfig::TinyFaceDetector { .. } => DetectorKind::TinyFaceDetector,
            DetectorConfig::Mtcnn { .. } => DetectorKind::Mtcnn,
        }
    }

    /// Minimum score a detection must reach, for variants that have one.
    pub fn score_threshold(&self) -> Option<f64> {
        match self {
            DetectorConfig::SsdMobilenetV1 { min_confidence } => Some(*min_confidence),
            DetectorConfig::TinyFaceDetector {
                score_threshold, ..
            } => Some(*score_threshold),
            DetectorConfig::Mtcnn { .. } => None,
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self::for_kind(DetectorKind::SsdMobilenetV1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_is_ssd() {
        assert_eq!(
            DetectorConfig::default(),
            DetectorConfig::SsdMobilenetV1 {
                min_confidence: 0.5
            }
        );
    }

    #[rstest]
    #[case(DetectorKind::SsdMobilenetV1)]
    #[case(DetectorKind::TinyFaceDetector)]
    #[case(DetectorKind::Mtcnn)]
    fn test_for_kind_round_trips_kind(#[case] kind: DetectorKind) {
        assert_eq!(DetectorConfig::for_kind(kind).kind(), kind);
    }

    #[test]
    fn test_tiny_defaults() {
        assert_eq!(
            DetectorConfig::for_kind(DetectorKind::TinyFaceDetector),
            DetectorConfig::TinyFaceDetector {
                input_size: 512,
                score_threshold: 0.5
            }
        );
    }

    #[test]
    fn test_score_threshold() {
        assert_eq!(
            DetectorConfig::SsdMobilenetV1 {
                min_confidence: 0.7
            }
            .score_threshold(),
            Some(0.7)
        );
        assert_eq!(
            DetectorConfig::Mtcnn { min_face_size: 40 }.score_threshold(),
            None
        );
    }

    #[test]
    fn test_serde_is_tagged() {
        let json = serde_json::to_string(&DetectorConfig::Mtcnn { min_face_size: 20 }).unwrap();
        assert_eq!(json, r#"{"kind":"mtcnn","min_face_size":20}"#);
    }
}

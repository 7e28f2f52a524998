use serde::{Deserialize, Serialize};

use super::face_landmarks::FaceLandmarks;
use crate::shared::geometry::{Dimensions, Rect};

/// Bounding box of a detected face plus the detector's confidence.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FaceBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub score: f64,
}

impl FaceBox {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn scaled(&self, sx: f64, sy: f64) -> FaceBox {
        let r = self.rect().scaled(sx, sy);
        FaceBox {
            x: r.x,
            y: r.y,
            width: r.width,
            height: r.height,
            score: self.score,
        }
    }
}

/// One face found in one frame.
///
/// Coordinates live in the pixel space of `image_dims`, the size of the
/// image the detector ran on. [`Detection::for_size`] moves them into
/// another space; the result has the same shape and is itself a `Detection`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    #[serde(rename = "box")]
    pub face_box: FaceBox,
    pub image_dims: Dimensions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmarks: Option<FaceLandmarks>,
}

impl Detection {
    pub fn new(face_box: FaceBox, image_dims: Dimensions, landmarks: Option<FaceLandmarks>) -> Self {
        Self {
            face_box,
            image_dims,
            landmarks,
        }
    }

    /// Rescales box and landmarks to a `width` x `height` space, each axis
    /// independently.
    ///
    /// A detection with empty `image_dims` has no meaningful scale and is
    /// returned unscaled (only its dimensions are relabelled).
    pub fn for_size(&self, width: u32, height: u32) -> Detection {
        let (sx, sy) = if self.image_dims.is_empty() {
            (1.0, 1.0)
        } else {
            (
                width as f64 / self.image_dims.width as f64,
                height as f64 / self.image_dims.height as f64,
            )
        };
        Detection {
            face_box: self.face_box.scaled(sx, sy),
            image_dims: Dimensions::new(width, height),
            landmarks: self.landmarks.as_ref().map(|lm| lm.scaled(sx, sy)),
        }
    }

    /// Drops landmark data, as when landmarks were not requested.
    pub fn without_landmarks(mut self) -> Detection {
        self.landmarks = None;
        self
    }
}

//! Landmark-anchored sprite geometry.
//!
//! Every sprite is scaled by the distance between the outer eye corners.
//! Size and anchor offset are fixed fractions of that distance, tuned by
//! hand against each sprite's artwork; they are not derived from anything.

use super::overlay_strategy::RenderError;
use crate::detection::domain::face_landmarks::FaceLandmarks;
use crate::detection::domain::landmark_index::FacialFeature;
use crate::shared::geometry::{Point, Rect};

/// Sprite artwork available to placement strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteKind {
    CuteEyes,
    Moustache,
    Glasses,
    HeadSticker,
    RedEye,
}

impl SpriteKind {
    pub const ALL: &[SpriteKind] = &[
        SpriteKind::CuteEyes,
        SpriteKind::Moustache,
        SpriteKind::Glasses,
        SpriteKind::HeadSticker,
        SpriteKind::RedEye,
    ];

    /// Image file expected in the sprite directory.
    pub fn file_name(self) -> &'static str {
        match self {
            SpriteKind::CuteEyes => "cute_eyes.png",
            SpriteKind::Moustache => "moustache.png",
            SpriteKind::Glasses => "glasses.png",
            SpriteKind::HeadSticker => "head_sticker.png",
            SpriteKind::RedEye => "red_eye.png",
        }
    }
}

/// Where a sprite is pinned on the face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anchor {
    Feature(FacialFeature),
    Midpoint(FacialFeature, FacialFeature),
}

impl Anchor {
    pub fn resolve(&self, landmarks: &FaceLandmarks) -> Result<Point, RenderError> {
        match *self {
            Anchor::Feature(f) => Ok(landmarks.feature(f)?),
            Anchor::Midpoint(a, b) => {
                let pa = landmarks.feature(a)?;
                let pb = landmarks.feature(b)?;
                Ok(pa.midpoint(&pb))
            }
        }
    }
}

/// Size and offset of one sprite, all as fractions of the reference distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpritePlacement {
    pub sprite: SpriteKind,
    pub anchor: Anchor,
    pub width_ratio: f64,
    pub height_ratio: f64,
    pub offset_x_ratio: f64,
    pub offset_y_ratio: f64,
}

impl SpritePlacement {
    /// Destination rectangle for the sprite on this face.
    pub fn resolve(&self, landmarks: &FaceLandmarks) -> Result<Rect, RenderError> {
        let d = reference_distance(landmarks)?;
        let anchor = self.anchor.resolve(landmarks)?;
        let center = anchor.offset(self.offset_x_ratio * d, self.offset_y_ratio * d);
        Ok(Rect::centered_at(
            center,
            self.width_ratio * d,
            self.height_ratio * d,
        ))
    }
}

/// Euclidean distance between the outer corners of the two eyes.
pub fn reference_distance(landmarks: &FaceLandmarks) -> Result<f64, RenderError> {
    let right = landmarks.feature(FacialFeature::RightEyeOuterCorner)?;
    let left = landmarks.feature(FacialFeature::LeftEyeOuterCorner)?;
    let d = right.distance(&left);
    if !d.is_finite() || d <= 0.0 {
        return Err(RenderError::DegenerateScale(d));
    }
    Ok(d)
}

pub const CUTE_EYES: &[SpritePlacement] = &[SpritePlacement {
    sprite: SpriteKind::CuteEyes,
    anchor: Anchor::Feature(FacialFeature::BrowCenter),
    width_ratio: 1.6,
    height_ratio: 0.62,
    offset_x_ratio: 0.0,
    offset_y_ratio: 0.18,
}];

pub const MOUSTACHE: &[SpritePlacement] = &[SpritePlacement {
    sprite: SpriteKind::Moustache,
    anchor: Anchor::Feature(FacialFeature::NoseBase),
    width_ratio: 0.95,
    height_ratio: 0.32,
    offset_x_ratio: 0.0,
    offset_y_ratio: 0.14,
}];

pub const GLASSES: &[SpritePlacement] = &[SpritePlacement {
    sprite: SpriteKind::Glasses,
    anchor: Anchor::Midpoint(
        FacialFeature::RightEyeOuterCorner,
        FacialFeature::LeftEyeOuterCorner,
    ),
    width_ratio: 1.6,
    height_ratio: 0.56,
    offset_x_ratio: 0.0,
    offset_y_ratio: 0.04,
}];

pub const HEAD_STICKER: &[SpritePlacement] = &[SpritePlacement {
    sprite: SpriteKind::HeadSticker,
    anchor: Anchor::Feature(FacialFeature::BrowCenter),
    width_ratio: 1.9,
    height_ratio: 1.25,
    offset_x_ratio: 0.0,
    offset_y_ratio: -1.05,
}];

/// One glow per eye, each centered between that eye's corners.
pub const RED_EYE: &[SpritePlacement] = &[
    SpritePlacement {
        sprite: SpriteKind::RedEye,
        anchor: Anchor::Midpoint(
            FacialFeature::RightEyeOuterCorner,
            FacialFeature::RightEyeInnerCorner,
        ),
        width_ratio: 0.32,
        height_ratio: 0.32,
        offset_x_ratio: 0.0,
        offset_y_ratio: 0.0,
    },
    SpritePlacement {
        sprite: SpriteKind::RedEye,
        anchor: Anchor::Midpoint(
            FacialFeature::LeftEyeInnerCorner,
            FacialFeature::LeftEyeOuterCorner,
        ),
        width_ratio: 0.32,
        height_ratio: 0.32,
        offset_x_ratio: 0.0,
        offset_y_ratio: 0.0,
    },
];

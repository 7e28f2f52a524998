use crate::detection::domain::detection::Detection;
use crate::detection::domain::landmark_index::FacialFeature;
use crate::overlay::domain::draw_command::DrawCommand;
use crate::overlay::domain::overlay_strategy::{OverlayStrategy, OverlayStyle, RenderError};
use crate::shared::geometry::Rect;

/// Side of each eye dot in display pixels. Does not scale with the face.
pub const DOT_SIZE: f64 = 6.0;

/// A filled square centered between each eye's upper and lower lid.
pub struct DottedEyesOverlay;

const EYES: [(FacialFeature, FacialFeature); 2] = [
    (FacialFeature::RightEyeUpperLid, FacialFeature::RightEyeLowerLid),
    (FacialFeature::LeftEyeUpperLid, FacialFeature::LeftEyeLowerLid),
];

impl OverlayStrategy for DottedEyesOverlay {
    fn plan(
        &self,
        detection: &Detection,
        style: &OverlayStyle,
    ) -> Result<Vec<DrawCommand>, RenderError> {
        let landmarks = detection
            .landmarks
            .as_ref()
            .ok_or(RenderError::NoLandmarks)?;
        EYES.iter()
            .map(|&(upper, lower)| -> Result<DrawCommand, RenderError> {
                let center = landmarks.feature(upper)?.midpoint(&landmarks.feature(lower)?);
                Ok(DrawCommand::FillRect {
                    rect: Rect::centered_at(center, DOT_SIZE, DOT_SIZE),
                    color: style.landmark_color,
                })
            })
            .collect()
    }
}

use crate::detection::domain::detection::Detection;
use crate::overlay::domain::draw_command::DrawCommand;
use crate::overlay::domain::overlay_strategy::{OverlayStrategy, OverlayStyle, RenderError};

pub const INDEX_LABEL_SIZE: f64 = 5.0;

/// Each landmark's index printed at its position.
pub struct IndexOverlay;

impl OverlayStrategy for IndexOverlay {
    fn plan(
        &self,
        detection: &Detection,
        style: &OverlayStyle,
    ) -> Result<Vec<DrawCommand>, RenderError> {
        let landmarks = detection
            .landmarks
            .as_ref()
            .ok_or(RenderError::NoLandmarks)?;
        (0..landmarks.len())
            .map(|i| -> Result<DrawCommand, RenderError> {
                Ok(DrawCommand::Text {
                    at: landmarks.point(i)?,
                    text: i.to_string(),
                    color: style.landmark_color,
                    size: INDEX_LABEL_SIZE,
                })
            })
            .collect()
    }
}

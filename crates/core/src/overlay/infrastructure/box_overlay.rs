use crate::detection::domain::detection::Detection;
use crate::overlay::domain::draw_command::DrawCommand;
use crate::overlay::domain::overlay_strategy::{OverlayStrategy, OverlayStyle, RenderError};
use crate::shared::color::Color;
use crate::shared::geometry::Point;

pub const BOX_COLOR: Color = Color::BLUE;
pub const LABEL_SIZE: f64 = 10.0;
const LABEL_GAP: f64 = 2.0;

/// Bounding box with its confidence score above the top-left corner.
pub struct BoxOverlay;

impl BoxOverlay {
    pub fn score_label(score: f64) -> String {
        format!("{score:.2}")
    }
}

impl OverlayStrategy for BoxOverlay {
    fn plan(
        &self,
        detection: &Detection,
        style: &OverlayStyle,
    ) -> Result<Vec<DrawCommand>, RenderError> {
        let rect = detection.face_box.rect();
        if !rect.is_finite() {
            return Err(RenderError::NonFiniteBox(rect));
        }
        Ok(vec![
            DrawCommand::StrokeRect {
                rect,
                color: BOX_COLOR,
                line_width: style.line_width,
            },
            DrawCommand::Text {
                at: Point::new(rect.x, rect.y - LABEL_SIZE - LABEL_GAP),
                text: Self::score_label(detection.face_box.score),
                color: BOX_COLOR,
                size: LABEL_SIZE,
            },
        ])
    }
}

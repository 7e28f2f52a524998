use crate::detection::domain::detection::Detection;
use crate::detection::domain::landmark_index::LandmarkGroup;
use crate::overlay::domain::draw_command::DrawCommand;
use crate::overlay::domain::overlay_strategy::{OverlayStrategy, OverlayStyle, RenderError};

/// Landmark contours per anatomical group, or bare points when lines are off.
pub struct MeshOverlay;

impl OverlayStrategy for MeshOverlay {
    fn plan(
        &self,
        detection: &Detection,
        style: &OverlayStyle,
    ) -> Result<Vec<DrawCommand>, RenderError> {
        let landmarks = detection
            .landmarks
            .as_ref()
            .ok_or(RenderError::NoLandmarks)?;
        let color = style.landmark_color;

        let mut commands = Vec::new();
        for group in LandmarkGroup::ALL {
            let points = landmarks.group(group)?;
            if !style.draw_lines {
                commands.extend(points.iter().map(|&center| DrawCommand::FillCircle {
                    center,
                    radius: style.line_width / 2.0,
                    color,
                }));
                continue;
            }
            commands.extend(points.windows(2).map(|pair| DrawCommand::Line {
                from: pair[0],
                to: pair[1],
                color,
                line_width: style.line_width,
            }));
            if group.is_closed() {
                if let (Some(&last), Some(&first)) = (points.last(), points.first()) {
                    commands.push(DrawCommand::Line {
                        from: last,
                        to: first,
                        color,
                        line_width: style.line_width,
                    });
                }
            }
        }
        Ok(commands)
    }
}

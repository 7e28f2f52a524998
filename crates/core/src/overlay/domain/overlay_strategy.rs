use thiserror::Error;

use super::draw_command::DrawCommand;
use crate::detection::domain::detection::Detection;
use crate::detection::domain::face_landmarks::LandmarkError;
use crate::shared::color::Color;
use crate::shared::geometry::Rect;

/// Stroke width used for boxes and mesh lines.
pub const DEFAULT_LINE_WIDTH: f64 = 2.0;

/// Why a strategy could not plan its overlay for a detection.
#[derive(Debug, Error, PartialEq)]
pub enum RenderError {
    #[error("detection carries no landmarks")]
    NoLandmarks,
    #[error(transparent)]
    Landmark(#[from] LandmarkError),
    #[error("reference distance {0} cannot scale a sprite")]
    DegenerateScale(f64),
    #[error("face box {0:?} is not finite")]
    NonFiniteBox(Rect),
}

/// Style knobs the configuration surface exposes to strategies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayStyle {
    pub landmark_color: Color,
    pub draw_lines: bool,
    pub show_landmarks: bool,
    pub line_width: f64,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            landmark_color: Color::YELLOW,
            draw_lines: true,
            show_landmarks: true,
            line_width: DEFAULT_LINE_WIDTH,
        }
    }
}

/// One overlay drawing strategy.
///
/// Strategies are pure planners: given a detection already in display
/// coordinates, they return every command needed or fail as a whole.
pub trait OverlayStrategy: Send + Sync {
    fn plan(
        &self,
        detection: &Detection,
        style: &OverlayStyle,
    ) -> Result<Vec<DrawCommand>, RenderError>;
}

use crate::detection::domain::detection::Detection;
use crate::overlay::domain::draw_command::DrawCommand;
use crate::overlay::domain::overlay_strategy::{OverlayStrategy, OverlayStyle, RenderError};
use crate::overlay::domain::sprite_placement::SpritePlacement;

/// Blits one or more sprites anchored to landmarks.
pub struct SpriteOverlay {
    placements: &'static [SpritePlacement],
}

impl SpriteOverlay {
    pub const fn new(placements: &'static [SpritePlacement]) -> Self {
        Self { placements }
    }
}

impl OverlayStrategy for SpriteOverlay {
    fn plan(
        &self,
        detection: &Detection,
        _style: &OverlayStyle,
    ) -> Result<Vec<DrawCommand>, RenderError> {
        let landmarks = detection
            .landmarks
            .as_ref()
            .ok_or(RenderError::NoLandmarks)?;
        self.placements
            .iter()
            .map(|placement| -> Result<DrawCommand, RenderError> {
                Ok(DrawCommand::Sprite {
                    sprite: placement.sprite,
                    dest: placement.resolve(landmarks)?,
                })
            })
            .collect()
    }
}

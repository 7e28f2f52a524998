use super::box_overlay::BoxOverlay;
use super::dotted_eyes_overlay::DottedEyesOverlay;
use super::index_overlay::IndexOverlay;
use super::mesh_overlay::MeshOverlay;
use super::sprite_overlay::SpriteOverlay;
use crate::detection::domain::detection::Detection;
use crate::overlay::domain::display_surface::{paint, DisplaySurface};
use crate::overlay::domain::draw_command::DrawCommand;
use crate::overlay::domain::overlay_strategy::{OverlayStrategy, OverlayStyle, RenderError};
use crate::overlay::domain::render_mode::RenderMode;
use crate::overlay::domain::sprite_placement::{
    CUTE_EYES, GLASSES, HEAD_STICKER, MOUSTACHE, RED_EYE,
};

static BOX: BoxOverlay = BoxOverlay;
static MESH: MeshOverlay = MeshOverlay;
static INDEX: IndexOverlay = IndexOverlay;
static DOTTED_EYES: DottedEyesOverlay = DottedEyesOverlay;
static CUTE_EYES_SPRITE: SpriteOverlay = SpriteOverlay::new(CUTE_EYES);
static MOUSTACHE_SPRITE: SpriteOverlay = SpriteOverlay::new(MOUSTACHE);
static GLASSES_SPRITE: SpriteOverlay = SpriteOverlay::new(GLASSES);
static RED_EYE_SPRITE: SpriteOverlay = SpriteOverlay::new(RED_EYE);
static HEAD_STICKER_SPRITE: SpriteOverlay = SpriteOverlay::new(HEAD_STICKER);

/// Strategy drawn for `mode`. Switching modes is a table lookup only.
pub fn strategy_for(mode: RenderMode) -> &'static dyn OverlayStrategy {
    match mode {
        RenderMode::DefaultMesh => &MESH,
        RenderMode::FaceIndex => &INDEX,
        RenderMode::DottedEyes => &DOTTED_EYES,
        RenderMode::CuteEyes => &CUTE_EYES_SPRITE,
        RenderMode::Moustache => &MOUSTACHE_SPRITE,
        RenderMode::Glasses => &GLASSES_SPRITE,
        RenderMode::RedEye => &RED_EYE_SPRITE,
        RenderMode::HeadSticker => &HEAD_STICKER_SPRITE,
    }
}

/// Per-cycle rendering choices, snapshotted from the overlay settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderOptions {
    pub mode: RenderMode,
    pub show_boxes: bool,
    pub style: OverlayStyle,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            mode: RenderMode::default(),
            show_boxes: true,
            style: OverlayStyle::default(),
        }
    }
}

/// Composes the box overlay with the active mode's strategy.
pub struct OverlayRenderer;

impl OverlayRenderer {
    /// Full command list for one detection: box first when enabled, then
    /// the mode's overlay. The default mesh honours the landmark toggle;
    /// every other mode is drawn whenever it is selected.
    pub fn plan(
        detection: &Detection,
        options: &RenderOptions,
    ) -> Result<Vec<DrawCommand>, RenderError> {
        let mut commands = Vec::new();
        if options.show_boxes {
            commands.extend(BOX.plan(detection, &options.style)?);
        }
        if options.mode != RenderMode::DefaultMesh || options.style.show_landmarks {
            commands.extend(strategy_for(options.mode).plan(detection, &options.style)?);
        }
        Ok(commands)
    }

    /// Plans and paints. On error nothing reaches the surface.
    pub fn render(
        surface: &mut dyn DisplaySurface,
        detection: &Detection,
        options: &RenderOptions,
    ) -> Result<usize, RenderError> {
        let commands = Self::plan(detection, options)?;
        paint(surface, &commands);
        Ok(commands.len())
    }
}

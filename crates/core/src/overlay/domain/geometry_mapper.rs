use super::display_surface::DisplaySurface;
use crate::detection::domain::detection::Detection;
use crate::shared::frame::Frame;
use crate::shared::geometry::Dimensions;

/// Size the overlay should match.
#[derive(Clone, Copy, Debug)]
pub enum DisplayDimensions<'a> {
    Explicit(Dimensions),
    /// Native resolution of the frame being shown.
    Media(&'a Frame),
}

impl DisplayDimensions<'_> {
    pub fn resolve(&self) -> Dimensions {
        match self {
            DisplayDimensions::Explicit(dims) => *dims,
            DisplayDimensions::Media(frame) => frame.dimensions(),
        }
    }
}

/// Maps detector-space detections onto the display surface.
pub struct GeometryMapper;

impl GeometryMapper {
    /// Sizes `surface` to `target` (which clears it) and returns every
    /// detection rescaled into the new pixel space.
    pub fn resize(
        target: DisplayDimensions<'_>,
        surface: &mut dyn DisplaySurface,
        detections: &[Detection],
    ) -> Vec<Detection> {
        let dims = target.resolve();
        surface.set_dimensions(dims);
        detections
            .iter()
            .map(|d| d.for_size(dims.width, dims.height))
            .collect()
    }
}

use super::draw_command::DrawCommand;
use crate::shared::frame::Frame;
use crate::shared::geometry::Dimensions;

/// Domain interface for the 2-D surface overlays are painted on.
///
/// The surface sits on top of the displayed video; it is owned by the
/// detection loop and only ever written from the loop thread.
pub trait DisplaySurface: Send {
    fn dimensions(&self) -> Dimensions;

    /// Resizes the backing store. Like an HTML canvas, assigning dimensions
    /// also clears the surface, even when they are unchanged.
    fn set_dimensions(&mut self, dimensions: Dimensions);

    fn clear(&mut self);

    fn draw(&mut self, command: &DrawCommand);

    /// Shows the current overlay over `frame`. Default: no-op.
    fn present(&mut self, _frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }
}

/// Paints a planned command list in order.
pub fn paint(surface: &mut dyn DisplaySurface, commands: &[DrawCommand]) {
    for command in commands {
        surface.draw(command);
    }
}

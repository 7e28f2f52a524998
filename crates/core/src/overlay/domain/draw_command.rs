use super::sprite_placement::SpriteKind;
use crate::shared::color::Color;
use crate::shared::geometry::{Point, Rect};

/// One primitive paint operation in display-surface coordinates.
///
/// Strategies produce a complete list before anything is painted, so a
/// failed strategy leaves the surface untouched.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    StrokeRect {
        rect: Rect,
        color: Color,
        line_width: f64,
    },
    Line {
        from: Point,
        to: Point,
        color: Color,
        line_width: f64,
    },
    FillRect {
        rect: Rect,
        color: Color,
    },
    FillCircle {
        center: Point,
        radius: f64,
        color: Color,
    },
    /// `at` is the top-left corner of the text box.
    Text {
        at: Point,
        text: String,
        color: Color,
        size: f64,
    },
    Sprite {
        sprite: SpriteKind,
        dest: Rect,
    },
}

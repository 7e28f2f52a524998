use std::path::PathBuf;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut,
    Blend,
};
use imageproc::rect::Rect as PixelRect;

use super::sprite_sheet::SpriteSheet;
use crate::overlay::domain::display_surface::DisplaySurface;
use crate::overlay::domain::draw_command::DrawCommand;
use crate::overlay::domain::sprite_placement::SpriteKind;
use crate::shared::color::Color;
use crate::shared::frame::Frame;
use crate::shared::geometry::{Dimensions, Point, Rect};
use crate::video::domain::image_writer::ImageWriter;

const GLYPH_WIDTH: i32 = 3;
const GLYPH_HEIGHT: i32 = 5;
const MAX_STROKE_WIDTH: f64 = 16.0;
/// Sprites scaled past this multiple of the surface are not drawn.
const MAX_SPRITE_OVERSIZE: f64 = 4.0;

/// Where presented frames are written, one PNG per frame index.
pub struct FrameOutput {
    writer: Box<dyn ImageWriter>,
    dir: PathBuf,
}

impl FrameOutput {
    pub fn new(writer: Box<dyn ImageWriter>, dir: PathBuf) -> Self {
        Self { writer, dir }
    }

    pub fn path_for(&self, frame: &Frame) -> PathBuf {
        self.dir.join(format!("frame_{:05}.png", frame.index()))
    }
}

/// Transparent RGBA overlay painted in software.
pub struct RgbaCanvas {
    image: RgbaImage,
    sprites: SpriteSheet,
    output: Option<FrameOutput>,
}

impl RgbaCanvas {
    pub fn new(sprites: SpriteSheet) -> Self {
        Self {
            image: RgbaImage::new(0, 0),
            sprites,
            output: None,
        }
    }

    pub fn with_output(mut self, output: FrameOutput) -> Self {
        self.output = Some(output);
        self
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Blends the overlay over `frame`, returning an RGB frame of the same
    /// size. Overlay pixels outside the frame are ignored.
    pub fn composite(&self, frame: &Frame) -> Frame {
        let pixels = frame.as_ndarray();
        let (w, h) = (frame.width(), frame.height());
        let mut data = Vec::with_capacity(w as usize * h as usize * 3);
        for y in 0..h {
            for x in 0..w {
                let base = [
                    pixels[[y as usize, x as usize, 0]],
                    pixels[[y as usize, x as usize, 1]],
                    pixels[[y as usize, x as usize, 2]],
                ];
                let over = if x < self.image.width() && y < self.image.height() {
                    self.image.get_pixel(x, y).0
                } else {
                    [0, 0, 0, 0]
                };
                let a = over[3] as u32;
                for c in 0..3 {
                    data.push(((over[c] as u32 * a + base[c] as u32 * (255 - a)) / 255) as u8);
                }
            }
        }
        Frame::new(data, w, h, 3, frame.index())
    }

    fn bounds(&self) -> (f64, f64) {
        (self.image.width() as f64, self.image.height() as f64)
    }

    /// Runs `draw` against the image with source-over alpha blending.
    fn paint_with(&mut self, draw: impl FnOnce(&mut Blend<RgbaImage>)) {
        let mut canvas = Blend(std::mem::take(&mut self.image));
        draw(&mut canvas);
        self.image = canvas.0;
    }

    fn fill_rect(&mut self, rect: &Rect, color: Color) {
        if !rect.is_finite() {
            return;
        }
        let (w, h) = self.bounds();
        let (x0, x1) = (rect.x.round().max(0.0), (rect.x + rect.width).round().min(w));
        let (y0, y1) = (rect.y.round().max(0.0), (rect.y + rect.height).round().min(h));
        if x1 <= x0 || y1 <= y0 {
            return;
        }
        let area = PixelRect::at(x0 as i32, y0 as i32).of_size((x1 - x0) as u32, (y1 - y0) as u32);
        self.paint_with(|canvas| draw_filled_rect_mut(canvas, area, Rgba(color.to_array())));
    }

    /// Thick lines are drawn as parallel one-pixel segments, each clipped
    /// to the surface first.
    fn line(&mut self, from: Point, to: Point, color: Color, width: f64) {
        let len = from.distance(&to);
        let (nx, ny) = if len.is_finite() && len > f64::EPSILON {
            (-(to.y - from.y) / len, (to.x - from.x) / len)
        } else {
            (0.0, 1.0)
        };
        let strokes = stroke_count(width);
        let (w, h) = self.bounds();
        let segments: Vec<_> = (0..strokes)
            .filter_map(|i| {
                let off = i as f64 - (strokes - 1) as f64 / 2.0;
                clip_segment(
                    from.offset(nx * off, ny * off),
                    to.offset(nx * off, ny * off),
                    (w, h),
                )
            })
            .collect();
        if segments.is_empty() {
            return;
        }
        let pixel = Rgba(color.to_array());
        self.paint_with(|canvas| {
            for (a, b) in segments {
                draw_line_segment_mut(canvas, (a.x as f32, a.y as f32), (b.x as f32, b.y as f32), pixel);
            }
        });
    }

    /// Nested one-pixel outlines growing inwards. Edges outside the surface
    /// are pulled in to just past the border, where they draw nothing.
    fn stroke_rect(&mut self, rect: &Rect, color: Color, width: f64) {
        if !rect.is_finite() {
            return;
        }
        let (w, h) = self.bounds();
        let strokes = stroke_count(width);
        let outlines: Vec<_> = (0..strokes)
            .filter_map(|i| {
                let inset = i as f64 - ((strokes - 1) / 2) as f64;
                let (left, right) = (
                    (rect.x + inset).round(),
                    (rect.x + rect.width - inset).round(),
                );
                let (top, bottom) = (
                    (rect.y + inset).round(),
                    (rect.y + rect.height - inset).round(),
                );
                if right < left || bottom < top {
                    return None;
                }
                let (left, right) = (left.max(-1.0), right.min(w));
                let (top, bottom) = (top.max(-1.0), bottom.min(h));
                if right < left || bottom < top {
                    return None;
                }
                Some(
                    PixelRect::at(left as i32, top as i32)
                        .of_size((right - left) as u32 + 1, (bottom - top) as u32 + 1),
                )
            })
            .collect();
        let pixel = Rgba(color.to_array());
        self.paint_with(|canvas| {
            for outline in outlines {
                draw_hollow_rect_mut(canvas, outline, pixel);
            }
        });
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color) {
        if !center.is_finite() || !radius.is_finite() {
            return;
        }
        let (w, h) = self.bounds();
        let r = radius.round().min(w + h).max(1.0);
        if center.x + r < 0.0 || center.y + r < 0.0 || center.x - r >= w || center.y - r >= h {
            return;
        }
        let at = (center.x.round() as i32, center.y.round() as i32);
        self.paint_with(|canvas| {
            draw_filled_circle_mut(canvas, at, r as i32, Rgba(color.to_array()))
        });
    }

    fn text(&mut self, at: Point, text: &str, color: Color, size: f64) {
        let scale = (size / GLYPH_HEIGHT as f64).round().max(1.0);
        let advance = (GLYPH_WIDTH + 1) as f64 * scale;
        let (w, h) = self.bounds();
        let extent = advance * text.chars().count() as f64;
        if !at.is_finite()
            || !scale.is_finite()
            || at.x >= w
            || at.y >= h
            || at.x + extent <= 0.0
            || at.y + GLYPH_HEIGHT as f64 * scale <= 0.0
        {
            return;
        }
        let (left, top, step) = (at.x.round() as i32, at.y.round() as i32, scale as i32);
        let mut cells = Vec::new();
        for (i, ch) in text.chars().enumerate() {
            let origin = left + i as i32 * (GLYPH_WIDTH + 1) * step;
            for (row, bits) in glyph(ch).iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if (bits >> (GLYPH_WIDTH - 1 - col)) & 1 == 1 {
                        cells.push(
                            PixelRect::at(origin + col * step, top + row as i32 * step)
                                .of_size(step as u32, step as u32),
                        );
                    }
                }
            }
        }
        let pixel = Rgba(color.to_array());
        self.paint_with(|canvas| {
            for cell in cells {
                draw_filled_rect_mut(canvas, cell, pixel);
            }
        });
    }

    fn sprite(&mut self, kind: SpriteKind, dest: &Rect) {
        let Some(source) = self.sprites.get(kind) else {
            return;
        };
        let (w, h) = (dest.width.round(), dest.height.round());
        let (max_w, max_h) = self.bounds();
        if !dest.is_finite() || w < 1.0 || h < 1.0 {
            return;
        }
        if w > max_w * MAX_SPRITE_OVERSIZE || h > max_h * MAX_SPRITE_OVERSIZE {
            log::debug!("Skipping {kind:?} sprite of {w}x{h} on a {max_w}x{max_h} surface");
            return;
        }
        let scaled = imageops::resize(source, w as u32, h as u32, FilterType::Triangle);
        imageops::overlay(
            &mut self.image,
            &scaled,
            dest.x.round() as i64,
            dest.y.round() as i64,
        );
    }
}

fn stroke_count(width: f64) -> i32 {
    if width.is_finite() {
        width.round().clamp(1.0, MAX_STROKE_WIDTH) as i32
    } else {
        1
    }
}

/// Liang-Barsky clip of a segment to the surface grown by one pixel on
/// every side. `None` when nothing of it is visible.
fn clip_segment(from: Point, to: Point, (w, h): (f64, f64)) -> Option<(Point, Point)> {
    if !from.is_finite() || !to.is_finite() {
        return None;
    }
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for (p, q) in [
        (-dx, from.x + 1.0),
        (dx, w - from.x),
        (-dy, from.y + 1.0),
        (dy, h - from.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return None;
        }
    }
    let a = Point::new(from.x + t0 * dx, from.y + t0 * dy);
    let b = Point::new(from.x + t1 * dx, from.y + t1 * dy);
    (a.is_finite() && b.is_finite()).then_some((a, b))
}

/// 3x5 bitmap rows for the characters score and index labels use.
fn glyph(ch: char) -> [u8; 5] {
    match ch {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b010, 0b010, 0b010],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        _ => [0; 5],
    }
}

impl DisplaySurface for RgbaCanvas {
    fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.image.width(), self.image.height())
    }

    fn set_dimensions(&mut self, dimensions: Dimensions) {
        self.image = RgbaImage::new(dimensions.width, dimensions.height);
    }

    fn clear(&mut self) {
        self.image.pixels_mut().for_each(|p| *p = Rgba([0, 0, 0, 0]));
    }

    fn draw(&mut self, command: &DrawCommand) {
        match command {
            DrawCommand::StrokeRect {
                rect,
                color,
                line_width,
            } => self.stroke_rect(rect, *color, *line_width),
            DrawCommand::Line {
                from,
                to,
                color,
                line_width,
            } => self.line(*from, *to, *color, *line_width),
            DrawCommand::FillRect { rect, color } => self.fill_rect(rect, *color),
            DrawCommand::FillCircle {
                center,
                radius,
                color,
            } => self.fill_circle(*center, *radius, *color),
            DrawCommand::Text {
                at,
                text,
                color,
                size,
            } => self.text(*at, text, *color, *size),
            DrawCommand::Sprite { sprite, dest } => self.sprite(*sprite, dest),
        }
    }

    fn present(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        let Some(output) = &self.output else {
            return Ok(());
        };
        let composited = self.composite(frame);
        let path = output.path_for(frame);
        output.writer.write(&path, &composited)?;
        log::trace!("Wrote {}", path.display());
        Ok(())
    }
}

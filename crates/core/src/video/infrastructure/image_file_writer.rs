use std::path::Path;

use image::{RgbImage, RgbaImage};

use crate::shared::frame::Frame;
use crate::video::domain::image_writer::ImageWriter;

/// Writes frames through the `image` crate; the format follows the extension.
#[derive(Default)]
pub struct ImageFileWriter;

impl ImageFileWriter {
    pub fn new() -> Self {
        Self
    }
}

impl ImageWriter for ImageFileWriter {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let data = frame.data().to_vec();
        match frame.channels() {
            3 => RgbImage::from_raw(frame.width(), frame.height(), data)
                .ok_or("frame data does not match its dimensions")?
                .save(path)?,
            4 => RgbaImage::from_raw(frame.width(), frame.height(), data)
                .ok_or("frame data does not match its dimensions")?
                .save(path)?,
            n => return Err(format!("cannot write a {n}-channel frame").into()),
        }
        Ok(())
    }
}

use std::path::Path;
use std::sync::Arc;

use crate::shared::frame::Frame;
use crate::shared::geometry::Dimensions;
use crate::video::domain::capture_source::{CaptureSource, PlaybackState};

/// A single decoded image presented as a stream that never ends.
///
/// Every cycle sees the same frame (index 0), so recorded detections for
/// frame 0 apply on each tick.
pub struct StillImageSource {
    frame: Arc<Frame>,
}

impl StillImageSource {
    pub fn open(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let rgb = image::open(path)?.to_rgb8();
        let (width, height) = rgb.dimensions();
        log::info!("Opened still image {} ({width}x{height})", path.display());
        Ok(Self::from_frame(Frame::new(rgb.into_raw(), width, height, 3, 0)))
    }

    pub fn from_frame(frame: Frame) -> Self {
        Self {
            frame: Arc::new(frame),
        }
    }
}

impl CaptureSource for StillImageSource {
    fn state(&self) -> PlaybackState {
        PlaybackState::Playing
    }

    fn current_frame(&self) -> Option<Arc<Frame>> {
        Some(self.frame.clone())
    }

    fn dimensions(&self) -> Dimensions {
        self.frame.dimensions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_open_decodes_rgb_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("face.png");
        RgbImage::from_pixel(32, 24, Rgb([10, 20, 30]))
            .save(&path)
            .unwrap();

        let source = StillImageSource::open(&path).unwrap();
        assert_eq!(source.dimensions(), Dimensions::new(32, 24));
        assert_eq!(source.state(), PlaybackState::Playing);

        let frame = source.current_frame().unwrap();
        assert_eq!(frame.index(), 0);
        assert_eq!(&frame.data()[..3], &[10, 20, 30]);
    }

    #[test]
    fn test_same_frame_every_time() {
        let source = StillImageSource::from_frame(Frame::black(4, 4, 0));
        let a = source.current_frame().unwrap();
        let b = source.current_frame().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_open_missing_file_fails() {
        assert!(StillImageSource::open(Path::new("/nonexistent/face.png")).is_err());
    }
}

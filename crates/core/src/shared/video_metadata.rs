use std::path::PathBuf;
use std::time::Duration;

use super::geometry::Dimensions;

/// Stream properties discovered when a capture source is opened.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    /// Nominal frame rate; 0 when the container does not declare one.
    pub fps: f64,
    pub codec: String,
    pub source_path: Option<PathBuf>,
}

impl VideoMetadata {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    /// Delay between frames at the nominal rate, if the rate is usable.
    pub fn frame_interval(&self) -> Option<Duration> {
        (self.fps.is_finite() && self.fps > 0.0).then(|| Duration::from_secs_f64(1.0 / self.fps))
    }
}

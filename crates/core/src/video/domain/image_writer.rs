use std::path::Path;

use crate::shared::frame::Frame;

/// Persists a composited frame as a still image.
pub trait ImageWriter: Send {
    /// Writes `frame` to `path`. RGB and RGBA frames are accepted.
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>>;
}

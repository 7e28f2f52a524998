use std::sync::Arc;

use crate::shared::frame::Frame;
use crate::shared::geometry::Dimensions;

/// Playback state of a capture source, as seen by the detection loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    /// Paused by the user, or not started yet.
    Paused,
    Playing,
    Ended,
}

/// Domain interface for a live stream of frames (webcam, file, still).
///
/// The loop only ever looks at the most recent frame; sources are free to
/// drop frames the loop did not get to.
pub trait CaptureSource: Send {
    fn state(&self) -> PlaybackState;

    /// Most recent frame, or `None` before the first one arrives.
    fn current_frame(&self) -> Option<Arc<Frame>>;

    /// Native resolution of the stream.
    fn dimensions(&self) -> Dimensions;
}

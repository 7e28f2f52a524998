use std::time::Duration;

/// Number of points in the 68-point facial landmark layout.
pub const LANDMARK_COUNT: usize = 68;

/// Number of recent detection durations kept for the stats display.
pub const LATENCY_WINDOW: usize = 30;

/// Delay between loop ticks. Matches the minimum delay of a zero-timeout
/// browser timer, which is what the loop re-schedules with.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(4);

/// How often blocking waits re-check the cancellation flag.
pub const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(10);

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

pub const SETTINGS_DIR_NAME: &str = "facemask";
pub const SETTINGS_FILE_NAME: &str = "settings.json";

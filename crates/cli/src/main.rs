use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use facemask_core::detection::domain::detector_config::{DetectorConfig, DetectorKind};
use facemask_core::detection::infrastructure::detector_worker::DetectorWorker;
use facemask_core::detection::infrastructure::replay_detector::ReplayDetector;
use facemask_core::overlay::domain::render_mode::RenderMode;
use facemask_core::overlay::infrastructure::rgba_canvas::{FrameOutput, RgbaCanvas};
use facemask_core::overlay::infrastructure::sprite_sheet::SpriteSheet;
use facemask_core::pipeline::detection_loop::{DetectionLoop, LoopHandle, LoopStatus};
use facemask_core::pipeline::loop_logger::StdoutLoopLogger;
use facemask_core::pipeline::overlay_settings::{OverlaySettings, SettingsHandle};
use facemask_core::shared::color::Color;
use facemask_core::shared::constants::{DEFAULT_TICK_INTERVAL, IMAGE_EXTENSIONS};
use facemask_core::video::domain::capture_source::CaptureSource;
use facemask_core::video::infrastructure::ffmpeg_capture_source::FfmpegCaptureSource;
use facemask_core::video::infrastructure::image_file_writer::ImageFileWriter;
use facemask_core::video::infrastructure::still_image_source::StillImageSource;

const STATUS_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Clone, Copy, ValueEnum)]
enum DetectorArg {
    Ssd,
    Tiny,
    Mtcnn,
}

impl From<DetectorArg> for DetectorKind {
    fn from(arg: DetectorArg) -> Self {
        match arg {
            DetectorArg::Ssd => DetectorKind::SsdMobilenetV1,
            DetectorArg::Tiny => DetectorKind::TinyFaceDetector,
            DetectorArg::Mtcnn => DetectorKind::Mtcnn,
        }
    }
}

/// Live face overlays for videos, capture devices and images.
#[derive(Parser)]
#[command(name = "facemask")]
struct Cli {
    /// Input video, capture device or image.
    input: PathBuf,

    /// Recorded detections (JSON keyed by frame index).
    #[arg(long)]
    detections: PathBuf,

    /// Overlay mode, e.g. default-mesh, face-index, dotted-eyes, glasses.
    #[arg(long)]
    mode: Option<String>,

    /// Directory with sprite PNGs (cute_eyes.png, glasses.png, ...).
    #[arg(long)]
    sprites: Option<PathBuf>,

    /// Write composited frames to this directory.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Settings file (defaults to the user config directory).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Landmark color as hex (#ff0, #ffff00 or #rrggbbaa).
    #[arg(long)]
    color: Option<Color>,

    /// Draw landmark points only, without connecting lines.
    #[arg(long)]
    no_lines: bool,

    /// Hide the face box and score.
    #[arg(long)]
    no_boxes: bool,

    /// Hide the landmark mesh.
    #[arg(long)]
    no_landmarks: bool,

    /// Detector variant.
    #[arg(long, value_enum)]
    detector: Option<DetectorArg>,

    /// SSD minimum confidence (0.0-1.0).
    #[arg(long)]
    min_confidence: Option<f64>,

    /// Tiny detector input size in pixels.
    #[arg(long)]
    input_size: Option<u32>,

    /// Tiny detector score threshold (0.0-1.0).
    #[arg(long)]
    score_threshold: Option<f64>,

    /// MTCNN minimum face size in pixels.
    #[arg(long)]
    min_face_size: Option<u32>,

    /// Stop after this many detection cycles.
    #[arg(long)]
    max_cycles: Option<u64>,

    /// Loop tick interval in milliseconds.
    #[arg(long, default_value_t = DEFAULT_TICK_INTERVAL.as_millis() as u64)]
    tick_ms: u64,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let settings = build_settings(&cli)?;
    log::info!(
        "Mode: {}, detector: {}",
        settings.render_mode,
        settings.detector.kind()
    );

    let source = open_source(&cli.input)?;
    let detector = DetectorWorker::spawn(Box::new(ReplayDetector::from_file(&cli.detections)))?;

    let sprites = match &cli.sprites {
        Some(dir) => SpriteSheet::load_dir(dir)?,
        None => SpriteSheet::empty(),
    };
    let mut canvas = RgbaCanvas::new(sprites);
    if let Some(dir) = &cli.output_dir {
        canvas = canvas.with_output(FrameOutput::new(Box::new(ImageFileWriter::new()), dir.clone()));
    }

    let detection_loop = DetectionLoop::new(
        source,
        detector,
        Box::new(canvas),
        SettingsHandle::new(settings),
        Box::new(StdoutLoopLogger::new()),
    );
    let handle = detection_loop.spawn(Duration::from_millis(cli.tick_ms));
    let status = supervise(handle, cli.max_cycles)?;

    log::info!(
        "Finished after {} cycles ({} detections)",
        status.cycles,
        status.detection_calls
    );
    if let Some(dir) = &cli.output_dir {
        log::info!("Frames written to {}", dir.display());
    }
    Ok(())
}

/// Polls the loop until it finishes, the source ends or the cycle limit
/// is reached, logging the smoothed latency as it changes.
fn supervise(
    handle: LoopHandle,
    max_cycles: Option<u64>,
) -> Result<LoopStatus, Box<dyn std::error::Error>> {
    let mut last_stats = None;
    while !handle.is_finished() {
        let status = handle.status();
        if status.stats != last_stats {
            if let Some(stats) = status.stats {
                log::info!("time: {} ms, fps: {:.2}", stats.duration_ms, stats.fps);
            }
            last_stats = status.stats;
        }
        if status.source_ended {
            log::info!("Source ended");
            handle.stop();
        }
        if max_cycles.is_some_and(|max| status.detection_calls >= max) {
            handle.stop();
        }
        std::thread::sleep(STATUS_POLL_INTERVAL);
    }
    Ok(handle.join()?)
}

fn build_settings(cli: &Cli) -> Result<OverlaySettings, Box<dyn std::error::Error>> {
    let mut settings = match &cli.settings {
        Some(path) => OverlaySettings::load_from(path)?,
        None => OverlaySettings::load(),
    };

    if let Some(name) = &cli.mode {
        let mode = RenderMode::from_name(name);
        if mode.name() != name.trim().to_lowercase().replace('_', "-") {
            log::warn!("Unknown mode '{name}', using {mode}");
        }
        settings.render_mode = mode;
    }
    if let Some(color) = cli.color {
        settings.landmark_color = color;
    }
    if cli.no_lines {
        settings.draw_lines = false;
    }
    if cli.no_boxes {
        settings.show_boxes = false;
    }
    if cli.no_landmarks {
        settings.show_landmarks = false;
    }
    settings.detector = detector_config(cli, settings.detector);
    Ok(settings)
}

/// Applies detector flags on top of `base`. Switching variants starts from
/// that variant's defaults.
fn detector_config(cli: &Cli, base: DetectorConfig) -> DetectorConfig {
    let mut config = match cli.detector {
        Some(arg) if DetectorKind::from(arg) != base.kind() => DetectorConfig::for_kind(arg.into()),
        _ => base,
    };
    match &mut config {
        DetectorConfig::SsdMobilenetV1 { min_confidence } => {
            if let Some(v) = cli.min_confidence {
                *min_confidence = v;
            }
        }
        DetectorConfig::TinyFaceDetector {
            input_size,
            score_threshold,
        } => {
            if let Some(v) = cli.input_size {
                *input_size = v;
            }
            if let Some(v) = cli.score_threshold {
                *score_threshold = v;
            }
        }
        DetectorConfig::Mtcnn { min_face_size } => {
            if let Some(v) = cli.min_face_size {
                *min_face_size = v;
            }
        }
    }
    config
}

fn open_source(input: &Path) -> Result<Box<dyn CaptureSource>, Box<dyn std::error::Error>> {
    if is_image(input) {
        Ok(Box::new(StillImageSource::open(input)?))
    } else {
        Ok(Box::new(FfmpegCaptureSource::open(input)?))
    }
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input not found: {}", cli.input.display()).into());
    }
    if !cli.detections.exists() {
        return Err(format!("Detections file not found: {}", cli.detections.display()).into());
    }
    if let Some(dir) = &cli.sprites {
        if !dir.is_dir() {
            return Err(format!("Sprite directory not found: {}", dir.display()).into());
        }
    }
    for (flag, value) in [
        ("Min confidence", cli.min_confidence),
        ("Score threshold", cli.score_threshold),
    ] {
        if let Some(v) = value {
            if !(0.0..=1.0).contains(&v) {
                return Err(format!("{flag} must be between 0.0 and 1.0, got {v}").into());
            }
        }
    }
    if cli.input_size == Some(0) {
        return Err("Input size must be positive".into());
    }
    if cli.min_face_size == Some(0) {
        return Err("Min face size must be positive".into());
    }
    if cli.tick_ms == 0 {
        return Err("Tick interval must be at least 1 ms".into());
    }
    Ok(())
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::RecvTimeoutError;
use thiserror::Error;

use super::latency_tracker::{LatencyStats, LatencyTracker};
use super::loop_logger::LoopLogger;
use super::overlay_settings::{OverlaySettings, SettingsHandle};
use crate::detection::domain::detection::Detection;
use crate::detection::infrastructure::detector_worker::{DetectorWorker, Resolution, WorkerError};
use crate::overlay::domain::display_surface::DisplaySurface;
use crate::overlay::domain::geometry_mapper::{DisplayDimensions, GeometryMapper};
use crate::overlay::infrastructure::overlay_renderer::OverlayRenderer;
use crate::shared::constants::CANCEL_POLL_INTERVAL;
use crate::shared::frame::Frame;
use crate::video::domain::capture_source::{CaptureSource, PlaybackState};

#[derive(Debug, Error)]
pub enum LoopError {
    #[error(transparent)]
    Worker(#[from] WorkerError),
    #[error("detection loop thread panicked")]
    Panicked,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoopState {
    #[default]
    Idle,
    Detecting,
    Rendering,
}

/// How a single cycle ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CycleOutcome {
    /// Source not playing or detector not ready; nothing was called.
    Idle,
    NoFace,
    Rendered,
    /// A face was found but its overlay could not be planned.
    RenderFailed,
    /// Cancelled, possibly while a detection was pending.
    Stopped,
}

impl CycleOutcome {
    pub fn name(self) -> &'static str {
        match self {
            CycleOutcome::Idle => "idle",
            CycleOutcome::NoFace => "no-face",
            CycleOutcome::Rendered => "rendered",
            CycleOutcome::RenderFailed => "render-failed",
            CycleOutcome::Stopped => "stopped",
        }
    }
}

/// Snapshot published after every cycle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoopStatus {
    pub state: LoopState,
    pub cycles: u64,
    pub detection_calls: u64,
    pub last_outcome: Option<CycleOutcome>,
    pub stats: Option<LatencyStats>,
    pub source_ended: bool,
}

/// Drives capture → detect → render, one detection in flight at a time.
pub struct DetectionLoop {
    source: Box<dyn CaptureSource>,
    detector: DetectorWorker,
    surface: Box<dyn DisplaySurface>,
    settings: SettingsHandle,
    latency: LatencyTracker,
    logger: Box<dyn LoopLogger>,
    state: LoopState,
    cycles: u64,
    detection_calls: u64,
    cancelled: Arc<AtomicBool>,
    status: Arc<Mutex<LoopStatus>>,
}

impl DetectionLoop {
    pub fn new(
        source: Box<dyn CaptureSource>,
        detector: DetectorWorker,
        surface: Box<dyn DisplaySurface>,
        settings: SettingsHandle,
        logger: Box<dyn LoopLogger>,
    ) -> Self {
        Self {
            source,
            detector,
            surface,
            settings,
            latency: LatencyTracker::new(),
            logger,
            state: LoopState::Idle,
            cycles: 0,
            detection_calls: 0,
            cancelled: Arc::new(AtomicBool::new(false)),
            status: Arc::new(Mutex::new(LoopStatus::default())),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn latency(&self) -> &LatencyTracker {
        &self.latency
    }

    pub fn status(&self) -> LoopStatus {
        self.status.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Flag that stops the loop and abandons a pending detection.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    /// Runs one full cycle and returns to `Idle`.
    ///
    /// Once cancelled, returns `Stopped` without running, counting or
    /// publishing anything.
    pub fn run_cycle(&mut self) -> Result<CycleOutcome, LoopError> {
        if self.cancelled.load(Ordering::Relaxed) {
            return Ok(CycleOutcome::Stopped);
        }
        let result = self.cycle();
        self.state = LoopState::Idle;
        let outcome = result?;
        self.cycles += 1;
        self.logger.outcome(outcome);
        self.publish(Some(outcome));
        Ok(outcome)
    }

    fn cycle(&mut self) -> Result<CycleOutcome, LoopError> {
        let settings = self.settings.snapshot();
        if self.source.state() != PlaybackState::Playing || !self.detector.is_ready() {
            return Ok(CycleOutcome::Idle);
        }
        let Some(frame) = self.source.current_frame() else {
            return Ok(CycleOutcome::Idle);
        };

        self.state = LoopState::Detecting;
        let started = Instant::now();
        let pending =
            self.detector
                .submit(frame.clone(), settings.detector, settings.wants_landmarks())?;
        self.detection_calls += 1;
        let result = match pending.wait(&self.cancelled)? {
            Resolution::Resolved(result) => result,
            Resolution::Abandoned => return Ok(CycleOutcome::Stopped),
        };
        let elapsed = started.elapsed();
        self.latency.record(elapsed);
        self.logger.timing("detect", elapsed.as_secs_f64() * 1000.0);

        let detection = result.unwrap_or_else(|e| {
            log::warn!("Detection failed on frame {}: {e}", frame.index());
            None
        });

        self.state = LoopState::Rendering;
        let render_started = Instant::now();
        let outcome = match detection {
            Some(detection) => self.render(&frame, detection, &settings),
            None => {
                if settings.clears_when_no_face() {
                    self.surface.clear();
                }
                CycleOutcome::NoFace
            }
        };
        if let Err(e) = self.surface.present(&frame) {
            log::warn!("Failed to present frame {}: {e}", frame.index());
        }
        self.logger
            .timing("render", render_started.elapsed().as_secs_f64() * 1000.0);
        Ok(outcome)
    }

    fn render(
        &mut self,
        frame: &Frame,
        detection: Detection,
        settings: &OverlaySettings,
    ) -> CycleOutcome {
        let resized = GeometryMapper::resize(
            DisplayDimensions::Media(frame),
            self.surface.as_mut(),
            &[detection],
        );
        let Some(detection) = resized.first() else {
            return CycleOutcome::NoFace;
        };
        match OverlayRenderer::render(self.surface.as_mut(), detection, &settings.render_options()) {
            Ok(_) => CycleOutcome::Rendered,
            Err(e) => {
                log::debug!("Skipping overlay for frame {}: {e}", frame.index());
                CycleOutcome::RenderFailed
            }
        }
    }

    fn publish(&self, outcome: Option<CycleOutcome>) {
        let mut status = self.status.lock().unwrap_or_else(|e| e.into_inner());
        *status = LoopStatus {
            state: self.state,
            cycles: self.cycles,
            detection_calls: self.detection_calls,
            last_outcome: outcome.or(status.last_outcome),
            stats: self.latency.stats(),
            source_ended: self.source.state() == PlaybackState::Ended,
        };
    }

    /// Moves the loop onto its own thread, running one cycle per tick.
    ///
    /// Ticks that arrive while a cycle is still running are collapsed into
    /// one, so a slow detector never builds a backlog.
    pub fn spawn(mut self, tick: Duration) -> LoopHandle {
        let cancelled = self.cancelled.clone();
        let status = self.status.clone();
        let handle = std::thread::spawn(move || {
            let ticker = crossbeam_channel::tick(tick);
            self.logger.info(&format!(
                "Detection loop started (tick {} ms)",
                tick.as_millis()
            ));
            let result = loop {
                match self.run_cycle() {
                    Ok(CycleOutcome::Stopped) => break Ok(()),
                    Ok(_) => {}
                    Err(e) => {
                        log::error!("Detection loop stopped: {e}");
                        break Err(e);
                    }
                }
                if !wait_for_tick(&ticker, &self.cancelled) {
                    break Ok(());
                }
            };
            self.logger.info("Detection loop stopped");
            self.logger.summary();
            result
        });
        LoopHandle {
            cancelled,
            status,
            handle: Some(handle),
        }
    }
}

/// Returns `false` if cancelled before the next tick.
fn wait_for_tick(ticker: &crossbeam_channel::Receiver<Instant>, cancelled: &AtomicBool) -> bool {
    loop {
        if cancelled.load(Ordering::Relaxed) {
            return false;
        }
        match ticker.recv_timeout(CANCEL_POLL_INTERVAL) {
            Ok(_) => return !cancelled.load(Ordering::Relaxed),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => return false,
        }
    }
}

/// Control handle for a spawned [`DetectionLoop`].
pub struct LoopHandle {
    cancelled: Arc<AtomicBool>,
    status: Arc<Mutex<LoopStatus>>,
    handle: Option<JoinHandle<Result<(), LoopError>>>,
}

impl LoopHandle {
    /// Stops rescheduling and abandons a pending detection. Idempotent.
    pub fn stop(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn status(&self) -> LoopStatus {
        self.status.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Waits for the loop thread and returns its final status.
    pub fn join(mut self) -> Result<LoopStatus, LoopError> {
        if let Some(handle) = self.handle.take() {
            handle.join().map_err(|_| LoopError::Panicked)??;
        }
        Ok(self.status())
    }
}

impl Drop for LoopHandle {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.stop();
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::detection::FaceBox;
    use crate::detection::domain::detector_config::DetectorConfig;
    use crate::detection::domain::face_detector::{DetectError, FaceDetector};
    use crate::detection::domain::face_landmarks::fixtures::frontal_face;
    use crate::detection::domain::face_landmarks::FaceLandmarks;
    use crate::overlay::domain::display_surface::testing::RecordingSurface;
    use crate::overlay::domain::draw_command::DrawCommand;
    use crate::overlay::domain::render_mode::RenderMode;
    use crate::overlay::infrastructure::rgba_canvas::RgbaCanvas;
    use crate::overlay::infrastructure::sprite_sheet::SpriteSheet;
    use crate::pipeline::loop_logger::NullLoopLogger;
    use crate::shared::geometry::{Dimensions, Point};
    use crate::video::infrastructure::still_image_source::StillImageSource;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct Probe {
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        last_with_landmarks: AtomicBool,
    }

    #[derive(Clone, Copy)]
    enum Answer {
        Face,
        Nothing,
        Malformed,
        InfiniteBox,
        Fail,
        Crash,
    }

    struct StubDetector {
        probe: Arc<Probe>,
        answer: Answer,
        delay: Duration,
        loaded: bool,
    }

    impl StubDetector {
        fn new(probe: &Arc<Probe>, answer: Answer) -> Self {
            Self {
                probe: probe.clone(),
                answer,
                delay: Duration::ZERO,
                loaded: true,
            }
        }

        fn slow(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    impl FaceDetector for StubDetector {
        fn is_loaded(&self) -> bool {
            self.loaded
        }

        fn detect(
            &mut self,
            frame: &Frame,
            _config: &DetectorConfig,
            with_landmarks: bool,
        ) -> Result<Option<Detection>, DetectError> {
            let p = &self.probe;
            p.calls.fetch_add(1, Ordering::SeqCst);
            let now = p.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            p.max_in_flight.fetch_max(now, Ordering::SeqCst);
            p.last_with_landmarks.store(with_landmarks, Ordering::SeqCst);
            std::thread::sleep(self.delay);
            p.in_flight.fetch_sub(1, Ordering::SeqCst);

            let face = |landmarks: FaceLandmarks| {
                Detection::new(
                    FaceBox {
                        x: 120.0,
                        y: 140.0,
                        width: 200.0,
                        height: 220.0,
                        score: 0.95,
                    },
                    Dimensions::new(frame.width() / 2, frame.height() / 2),
                    Some(landmarks),
                )
            };
            match self.answer {
                Answer::Face => Ok(Some(face(frontal_face()))),
                Answer::Nothing => Ok(None),
                Answer::Malformed => {
                    let mut pts = frontal_face().points().to_vec();
                    pts[45] = Point::new(f64::NAN, 0.0);
                    Ok(Some(face(FaceLandmarks::new(pts))))
                }
                Answer::InfiniteBox => {
                    let mut detection = face(frontal_face());
                    detection.face_box.x = f64::NEG_INFINITY;
                    detection.face_box.width = f64::INFINITY;
                    Ok(Some(detection))
                }
                Answer::Fail => Err("inference failed".into()),
                Answer::Crash => panic!("detector crashed"),
            }
        }
    }

    struct PausedSource(Arc<Frame>);

    impl CaptureSource for PausedSource {
        fn state(&self) -> PlaybackState {
            PlaybackState::Paused
        }
        fn current_frame(&self) -> Option<Arc<Frame>> {
            Some(self.0.clone())
        }
        fn dimensions(&self) -> Dimensions {
            self.0.dimensions()
        }
    }

    #[derive(Clone, Default)]
    struct SharedSurface(Arc<Mutex<RecordingSurface>>);

    impl SharedSurface {
        fn with<R>(&self, f: impl FnOnce(&mut RecordingSurface) -> R) -> R {
            f(&mut self.0.lock().unwrap())
        }
    }

    impl DisplaySurface for SharedSurface {
        fn dimensions(&self) -> Dimensions {
            self.with(|s| s.dimensions())
        }
        fn set_dimensions(&mut self, dimensions: Dimensions) {
            self.with(|s| s.set_dimensions(dimensions))
        }
        fn clear(&mut self) {
            self.with(|s| s.clear())
        }
        fn draw(&mut self, command: &DrawCommand) {
            self.with(|s| s.draw(command))
        }
        fn present(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
            self.with(|s| s.present(frame))
        }
    }

    fn playing() -> Box<dyn CaptureSource> {
        Box::new(StillImageSource::from_frame(Frame::black(640, 480, 0)))
    }

    fn build(
        source: Box<dyn CaptureSource>,
        detector: StubDetector,
        settings: OverlaySettings,
    ) -> (DetectionLoop, SharedSurface, SettingsHandle) {
        let surface = SharedSurface::default();
        let handle = SettingsHandle::new(settings);
        let worker = DetectorWorker::spawn(Box::new(detector)).unwrap();
        let detection_loop = DetectionLoop::new(
            source,
            worker,
            Box::new(surface.clone()),
            handle.clone(),
            Box::new(NullLoopLogger),
        );
        (detection_loop, surface, handle)
    }

    #[test]
    fn test_paused_source_makes_no_detection_calls() {
        let probe = Arc::new(Probe::default());
        let source = Box::new(PausedSource(Arc::new(Frame::black(64, 48, 0))));
        let (mut dl, surface, _) = build(
            source,
            StubDetector::new(&probe, Answer::Face),
            OverlaySettings::default(),
        );

        for _ in 0..5 {
            assert_eq!(dl.run_cycle().unwrap(), CycleOutcome::Idle);
        }

        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
        assert!(dl.latency().is_empty());
        assert_eq!(dl.status().cycles, 5);
        assert_eq!(surface.with(|s| s.presented), 0);
    }

    #[test]
    fn test_unloaded_detector_idles() {
        let probe = Arc::new(Probe::default());
        let mut detector = StubDetector::new(&probe, Answer::Face);
        detector.loaded = false;
        let (mut dl, _, _) = build(playing(), detector, OverlaySettings::default());

        assert_eq!(dl.run_cycle().unwrap(), CycleOutcome::Idle);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_detection_is_resized_and_rendered_box_first() {
        let probe = Arc::new(Probe::default());
        let (mut dl, surface, _) = build(
            playing(),
            StubDetector::new(&probe, Answer::Face),
            OverlaySettings::default(),
        );

        assert_eq!(dl.run_cycle().unwrap(), CycleOutcome::Rendered);
        assert_eq!(dl.state(), LoopState::Idle);

        surface.with(|s| {
            assert_eq!(s.dims, Some(Dimensions::new(640, 480)));
            assert_eq!(s.presented, 1);
            // Detector ran at half resolution, so the box doubles.
            match &s.commands[0] {
                DrawCommand::StrokeRect { rect, .. } => {
                    assert_eq!(rect.x, 240.0);
                    assert_eq!(rect.width, 400.0);
                }
                other => panic!("expected box first, got {other:?}"),
            }
            assert!(s
                .commands
                .iter()
                .any(|c| matches!(c, DrawCommand::Line { .. })));
        });
        assert_eq!(dl.latency().len(), 1);
    }

    #[test]
    fn test_landmarks_requested_per_settings() {
        let probe = Arc::new(Probe::default());
        let settings = OverlaySettings {
            show_landmarks: false,
            ..OverlaySettings::default()
        };
        let (mut dl, _, handle) =
            build(playing(), StubDetector::new(&probe, Answer::Face), settings);

        dl.run_cycle().unwrap();
        assert!(!probe.last_with_landmarks.load(Ordering::SeqCst));

        handle.set_render_mode("glasses");
        dl.run_cycle().unwrap();
        assert!(probe.last_with_landmarks.load(Ordering::SeqCst));
    }

    #[test]
    fn test_malformed_detection_draws_nothing_and_loop_continues() {
        let probe = Arc::new(Probe::default());
        let settings = OverlaySettings {
            render_mode: RenderMode::Glasses,
            ..OverlaySettings::default()
        };
        let (mut dl, surface, _) =
            build(playing(), StubDetector::new(&probe, Answer::Malformed), settings);

        assert_eq!(dl.run_cycle().unwrap(), CycleOutcome::RenderFailed);
        assert!(surface.with(|s| s.commands.is_empty()));
        assert_eq!(dl.run_cycle().unwrap(), CycleOutcome::RenderFailed);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 2);
        assert_eq!(dl.latency().len(), 2);
    }

    #[test]
    fn test_infinite_box_fails_render_without_stopping_canvas_loop() {
        let probe = Arc::new(Probe::default());
        let worker =
            DetectorWorker::spawn(Box::new(StubDetector::new(&probe, Answer::InfiniteBox))).unwrap();
        let mut dl = DetectionLoop::new(
            playing(),
            worker,
            Box::new(RgbaCanvas::new(SpriteSheet::empty())),
            SettingsHandle::default(),
            Box::new(NullLoopLogger),
        );

        for _ in 0..3 {
            assert_eq!(dl.run_cycle().unwrap(), CycleOutcome::RenderFailed);
        }

        let handle = dl.spawn(Duration::from_millis(2));
        std::thread::sleep(Duration::from_millis(100));
        handle.stop();
        let status = handle.join().unwrap();
        assert!(status.cycles > 3);
        assert!(status.detection_calls > 3);
    }

    #[test]
    fn test_no_face_keeps_overlay_while_any_toggle_on() {
        let probe = Arc::new(Probe::default());
        let (mut dl, surface, _) = build(
            playing(),
            StubDetector::new(&probe, Answer::Nothing),
            OverlaySettings {
                show_landmarks: false,
                ..OverlaySettings::default()
            },
        );
        surface.with(|s| {
            s.draw(&DrawCommand::FillRect {
                rect: crate::shared::geometry::Rect::new(0.0, 0.0, 1.0, 1.0),
                color: crate::shared::color::Color::RED,
            })
        });

        assert_eq!(dl.run_cycle().unwrap(), CycleOutcome::NoFace);
        surface.with(|s| {
            assert_eq!(s.clears, 0);
            assert_eq!(s.commands.len(), 1);
        });
    }

    #[test]
    fn test_no_face_clears_when_both_toggles_off() {
        let probe = Arc::new(Probe::default());
        let (mut dl, surface, _) = build(
            playing(),
            StubDetector::new(&probe, Answer::Nothing),
            OverlaySettings {
                show_boxes: false,
                show_landmarks: false,
                ..OverlaySettings::default()
            },
        );

        assert_eq!(dl.run_cycle().unwrap(), CycleOutcome::NoFace);
        assert_eq!(surface.with(|s| s.clears), 1);
    }

    #[test]
    fn test_detector_error_counts_as_no_face_and_is_timed() {
        let probe = Arc::new(Probe::default());
        let (mut dl, _, _) = build(
            playing(),
            StubDetector::new(&probe, Answer::Fail),
            OverlaySettings::default(),
        );

        assert_eq!(dl.run_cycle().unwrap(), CycleOutcome::NoFace);
        assert_eq!(dl.latency().len(), 1);
        assert!(dl.status().stats.is_some());
    }

    #[test]
    fn test_rapid_ticks_never_overlap_detections() {
        let probe = Arc::new(Probe::default());
        let detector = StubDetector::new(&probe, Answer::Face).slow(Duration::from_millis(15));
        let (dl, _, _) = build(playing(), detector, OverlaySettings::default());

        let handle = dl.spawn(Duration::from_millis(1));
        std::thread::sleep(Duration::from_millis(200));
        handle.stop();
        let status = handle.join().unwrap();

        assert_eq!(probe.max_in_flight.load(Ordering::SeqCst), 1);
        assert!(probe.calls.load(Ordering::SeqCst) >= 2);
        assert_eq!(
            status.detection_calls as usize,
            probe.calls.load(Ordering::SeqCst)
        );
    }

    #[test]
    fn test_paused_loop_keeps_rescheduling() {
        let probe = Arc::new(Probe::default());
        let source = Box::new(PausedSource(Arc::new(Frame::black(64, 48, 0))));
        let (dl, _, _) = build(
            source,
            StubDetector::new(&probe, Answer::Face),
            OverlaySettings::default(),
        );

        let handle = dl.spawn(Duration::from_millis(2));
        std::thread::sleep(Duration::from_millis(100));
        handle.stop();
        let status = handle.join().unwrap();

        assert!(status.cycles > 1);
        assert_eq!(status.detection_calls, 0);
        assert_eq!(status.last_outcome, Some(CycleOutcome::Idle));
    }

    #[test]
    fn test_stop_abandons_pending_detection() {
        let probe = Arc::new(Probe::default());
        let detector = StubDetector::new(&probe, Answer::Face).slow(Duration::from_millis(300));
        let (dl, _, _) = build(playing(), detector, OverlaySettings::default());

        let handle = dl.spawn(Duration::from_millis(4));
        std::thread::sleep(Duration::from_millis(50));
        handle.stop();
        let status = handle.join().unwrap();

        assert_eq!(status.detection_calls, 1);
        assert_eq!(status.last_outcome, Some(CycleOutcome::Stopped));
        assert_eq!(status.stats, None);
    }

    #[test]
    fn test_dead_detector_surfaces_from_join() {
        let probe = Arc::new(Probe::default());
        let (dl, _, _) = build(
            playing(),
            StubDetector::new(&probe, Answer::Crash),
            OverlaySettings::default(),
        );

        let handle = dl.spawn(Duration::from_millis(4));
        let deadline = Instant::now() + Duration::from_secs(5);
        while !handle.is_finished() {
            assert!(Instant::now() < deadline, "loop did not stop");
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(matches!(
            handle.join(),
            Err(LoopError::Worker(WorkerError::Disconnected))
        ));
    }

    #[test]
    fn test_stopped_before_start_runs_no_cycle_work() {
        let probe = Arc::new(Probe::default());
        let (mut dl, _, _) = build(
            playing(),
            StubDetector::new(&probe, Answer::Face),
            OverlaySettings::default(),
        );
        dl.cancel_flag().store(true, Ordering::SeqCst);
        assert_eq!(dl.run_cycle().unwrap(), CycleOutcome::Stopped);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
        assert_eq!(dl.status(), LoopStatus::default());
    }
}

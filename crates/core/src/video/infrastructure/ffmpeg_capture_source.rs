use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::shared::constants::CANCEL_POLL_INTERVAL;
use crate::shared::frame::Frame;
use crate::shared::geometry::Dimensions;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::capture_source::{CaptureSource, PlaybackState};

type SendError = Box<dyn std::error::Error + Send + Sync>;

/// Pacing used when the stream declares no frame rate.
const FALLBACK_FRAME_INTERVAL: Duration = Duration::from_millis(33);

#[derive(Default)]
struct Playback {
    latest: Mutex<Option<Arc<Frame>>>,
    started: AtomicBool,
    paused: AtomicBool,
    ended: AtomicBool,
    cancelled: AtomicBool,
}

impl Playback {
    fn publish(&self, frame: Frame) {
        let mut latest = self.latest.lock().unwrap_or_else(|e| e.into_inner());
        *latest = Some(Arc::new(frame));
        self.started.store(true, Ordering::Release);
    }
}

/// Decodes a video file or capture URL on a background thread, publishing
/// frames at the stream's nominal rate the way a `<video>` element would.
pub struct FfmpegCaptureSource {
    playback: Arc<Playback>,
    metadata: VideoMetadata,
    handle: Option<JoinHandle<()>>,
}

impl FfmpegCaptureSource {
    /// Opens `path` and starts playing. Fails if the input cannot be opened
    /// or has no video stream.
    pub fn open(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let playback = Arc::new(Playback::default());
        let (meta_tx, meta_rx) = crossbeam_channel::bounded::<Result<VideoMetadata, SendError>>(1);

        let path_buf = path.to_path_buf();
        let thread_playback = playback.clone();
        let handle = std::thread::spawn(move || {
            let mut decoder = match FfmpegDecoder::open(&path_buf) {
                Ok(decoder) => decoder,
                Err(e) => {
                    let _ = meta_tx.send(Err(e.to_string().into()));
                    return;
                }
            };
            let _ = meta_tx.send(Ok(decoder.metadata.clone()));
            run_playback(&mut decoder, &thread_playback);
        });

        let metadata = match meta_rx.recv() {
            Ok(Ok(metadata)) => metadata,
            Ok(Err(e)) => {
                let _ = handle.join();
                return Err(e.to_string().into());
            }
            Err(_) => {
                let _ = handle.join();
                return Err("decoder thread exited before opening the input".into());
            }
        };
        log::info!(
            "Opened {} ({}x{} @ {:.2} fps, {})",
            path.display(),
            metadata.width,
            metadata.height,
            metadata.fps,
            metadata.codec
        );

        Ok(Self {
            playback,
            metadata,
            handle: Some(handle),
        })
    }

    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    pub fn pause(&self) {
        self.playback.paused.store(true, Ordering::Release);
    }

    pub fn resume(&self) {
        self.playback.paused.store(false, Ordering::Release);
    }
}

impl CaptureSource for FfmpegCaptureSource {
    fn state(&self) -> PlaybackState {
        let p = &self.playback;
        if p.ended.load(Ordering::Acquire) {
            PlaybackState::Ended
        } else if p.paused.load(Ordering::Acquire) || !p.started.load(Ordering::Acquire) {
            PlaybackState::Paused
        } else {
            PlaybackState::Playing
        }
    }

    fn current_frame(&self) -> Option<Arc<Frame>> {
        self.playback
            .latest
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn dimensions(&self) -> Dimensions {
        self.metadata.dimensions()
    }
}

impl Drop for FfmpegCaptureSource {
    fn drop(&mut self) {
        self.playback.cancelled.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Decoder thread panicked");
            }
        }
    }
}

fn run_playback(decoder: &mut FfmpegDecoder, playback: &Playback) {
    let interval = decoder
        .metadata
        .frame_interval()
        .unwrap_or(FALLBACK_FRAME_INTERVAL);
    let mut next_due = Instant::now();

    loop {
        if playback.cancelled.load(Ordering::Acquire) {
            return;
        }
        if playback.paused.load(Ordering::Acquire) {
            std::thread::sleep(CANCEL_POLL_INTERVAL);
            next_due = Instant::now();
            continue;
        }

        match decoder.next_frame() {
            Ok(Some(frame)) => playback.publish(frame),
            Ok(None) => break,
            Err(e) => {
                log::error!("Decoding failed: {e}");
                break;
            }
        }

        next_due += interval;
        let now = Instant::now();
        if next_due > now {
            std::thread::sleep(next_due - now);
        } else {
            next_due = now;
        }
    }
    playback.ended.store(true, Ordering::Release);
    log::info!("Capture source ended after {} frames", decoder.frame_index);
}

/// Pull-based RGB24 decoder over the best video stream of an input.
struct FfmpegDecoder {
    ictx: ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    video_stream_index: usize,
    metadata: VideoMetadata,
    frame_index: usize,
    flushing: bool,
    done: bool,
}

impl FfmpegDecoder {
    fn open(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let ictx = ffmpeg_next::format::input(path)?;
        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream found")?;

        let video_stream_index = stream.index();
        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;

        let rate = stream.rate();
        let fps = if rate.denominator() != 0 {
            rate.numerator() as f64 / rate.denominator() as f64
        } else {
            0.0
        };

        let metadata = VideoMetadata {
            width: decoder.width(),
            height: decoder.height(),
            fps,
            codec: decoder
                .codec()
                .map(|c| c.name().to_string())
                .unwrap_or_default(),
            source_path: Some(path.to_path_buf()),
        };

        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            metadata.width,
            metadata.height,
            ffmpeg_next::format::Pixel::RGB24,
            metadata.width,
            metadata.height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        Ok(Self {
            ictx,
            decoder,
            scaler,
            video_stream_index,
            metadata,
            frame_index: 0,
            flushing: false,
            done: false,
        })
    }

    fn try_receive(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        if self.decoder.receive_frame(&mut decoded).is_err() {
            return Ok(None);
        }
        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::empty();
        self.scaler.run(&decoded, &mut rgb_frame)?;

        let (width, height) = (self.metadata.width, self.metadata.height);
        let pixels = extract_rgb_pixels(&rgb_frame, width, height);
        let frame = Frame::new(pixels, width, height, 3, self.frame_index);
        self.frame_index += 1;
        Ok(Some(frame))
    }

    /// Next decoded frame, or `None` once the input and decoder are drained.
    fn next_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        if self.done {
            return Ok(None);
        }
        if let Some(frame) = self.try_receive()? {
            return Ok(Some(frame));
        }
        if self.flushing {
            self.done = true;
            return Ok(None);
        }

        loop {
            let Some((stream, packet)) = self.ictx.packets().next() else {
                let _ = self.decoder.send_eof();
                self.flushing = true;
                let frame = self.try_receive()?;
                self.done = frame.is_none();
                return Ok(frame);
            };
            if stream.index() != self.video_stream_index {
                continue;
            }
            if self.decoder.send_packet(&packet).is_err() {
                continue;
            }
            if let Some(frame) = self.try_receive()? {
                return Ok(Some(frame));
            }
        }
    }
}

/// Copies pixel data from an ffmpeg frame into a tightly packed RGB buffer,
/// dropping any per-row stride padding.
fn extract_rgb_pixels(
    rgb_frame: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);
    let w = width as usize;
    let h = height as usize;

    let mut pixels = Vec::with_capacity(w * h * 3);
    for row in 0..h {
        let row_start = row * stride;
        pixels.extend_from_slice(&data[row_start..row_start + w * 3]);
    }
    pixels
}

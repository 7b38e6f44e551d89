use crate::diagnostics::{MetricsSnapshot, PlaybackMetrics};
use crate::playback::cursor::TimelineCursor;
use crate::playback::frame::{prepare, Frame};
use crate::playback::source::{SourceOpener, VideoSource};
use crate::prelude::{PlaybackConfig, PlaybackError, PlaybackResult};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, error::TrySendError};

const SEND_RETRY: Duration = Duration::from_millis(2);
const DEFAULT_FPS: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    Stopped,
    Playing,
}

/// Snapshot of the engine for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub status: PlaybackStatus,
    pub source_path: Option<PathBuf>,
    pub elapsed_time: f64,
}

/// Consumer end of the frame channel. Frames left over from an earlier
/// session are discarded.
pub struct FrameReceiver {
    rx: mpsc::Receiver<Frame>,
    current: Arc<AtomicU64>,
}

impl FrameReceiver {
    pub fn try_next(&mut self) -> Option<Frame> {
        while let Ok(frame) = self.rx.try_recv() {
            if frame.session == self.current.load(Ordering::Acquire) {
                return Some(frame);
            }
            debug!("discarded frame {} of session {}", frame.index, frame.session);
        }
        None
    }

    /// Drains the channel and returns the newest frame.
    pub fn latest(&mut self) -> Option<Frame> {
        let mut newest = None;
        while let Some(frame) = self.try_next() {
            newest = Some(frame);
        }
        newest
    }
}

/// State shared with the decode worker.
struct Shared {
    playing: AtomicBool,
    /// Open source handle; released by whichever of `stop` or the worker gets
    /// there first.
    source: Mutex<Option<Box<dyn VideoSource + Send>>>,
    notice: Mutex<Option<String>>,
}

/// Plays one video source at a time on a background decode worker.
///
/// Frames go to a bounded channel and elapsed time to the [`TimelineCursor`];
/// the worker holds nothing else.
pub struct PlaybackEngine {
    opener: Arc<dyn SourceOpener>,
    config: PlaybackConfig,
    shared: Arc<Shared>,
    frames: mpsc::Sender<Frame>,
    cursor: TimelineCursor,
    metrics: Arc<PlaybackMetrics>,
    source_path: Option<PathBuf>,
    frame_rate: Option<f64>,
    worker: Option<JoinHandle<()>>,
    session: u64,
    current: Arc<AtomicU64>,
}

impl PlaybackEngine {
    pub fn new(opener: Arc<dyn SourceOpener>, config: PlaybackConfig) -> (Self, FrameReceiver) {
        let (frames, rx) = mpsc::channel(config.frame_capacity.max(1));
        let current = Arc::new(AtomicU64::new(0));
        let engine = Self {
            opener,
            config,
            shared: Arc::new(Shared {
                playing: AtomicBool::new(false),
                source: Mutex::new(None),
                notice: Mutex::new(None),
            }),
            frames,
            cursor: TimelineCursor::new(),
            metrics: Arc::new(PlaybackMetrics::new()),
            source_path: None,
            frame_rate: None,
            worker: None,
            session: 0,
            current: Arc::clone(&current),
        };
        (engine, FrameReceiver { rx, current })
    }

    /// Starts playing `path`, stopping any running session first.
    pub fn start(&mut self, path: &Path) -> PlaybackResult<()> {
        self.stop();

        let source = match self.opener.open(path) {
            Ok(source) => source,
            Err(err) => {
                warn!("playback not started: {}", err);
                self.set_notice(err.to_string());
                return Err(err);
            }
        };
        let (fps, period) = pacing(source.frame_rate())
            .or_else(|| pacing(Some(self.config.fallback_fps)))
            .or_else(|| pacing(Some(DEFAULT_FPS)))
            .unwrap_or((DEFAULT_FPS, Duration::from_millis(40)));

        self.cursor.reset();
        *lock(&self.shared.source) = Some(source);
        self.shared.playing.store(true, Ordering::Release);
        self.session += 1;
        self.current.store(self.session, Ordering::Release);

        let worker = DecodeWorker {
            shared: Arc::clone(&self.shared),
            frames: self.frames.clone(),
            cursor: self.cursor.clone(),
            metrics: Arc::clone(&self.metrics),
            session: self.session,
            fps,
            period,
            width: self.config.target_width.max(1),
            height: self.config.target_height.max(1),
        };
        let spawned = thread::Builder::new()
            .name(format!("playback-decode-{}", self.session))
            .spawn(move || worker.run());
        match spawned {
            Ok(handle) => self.worker = Some(handle),
            Err(err) => {
                self.shared.playing.store(false, Ordering::Release);
                lock(&self.shared.source).take();
                let err = PlaybackError::Decode(format!("spawning decode worker: {err}"));
                self.set_notice(err.to_string());
                return Err(err);
            }
        }

        self.metrics.record_started();
        self.source_path = Some(path.to_path_buf());
        self.frame_rate = Some(fps);
        self.set_notice(format!("Playing {} at {:.2} fps", path.display(), fps));
        info!("playback session {} started: {} at {:.2} fps", self.session, path.display(), fps);
        Ok(())
    }

    /// Stops playback and releases the source. Safe to call at any time.
    pub fn stop(&mut self) {
        let was_playing = self.shared.playing.swap(false, Ordering::AcqRel);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("decode worker for session {} panicked", self.session);
            }
        }
        if lock(&self.shared.source).take().is_some() {
            debug!("released video source of session {}", self.session);
        }
        if was_playing {
            self.set_notice("Playback stopped".into());
            info!("playback session {} stopped", self.session);
        }
    }

    pub fn status(&self) -> PlaybackStatus {
        if self.shared.playing.load(Ordering::Acquire) {
            PlaybackStatus::Playing
        } else {
            PlaybackStatus::Stopped
        }
    }

    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            status: self.status(),
            source_path: self.source_path.clone(),
            elapsed_time: self.cursor.elapsed(),
        }
    }

    pub fn cursor(&self) -> &TimelineCursor {
        &self.cursor
    }

    /// Frame rate the current or last session paces itself at.
    pub fn frame_rate(&self) -> Option<f64> {
        self.frame_rate
    }

    /// Number of the current or last session; frames carry the same number.
    pub fn session(&self) -> u64 {
        self.session
    }

    /// Latest informational message, e.g. why playback ended.
    pub fn notice(&self) -> Option<String> {
        lock(&self.shared.notice).clone()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    fn set_notice(&self, message: String) {
        *lock(&self.shared.notice) = Some(message);
    }
}

impl Drop for PlaybackEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

struct DecodeWorker {
    shared: Arc<Shared>,
    frames: mpsc::Sender<Frame>,
    cursor: TimelineCursor,
    metrics: Arc<PlaybackMetrics>,
    session: u64,
    fps: f64,
    period: Duration,
    width: u32,
    height: u32,
}

enum Step {
    Continue,
    Cancelled,
    Ended(String),
}

impl DecodeWorker {
    fn run(self) {
        let mut index = 0u64;
        let mut elapsed = 0.0;

        loop {
            if !self.shared.playing.load(Ordering::Acquire) {
                debug!("decode worker {} observed stop", self.session);
                return;
            }
            let started = Instant::now();

            match self.step(index, elapsed) {
                Step::Continue => {}
                Step::Cancelled => return,
                Step::Ended(reason) => {
                    self.finish(reason);
                    return;
                }
            }

            index += 1;
            elapsed += 1.0 / self.fps;
            self.cursor.publish(elapsed);
            thread::sleep(self.period.saturating_sub(started.elapsed()));
        }
    }

    fn step(&self, index: u64, elapsed: f64) -> Step {
        let read = match lock(&self.shared.source).as_mut() {
            Some(source) => source.read_frame(),
            None => return Step::Cancelled,
        };
        let raw = match read {
            Ok(Some(raw)) => raw,
            Ok(None) => return Step::Ended("end of stream".into()),
            Err(err) => return Step::Ended(err.to_string()),
        };
        let pixels = match prepare(raw, self.width, self.height) {
            Ok(pixels) => pixels,
            Err(err) => return Step::Ended(err.to_string()),
        };
        self.publish(Frame {
            session: self.session,
            index,
            elapsed,
            pixels,
        })
    }

    /// Hands the frame to the consumer without dropping it, retrying while the
    /// channel is full and playback has not been stopped.
    fn publish(&self, mut frame: Frame) -> Step {
        loop {
            match self.frames.try_send(frame) {
                Ok(()) => {
                    self.metrics.record_frame();
                    return Step::Continue;
                }
                Err(TrySendError::Full(back)) => {
                    if !self.shared.playing.load(Ordering::Acquire) {
                        return Step::Cancelled;
                    }
                    frame = back;
                    thread::sleep(SEND_RETRY);
                }
                Err(TrySendError::Closed(_)) => {
                    return Step::Ended("frame consumer closed".into());
                }
            }
        }
    }

    /// Releases the source before flipping to Stopped, so observers of the
    /// status never see a stopped engine that still holds a handle.
    fn finish(&self, reason: String) {
        lock(&self.shared.source).take();
        self.metrics.record_ended();
        info!("playback session {} ended: {}", self.session, reason);
        *lock(&self.shared.notice) = Some(format!("Playback ended: {reason}"));
        self.shared.playing.store(false, Ordering::Release);
    }
}

/// Frame rate and frame period for `rate`, if it can pace a session.
fn pacing(rate: Option<f64>) -> Option<(f64, Duration)> {
    let rate = rate.filter(|rate| rate.is_finite() && *rate > 0.0)?;
    let period = Duration::try_from_secs_f64(1.0 / rate).ok()?;
    Some((rate, period))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::frame::RawFrame;
    use crate::playback::source::MemoryOpener;

    fn config() -> PlaybackConfig {
        PlaybackConfig {
            target_width: 4,
            target_height: 2,
            fallback_fps: 25.0,
            frame_capacity: 4,
        }
    }

    fn clip(frames: usize) -> Vec<RawFrame> {
        vec![RawFrame::solid(8, 4, [200, 100, 50]); frames]
    }

    fn wait_until_stopped(engine: &PlaybackEngine, rx: &mut FrameReceiver) -> Vec<Frame> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut frames = Vec::new();
        while engine.status() == PlaybackStatus::Playing && Instant::now() < deadline {
            while let Some(frame) = rx.try_next() {
                frames.push(frame);
            }
            thread::sleep(Duration::from_millis(1));
        }
        while let Some(frame) = rx.try_next() {
            frames.push(frame);
        }
        frames
    }

    #[test]
    fn unopenable_source_stays_stopped() {
        let opener = Arc::new(MemoryOpener::new());
        let (mut engine, _rx) = PlaybackEngine::new(opener, config());
        let err = engine.start(Path::new("missing.mp4")).unwrap_err();
        assert!(matches!(err, PlaybackError::SourceUnavailable { .. }));
        assert_eq!(engine.status(), PlaybackStatus::Stopped);
        assert!(engine.notice().is_some());
    }

    #[test]
    fn stop_is_idempotent() {
        let opener = Arc::new(MemoryOpener::new());
        let (mut engine, _rx) = PlaybackEngine::new(opener, config());
        engine.stop();
        engine.stop();
        assert_eq!(engine.status(), PlaybackStatus::Stopped);
        assert_eq!(engine.notice(), None);
    }

    #[test]
    fn plays_to_end_of_stream_and_releases_source() {
        let opener = Arc::new(MemoryOpener::new().with_clip("burn.mp4", Some(500.0), clip(6)));
        let (mut engine, mut rx) = PlaybackEngine::new(opener.clone(), config());
        engine.start(Path::new("burn.mp4")).unwrap();

        let frames = wait_until_stopped(&engine, &mut rx);
        assert_eq!(engine.status(), PlaybackStatus::Stopped);
        assert_eq!(frames.len(), 6);
        assert_eq!(
            frames.iter().map(|f| f.index).collect::<Vec<_>>(),
            vec![0, 1, 2, 3, 4, 5]
        );
        assert_eq!(frames[0].pixels.shape(), &[2, 4, 4]);
        assert!((engine.cursor().elapsed() - 6.0 / 500.0).abs() < 1e-9);
        assert_eq!(opener.open_handles(), 0);

        let metrics = engine.metrics();
        assert_eq!(metrics.frames_published, 6);
        assert_eq!(metrics.sessions_ended, 1);
        assert!(engine.notice().unwrap().contains("end of stream"));
    }

    #[test]
    fn stop_interrupts_running_session() {
        let opener = Arc::new(MemoryOpener::new().with_clip("long.mp4", Some(100.0), clip(1000)));
        let (mut engine, mut rx) = PlaybackEngine::new(opener.clone(), config());
        engine.start(Path::new("long.mp4")).unwrap();
        assert_eq!(engine.status(), PlaybackStatus::Playing);
        thread::sleep(Duration::from_millis(30));
        let _ = rx.latest();

        engine.stop();
        assert_eq!(engine.status(), PlaybackStatus::Stopped);
        assert_eq!(opener.open_handles(), 0);
        let elapsed = engine.cursor().elapsed();
        assert!(elapsed < 10.0);
        thread::sleep(Duration::from_millis(30));
        assert_eq!(engine.cursor().elapsed(), elapsed);
        engine.stop();
    }

    #[test]
    fn stop_unblocks_worker_waiting_on_full_channel() {
        let opener = Arc::new(MemoryOpener::new().with_clip("long.mp4", Some(1000.0), clip(100)));
        let (mut engine, _rx) = PlaybackEngine::new(opener.clone(), config());
        engine.start(Path::new("long.mp4")).unwrap();
        thread::sleep(Duration::from_millis(50));
        assert_eq!(engine.status(), PlaybackStatus::Playing);
        engine.stop();
        assert_eq!(opener.open_handles(), 0);
        assert_eq!(engine.metrics().frames_published, 4);
    }

    #[test]
    fn restart_replaces_previous_session() {
        let opener = Arc::new(
            MemoryOpener::new()
                .with_clip("a.mp4", Some(100.0), clip(1000))
                .with_clip("b.mp4", None, clip(1000)),
        );
        let (mut engine, mut rx) = PlaybackEngine::new(opener.clone(), config());
        engine.start(Path::new("a.mp4")).unwrap();
        thread::sleep(Duration::from_millis(20));
        engine.start(Path::new("b.mp4")).unwrap();
        assert_eq!(opener.open_handles(), 1);
        assert_eq!(engine.session(), 2);
        assert_eq!(engine.frame_rate(), Some(25.0));
        assert_eq!(engine.state().source_path, Some(PathBuf::from("b.mp4")));

        thread::sleep(Duration::from_millis(100));
        let frames: Vec<Frame> = std::iter::from_fn(|| rx.try_next()).collect();
        assert!(!frames.is_empty());
        assert!(frames.iter().all(|frame| frame.session == 2));
        engine.stop();
        assert_eq!(opener.open_handles(), 0);
    }

    #[test]
    fn unusable_source_rate_falls_back() {
        let opener = Arc::new(
            MemoryOpener::new()
                .with_clip("tiny.mp4", Some(1e-30), clip(3))
                .with_clip("nan.mp4", Some(f64::NAN), clip(3)),
        );
        let (mut engine, mut rx) = PlaybackEngine::new(opener.clone(), config());
        for clip in ["tiny.mp4", "nan.mp4"] {
            engine.start(Path::new(clip)).unwrap();
            assert_eq!(engine.frame_rate(), Some(25.0));
            let frames = wait_until_stopped(&engine, &mut rx);
            assert_eq!(frames.len(), 3);
            assert_eq!(engine.status(), PlaybackStatus::Stopped);
            assert!(engine.notice().unwrap().contains("end of stream"));
        }
        assert_eq!(opener.open_handles(), 0);
    }

    #[test]
    fn stale_frames_are_skipped_after_restart() {
        let opener = Arc::new(
            MemoryOpener::new()
                .with_clip("a.mp4", Some(1000.0), clip(100))
                .with_clip("b.mp4", Some(1000.0), clip(2)),
        );
        let (mut engine, mut rx) = PlaybackEngine::new(opener, config());
        engine.start(Path::new("a.mp4")).unwrap();
        thread::sleep(Duration::from_millis(30));
        engine.start(Path::new("b.mp4")).unwrap();

        let frames = wait_until_stopped(&engine, &mut rx);
        assert_eq!(
            frames.iter().map(|f| (f.session, f.index)).collect::<Vec<_>>(),
            vec![(2, 0), (2, 1)]
        );
    }

    #[test]
    fn read_failure_ends_session_normally() {
        let opener = Arc::new(MemoryOpener::new().with_failing_clip(
            "bad.mp4",
            Some(500.0),
            clip(10),
            2,
        ));
        let (mut engine, mut rx) = PlaybackEngine::new(opener.clone(), config());
        engine.start(Path::new("bad.mp4")).unwrap();
        let frames = wait_until_stopped(&engine, &mut rx);
        assert_eq!(frames.len(), 2);
        assert_eq!(engine.status(), PlaybackStatus::Stopped);
        assert_eq!(opener.open_handles(), 0);
        engine.stop();
    }
}

use crate::playback::frame::RawFrame;
use crate::prelude::{PlaybackError, PlaybackResult};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Open video stream that yields decoded frames in order.
pub trait VideoSource {
    /// Native frame rate, if the container reports one.
    fn frame_rate(&self) -> Option<f64>;

    /// Next frame, or `None` at end of stream.
    fn read_frame(&mut self) -> PlaybackResult<Option<RawFrame>>;
}

/// Opens video sources by path; the engine's only link to a decoder.
pub trait SourceOpener: Send + Sync {
    fn open(&self, path: &Path) -> PlaybackResult<Box<dyn VideoSource + Send>>;
}

/// In-memory clip useful for tests and deterministic playback.
pub struct MemorySource {
    frame_rate: Option<f64>,
    frames: VecDeque<RawFrame>,
    fail_after: Option<usize>,
    served: usize,
    open_handles: Arc<AtomicUsize>,
}

impl VideoSource for MemorySource {
    fn frame_rate(&self) -> Option<f64> {
        self.frame_rate
    }

    fn read_frame(&mut self) -> PlaybackResult<Option<RawFrame>> {
        if self.fail_after == Some(self.served) {
            return Err(PlaybackError::Decode("scripted read failure".into()));
        }
        self.served += 1;
        Ok(self.frames.pop_front())
    }
}

impl Drop for MemorySource {
    fn drop(&mut self) {
        self.open_handles.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Clone)]
struct Clip {
    frame_rate: Option<f64>,
    frames: Vec<RawFrame>,
    fail_after: Option<usize>,
}

/// Serves registered in-memory clips and counts the handles still open.
#[derive(Default)]
pub struct MemoryOpener {
    clips: HashMap<PathBuf, Clip>,
    open_handles: Arc<AtomicUsize>,
}

impl MemoryOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clip(
        mut self,
        path: impl Into<PathBuf>,
        frame_rate: Option<f64>,
        frames: Vec<RawFrame>,
    ) -> Self {
        self.clips.insert(
            path.into(),
            Clip {
                frame_rate,
                frames,
                fail_after: None,
            },
        );
        self
    }

    /// Registers a clip whose reads fail once `frames_before_failure` frames were served.
    pub fn with_failing_clip(
        mut self,
        path: impl Into<PathBuf>,
        frame_rate: Option<f64>,
        frames: Vec<RawFrame>,
        frames_before_failure: usize,
    ) -> Self {
        self.clips.insert(
            path.into(),
            Clip {
                frame_rate,
                frames,
                fail_after: Some(frames_before_failure),
            },
        );
        self
    }

    pub fn open_handles(&self) -> usize {
        self.open_handles.load(Ordering::SeqCst)
    }
}

impl SourceOpener for MemoryOpener {
    fn open(&self, path: &Path) -> PlaybackResult<Box<dyn VideoSource + Send>> {
        let clip = self
            .clips
            .get(path)
            .cloned()
            .ok_or_else(|| PlaybackError::SourceUnavailable {
                path: path.to_path_buf(),
                reason: "no such clip".into(),
            })?;
        self.open_handles.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemorySource {
            frame_rate: clip.frame_rate,
            frames: clip.frames.into(),
            fail_after: clip.fail_after,
            served: 0,
            open_handles: Arc::clone(&self.open_handles),
        }))
    }
}

use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use firecore::playback::{FfmpegOpener, FrameReceiver, SourceOpener};
use firecore::prelude::IntervalError;
use firecore::{is_playable_video, IntervalBounds, Session, SummaryStats};
use log::warn;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct WorkflowResult {
    pub capture: PathBuf,
    pub samples: usize,
    pub overall: SummaryStats,
    pub interval: Option<SummaryStats>,
    pub bounds: Option<IntervalBounds>,
    pub notices: Vec<String>,
    pub video: Option<PathBuf>,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    /// Session decoding video through the configured ffmpeg executables.
    pub fn session(&self) -> (Session, FrameReceiver) {
        let opener = FfmpegOpener::new(&self.config.ffmpeg, &self.config.ffprobe);
        self.session_with(Arc::new(opener))
    }

    pub fn session_with(&self, opener: Arc<dyn SourceOpener>) -> (Session, FrameReceiver) {
        Session::new(self.config.to_session_config(), opener)
    }

    /// Loads `capture` into the session and, when `bounds` is given, replaces the
    /// default interval. An empty interval is reported as a notice.
    pub fn execute(
        &self,
        session: &mut Session,
        capture: &Path,
        bounds: Option<IntervalBounds>,
    ) -> anyhow::Result<WorkflowResult> {
        session
            .reload(capture)
            .with_context(|| format!("loading capture {}", capture.display()))?;

        let mut notices = session.notices().to_vec();
        if let Some(bounds) = bounds {
            match session.recompute_interval(bounds) {
                Ok(_) => {}
                Err(err @ IntervalError::Empty { .. }) => {
                    warn!("{}", err);
                    notices.push(format!("{err}; showing the default interval"));
                }
                Err(err) => return Err(err).context("selecting interval"),
            }
        }

        Ok(WorkflowResult {
            capture: capture.to_path_buf(),
            samples: session.series().len(),
            overall: *session.overall(),
            interval: session.interval().copied(),
            bounds: session.bounds(),
            notices,
            video: session.video_path(),
        })
    }
}

/// Video to show next to a capture. A directory scan already honours the
/// capture's `video_path`, so its result wins; otherwise the declared video is
/// used only when it is an existing video file.
pub fn choose_video(scanned: Option<PathBuf>, declared: Option<PathBuf>) -> Option<PathBuf> {
    scanned.or_else(|| declared.filter(|path| is_playable_video(path)))
}

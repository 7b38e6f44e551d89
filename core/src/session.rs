use crate::capture::TelemetryCapture;
use crate::diagnostics::LogManager;
use crate::playback::{FrameReceiver, PlaybackEngine, PlaybackStatus, SourceOpener, TimelineCursor};
use crate::prelude::{IntervalError, LoadResult, PlaybackError, PlaybackResult, SessionConfig};
use crate::processing::{reduce, select, summarize, CalibratedSeries, IntervalBounds, SummaryStats};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything the application shell shows for one loaded capture.
///
/// Telemetry and playback are failure-isolated: a failed reload keeps the last
/// good capture and never touches playback, and playback errors never touch
/// telemetry.
pub struct Session {
    config: SessionConfig,
    logger: LogManager,
    capture_path: Option<PathBuf>,
    capture: Option<TelemetryCapture>,
    series: CalibratedSeries,
    overall: SummaryStats,
    bounds: Option<IntervalBounds>,
    interval: Option<SummaryStats>,
    notices: Vec<String>,
    playback: PlaybackEngine,
}

impl Session {
    pub fn new(config: SessionConfig, opener: Arc<dyn SourceOpener>) -> (Self, FrameReceiver) {
        let (playback, frames) = PlaybackEngine::new(opener, config.playback.clone());
        let session = Self {
            config,
            logger: LogManager::for_component("session"),
            capture_path: None,
            capture: None,
            series: CalibratedSeries::default(),
            overall: SummaryStats::default(),
            bounds: None,
            interval: None,
            notices: Vec::new(),
            playback,
        };
        (session, frames)
    }

    /// Loads a capture and recomputes the series, the whole-capture summary and
    /// the default interval. On error the previous state is kept.
    pub fn reload<P: AsRef<Path>>(&mut self, path: P) -> LoadResult<&SummaryStats> {
        let path = path.as_ref();
        let capture = TelemetryCapture::load(path).map_err(|err| {
            self.logger
                .notice(&format!("reload of {} rejected: {}", path.display(), err));
            err
        })?;

        let series = reduce(&capture, &self.logger);
        let mut notices: Vec<String> = capture
            .channel_faults
            .iter()
            .map(|fault| fault.to_string())
            .collect();

        self.overall = summarize(series.full());
        self.bounds = IntervalBounds::initial(&series, self.config.interval_trim);
        self.interval = None;
        if let Some(bounds) = self.bounds {
            match select(series.time(), bounds) {
                Ok(range) => self.interval = Some(summarize(series.slice(range))),
                Err(err) => notices.push(err.to_string()),
            }
        }

        self.logger.record(&format!(
            "loaded {}: {} samples, impulse {:.2} Ns, designation {}",
            path.display(),
            series.len(),
            self.overall.total_impulse,
            self.overall.designation()
        ));
        self.series = series;
        self.capture = Some(capture);
        self.capture_path = Some(path.to_path_buf());
        self.notices = notices;
        Ok(&self.overall)
    }

    /// Summarizes the interval between two cursor positions. The cursors are
    /// clamped to the capture; an empty selection leaves the session unchanged.
    pub fn recompute_interval(
        &mut self,
        bounds: IntervalBounds,
    ) -> Result<&SummaryStats, IntervalError> {
        if self.series.is_empty() {
            return Err(IntervalError::NoSeries);
        }
        let bounds = bounds.clamped(&self.series);
        let range = select(self.series.time(), bounds)?;
        self.bounds = Some(bounds);
        Ok(self.interval.insert(summarize(self.series.slice(range))))
    }

    /// Stops playback if it is running, otherwise starts it on `source` or on
    /// the video declared by the capture.
    pub fn toggle_playback(&mut self, source: Option<&Path>) -> PlaybackResult<PlaybackStatus> {
        if self.playback.status() == PlaybackStatus::Playing {
            self.playback.stop();
            return Ok(PlaybackStatus::Stopped);
        }
        let path = source
            .map(Path::to_path_buf)
            .or_else(|| self.video_path())
            .ok_or_else(|| PlaybackError::SourceUnavailable {
                path: PathBuf::new(),
                reason: "no video selected".into(),
            })?;
        self.playback.start(&path)?;
        Ok(self.playback.status())
    }

    pub fn series(&self) -> &CalibratedSeries {
        &self.series
    }

    pub fn overall(&self) -> &SummaryStats {
        &self.overall
    }

    pub fn interval(&self) -> Option<&SummaryStats> {
        self.interval.as_ref()
    }

    pub fn bounds(&self) -> Option<IntervalBounds> {
        self.bounds
    }

    pub fn capture(&self) -> Option<&TelemetryCapture> {
        self.capture.as_ref()
    }

    pub fn capture_path(&self) -> Option<&Path> {
        self.capture_path.as_deref()
    }

    /// Video declared by the loaded capture.
    pub fn video_path(&self) -> Option<PathBuf> {
        self.capture
            .as_ref()
            .and_then(|capture| capture.video_reference.clone())
    }

    /// Degradations found by the last successful reload.
    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    pub fn playback(&self) -> &PlaybackEngine {
        &self.playback
    }

    pub fn playback_mut(&mut self) -> &mut PlaybackEngine {
        &mut self.playback
    }

    pub fn cursor(&self) -> &TimelineCursor {
        self.playback.cursor()
    }
}

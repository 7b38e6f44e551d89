use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Settings for one analysis session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Fraction trimmed from each end of the series for the initial interval.
    pub interval_trim: f64,
    pub playback: PlaybackConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            interval_trim: 0.05,
            playback: PlaybackConfig::default(),
        }
    }
}

/// Settings for the playback engine's decode loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub target_width: u32,
    pub target_height: u32,
    /// Used when the source reports no frame rate or a non-positive one.
    pub fallback_fps: f64,
    pub frame_capacity: usize,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            target_width: 640,
            target_height: 360,
            fallback_fps: 25.0,
            frame_capacity: 8,
        }
    }
}

/// Sensor channel carried by a capture file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Channel {
    LoadCell,
    PressureTransducer,
}

impl Channel {
    pub fn key(self) -> &'static str {
        match self {
            Channel::LoadCell => "load_cell_voltages_mv",
            Channel::PressureTransducer => "pressure_transducer_voltages_v",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::LoadCell => write!(f, "load cell"),
            Channel::PressureTransducer => write!(f, "pressure transducer"),
        }
    }
}

/// Why a sensor channel degraded to an empty series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFault {
    Missing,
    Malformed,
}

impl fmt::Display for FieldFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldFault::Missing => write!(f, "missing"),
            FieldFault::Malformed => write!(f, "malformed"),
        }
    }
}

/// A sensor channel that was absent or malformed. Absorbed by the loader and
/// recorded on the capture; the channel continues as an empty series.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{channel} channel {reason}; continuing without it")]
pub struct PartialFieldError {
    pub channel: Channel,
    pub reason: FieldFault,
}

/// The mandatory time series is unusable.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FatalDataError {
    #[error("capture has no time_values_seconds series")]
    MissingTime,
    #[error("time_values_seconds is not a sequence of numbers")]
    MalformedTime,
    #[error("time_values_seconds is empty")]
    EmptyTime,
    #[error("time_values_seconds decreases at index {index}")]
    NonMonotonicTime { index: usize },
}

/// Failures that abort a capture load. The caller keeps its last good state.
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("reading capture {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing capture: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unusable capture: {0}")]
    FatalData(#[from] FatalDataError),
}

/// Interval selection failures; never mutate session state.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum IntervalError {
    #[error("no data in interval [{min_time:.3} s, {max_time:.3} s]")]
    Empty { min_time: f64, max_time: f64 },
    #[error("no capture loaded")]
    NoSeries,
}

/// Playback failures; never touch telemetry state.
#[derive(thiserror::Error, Debug, Clone)]
pub enum PlaybackError {
    #[error("video source {path} unavailable: {reason}")]
    SourceUnavailable { path: PathBuf, reason: String },
    #[error("decode failure: {0}")]
    Decode(String),
}

pub type LoadResult<T> = Result<T, LoadError>;
pub type PlaybackResult<T> = Result<T, PlaybackError>;

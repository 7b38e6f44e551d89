use crate::prelude::IntervalError;
use crate::processing::align::CalibratedSeries;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Pair of cursor positions, in seconds, bounding a user-selected interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntervalBounds {
    pub min_time: f64,
    pub max_time: f64,
}

impl IntervalBounds {
    pub fn new(min_time: f64, max_time: f64) -> Self {
        Self { min_time, max_time }
    }

    /// Initial bounds trimming `trim` of the samples from each end, so start-up
    /// and shutdown transients fall outside the first interval.
    pub fn initial(series: &CalibratedSeries, trim: f64) -> Option<Self> {
        let time = series.time();
        let last = time.len().checked_sub(1)?;
        let trim = trim.clamp(0.0, 0.5);
        let index = |fraction: f64| ((fraction * time.len() as f64).floor() as usize).min(last);
        Some(Self {
            min_time: time[index(trim)],
            max_time: time[index(1.0 - trim)],
        })
    }

    /// Clamps both cursors into `[time[0], time[N-1]]`. Empty series leave the
    /// bounds unchanged.
    pub fn clamped(self, series: &CalibratedSeries) -> Self {
        match (series.time().first(), series.time().last()) {
            (Some(&first), Some(&last)) => Self {
                min_time: self.min_time.clamp(first, last),
                max_time: self.max_time.clamp(first, last),
            },
            _ => self,
        }
    }
}

/// Maps cursor positions onto an index range `[start, end)` of `time`.
///
/// `start` is the last index with `time <= min_time` (or `0`), `end` the last
/// index with `time <= max_time`. An empty range is an error so callers can
/// report it instead of showing zeroed statistics.
pub fn select(time: &[f64], bounds: IntervalBounds) -> Result<Range<usize>, IntervalError> {
    let mut start = 0;
    let mut end = None;
    for (index, &value) in time.iter().enumerate() {
        if value <= bounds.min_time {
            start = index;
        }
        if value <= bounds.max_time {
            end = Some(index);
        }
    }

    match end {
        Some(end) if end > start => Ok(start..end),
        _ => Err(IntervalError::Empty {
            min_time: bounds.min_time,
            max_time: bounds.max_time,
        }),
    }
}

use std::ops::Range;

/// Calibrated time, thrust and pressure series.
///
/// `time` has length `N` and is non-decreasing. Each sensor channel has
/// either length `N` or is empty when that channel carried no data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalibratedSeries {
    time: Vec<f64>,
    thrust: Vec<f64>,
    pressure: Vec<f64>,
}

/// Borrowed contiguous sub-range of a [`CalibratedSeries`].
#[derive(Debug, Clone, Copy)]
pub struct SeriesSlice<'a> {
    pub time: &'a [f64],
    pub thrust: &'a [f64],
    pub pressure: &'a [f64],
}

impl CalibratedSeries {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn thrust(&self) -> &[f64] {
        &self.thrust
    }

    pub fn pressure(&self) -> &[f64] {
        &self.pressure
    }

    pub fn full(&self) -> SeriesSlice<'_> {
        self.slice(0..self.len())
    }

    /// Sub-range `[start, end)`, clipped to the series. Empty channels stay empty.
    pub fn slice(&self, range: Range<usize>) -> SeriesSlice<'_> {
        let end = range.end.min(self.len());
        let start = range.start.min(end);
        SeriesSlice {
            time: self.time.get(start..end).unwrap_or(&[]),
            thrust: self.thrust.get(start..end).unwrap_or(&[]),
            pressure: self.pressure.get(start..end).unwrap_or(&[]),
        }
    }
}

/// Front-aligns the three series to a common length.
///
/// `N` is the shortest non-empty input, or zero when `time` is empty. Longer
/// series are truncated to `[0, N)`; samples are never interpolated.
pub fn align(time: Vec<f64>, thrust: Vec<f64>, pressure: Vec<f64>) -> CalibratedSeries {
    let n = if time.is_empty() {
        0
    } else {
        [&time, &thrust, &pressure]
            .iter()
            .filter(|series| !series.is_empty())
            .map(|series| series.len())
            .min()
            .unwrap_or(0)
    };

    let truncate = |mut series: Vec<f64>| {
        series.truncate(n);
        series
    };

    CalibratedSeries {
        time: truncate(time),
        thrust: truncate(thrust),
        pressure: truncate(pressure),
    }
}

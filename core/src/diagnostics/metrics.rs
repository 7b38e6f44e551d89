use std::sync::Mutex;

/// Counters for playback sessions, shared between the engine and its workers.
pub struct PlaybackMetrics {
    inner: Mutex<MetricsSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub sessions_started: usize,
    pub frames_published: usize,
    /// Sessions that ended on end-of-stream or a read failure.
    pub sessions_ended: usize,
}

impl PlaybackMetrics {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_started(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.sessions_started += 1;
        }
    }

    pub fn record_frame(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.frames_published += 1;
        }
    }

    pub fn record_ended(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.sessions_ended += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl Default for PlaybackMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let metrics = PlaybackMetrics::new();
        metrics.record_started();
        metrics.record_frame();
        metrics.record_frame();
        metrics.record_ended();
        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                sessions_started: 1,
                frames_published: 2,
                sessions_ended: 1,
            }
        );
    }
}

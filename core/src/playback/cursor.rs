use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Elapsed playback time shared between the decode worker and the plots.
///
/// Single writer, any number of readers; reads never block and always return
/// the last published value.
#[derive(Debug, Clone, Default)]
pub struct TimelineCursor {
    bits: Arc<AtomicU64>,
}

impl TimelineCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, elapsed_seconds: f64) {
        self.bits.store(elapsed_seconds.to_bits(), Ordering::Release);
    }

    pub fn elapsed(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    pub fn reset(&self) {
        self.publish(0.0);
    }
}

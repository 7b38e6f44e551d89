use log::{info, warn};

/// Records pipeline messages under a fixed component prefix.
pub struct LogManager {
    component: &'static str,
}

impl LogManager {
    pub fn new() -> Self {
        Self::for_component("firecore")
    }

    pub fn for_component(component: &'static str) -> Self {
        Self { component }
    }

    pub fn record(&self, message: &str) {
        info!("[{}] {}", self.component, message);
    }

    pub fn notice(&self, message: &str) {
        warn!("[{}] {}", self.component, message);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}

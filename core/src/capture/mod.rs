pub mod discover;
pub mod loader;

pub use discover::{discover, is_playable_video, DiscoveredFiles};
pub use loader::TelemetryCapture;

//! Data-reduction and synchronized playback core for rocket-motor static-fire tests.
//!
//! A capture's raw load-cell and pressure-transducer voltages are calibrated,
//! aligned against the timebase and summarized (burn time, averages, peaks,
//! total impulse, motor class), for the whole burn and for a user-selected
//! interval. Independently, the test video is decoded on a background worker
//! whose timeline cursor keeps the plots in step with the frames.

pub mod capture;
pub mod diagnostics;
pub mod math;
pub mod playback;
pub mod prelude;
pub mod processing;
pub mod session;

pub use capture::{discover, is_playable_video, DiscoveredFiles, TelemetryCapture};
pub use playback::{FrameReceiver, PlaybackEngine, PlaybackStatus, TimelineCursor};
pub use prelude::{IntervalError, LoadError, PlaybackError, SessionConfig};
pub use processing::{CalibratedSeries, IntervalBounds, MotorClass, SummaryStats};
pub use session::Session;

pub mod cursor;
pub mod engine;
pub mod ffmpeg;
pub mod frame;
pub mod source;

pub use cursor::TimelineCursor;
pub use engine::{FrameReceiver, PlaybackEngine, PlaybackState, PlaybackStatus};
pub use ffmpeg::FfmpegOpener;
pub use frame::{Frame, RawFrame};
pub use source::{MemoryOpener, MemorySource, SourceOpener, VideoSource};

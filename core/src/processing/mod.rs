pub mod align;
pub mod convert;
pub mod interval;
pub mod reduce;
pub mod summary;

pub use align::{align, CalibratedSeries, SeriesSlice};
pub use interval::{select, IntervalBounds};
pub use reduce::reduce;
pub use summary::{summarize, MotorClass, SummaryStats};

pub mod integrate;
pub mod stats;

pub use integrate::simpson;
pub use stats::StatsHelper;

pub mod stats;

pub use stats::{FtpStatistics, StatisticsSnapshot};

pub mod stats;

pub use stats::{round_one_decimal, StatsAggregator};

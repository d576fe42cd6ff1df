//! Publishing statistics

pub mod metrics;

pub use metrics::{PublishStats, StatsSnapshot};

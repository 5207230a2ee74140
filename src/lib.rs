pub mod aggregate;
pub mod cache;
pub mod config;
pub mod duration;
pub mod identity;
pub mod model;
pub mod parser;
pub mod rank;
pub mod report;
pub mod season;
pub mod stats;

pub use model::{Scrobble, StatisticsBundle, TrackStats};
pub use stats::StatsPipeline;

pub fn compute_statistics() -> anyhow::Result<StatisticsBundle> {
    let config = config::StatsConfig::from_env()?;
    StatsPipeline::from_config(&config).compute_statistics()
}

mod config;
mod crawler;
mod extract;
mod fetch;
mod frontier;
mod progress;
mod urls;

pub use config::CrawlerConfig;
pub use crawler::{crawl_seed, run_batch, Attempt, JobStatus, SeedReport};
pub use progress::{LogSink, ProgressSink};

pub use anyhow;

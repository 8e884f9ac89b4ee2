use std::env;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use mailsift_crawler::{run_batch, CrawlerConfig, JobStatus, LogSink, SeedReport};
use serde::Serialize;
use tokio::runtime;

/// Crawl websites and harvest contact email addresses
#[derive(Debug, Parser)]
#[command(version)]
pub struct Args {
    /// Seed URLs, each crawled as an independent job
    #[arg(required = true)]
    pub seeds: Vec<String>,
    /// Optional default crawler yaml configuration file
    #[arg(env = "MAILSIFT_CRAWLER_CONFIG", long)]
    pub crawler_config: Option<PathBuf>,
    /// Override crawler's number of workers (and in-flight request bound) per seed
    #[arg(long)]
    pub max_workers: Option<usize>,
    /// Override crawler's page budget per seed
    #[arg(long)]
    pub max_pages: Option<usize>,
    /// Override crawler's per-request timeout in seconds
    #[arg(long)]
    pub fetch_timeout: Option<u64>,
    /// Override crawler's user agent pool (repeat to add several)
    #[arg(long = "user-agent")]
    pub user_agents: Vec<String>,
    /// Job identifier used in progress reports
    #[arg(long, default_value = "mailsift")]
    pub job_id: String,
    /// Path to the output file that will contain harvested emails (stdout by default)
    #[arg(long, short)]
    pub output_file: Option<PathBuf>,
    /// When quiet no logs are outputted
    #[arg(long, short)]
    pub quiet: bool,
}

impl TryFrom<&Args> for CrawlerConfig {
    type Error = anyhow::Error;

    fn try_from(args: &Args) -> Result<Self, Self::Error> {
        let mut conf = if let Some(file) = args.crawler_config.as_ref().map(File::open) {
            serde_yaml::from_reader(file?)?
        } else {
            CrawlerConfig::default()
        };
        if let Some(max_workers) = args.max_workers {
            conf.max_workers = max_workers;
        }
        if let Some(max_pages) = args.max_pages {
            conf.max_pages = max_pages;
        }
        if let Some(fetch_timeout) = args.fetch_timeout {
            conf.fetch_timeout = fetch_timeout;
        }
        if !args.user_agents.is_empty() {
            conf.user_agents = args.user_agents.clone();
        }
        Ok(conf)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SeedOutput {
    seed_url: String,
    status: JobStatus,
    pages_fetched: usize,
    emails: Vec<String>,
}

impl From<&SeedReport> for SeedOutput {
    fn from(report: &SeedReport) -> Self {
        let mut emails: Vec<String> = report.emails.iter().cloned().collect();
        emails.sort();
        Self {
            seed_url: report.seed_url.clone(),
            status: report.status,
            pages_fetched: report.pages_fetched,
            emails,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if !args.quiet {
        env::set_var("RUST_LOG", "mailsift_crawler=warn,mailsift=info");
        env_logger::init();
    }

    let conf: CrawlerConfig = (&args).try_into()?;
    anyhow::ensure!(conf.max_workers >= 1, "maxWorkers must be at least 1");
    anyhow::ensure!(conf.max_pages >= 1, "maxPages must be at least 1");

    let rt = runtime::Builder::new_multi_thread().enable_all().build()?;
    let reports = rt.block_on(run_batch(&args.job_id, &args.seeds, &conf, &LogSink));

    let outputs: Vec<SeedOutput> = reports.iter().map(SeedOutput::from).collect();
    match &args.output_file {
        Some(path) => {
            serde_json::to_writer_pretty(File::create(path)?, &outputs)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            serde_json::to_writer_pretty(&mut handle, &outputs)?;
            writeln!(handle)?;
        }
    }

    Ok(())
}

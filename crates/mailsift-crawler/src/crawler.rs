use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use url::Url;

use crate::config::CrawlerConfig;
use crate::extract::{extract_emails, extract_links};
use crate::fetch::{FetchOutcome, Fetcher};
use crate::frontier::Frontier;
use crate::progress::ProgressSink;
use crate::urls;

/// Reason tag recorded for every URL the crawl has dealt with. A URL with
/// any tag is terminal: it is never re-enqueued and never fetched again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Attempt {
    Fetched,
    WrongContentType,
    DisallowedExtension,
    HttpError,
    TransportError,
}

impl Attempt {
    /// Extension-skipped URLs were never fetch attempts, so they are the
    /// one tag that does not consume page budget.
    fn counts_against_budget(self) -> bool {
        !matches!(self, Attempt::DisallowedExtension)
    }
}

/// Terminal state of one seed's crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum JobStatus {
    /// The frontier drained naturally.
    Completed,
    /// The page budget was fully committed before the frontier drained.
    Exhausted,
    /// The crawl could not be started.
    Failed,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    pub seed_url: String,
    pub emails: HashSet<String>,
    /// Number of pages actually attempted, always <= maxPages.
    pub pages_fetched: usize,
    pub status: JobStatus,
    /// Terminal classification of every URL considered, by normalized URL.
    pub attempted: HashMap<String, Attempt>,
}

impl SeedReport {
    fn failed(seed: &str) -> Self {
        Self {
            seed_url: seed.to_string(),
            emails: HashSet::new(),
            pages_fetched: 0,
            status: JobStatus::Failed,
            attempted: HashMap::new(),
        }
    }
}

/// Shared per-job crawl state: one lock over the dedup sets, the email set
/// and the budget, so admission is an atomic check-and-enqueue and the
/// page budget can never overshoot.
struct JobState {
    base: Url,
    max_pages: usize,
    inner: Mutex<StateInner>,
}

struct StateInner {
    /// URLs with a terminal outcome.
    attempted: HashMap<String, Attempt>,
    /// URLs admitted to the frontier, kept here from admission until their
    /// terminal outcome lands so an in-flight URL cannot be re-admitted.
    enqueued: HashSet<String>,
    emails: HashSet<String>,
    /// Budget-counted admissions, ever. Monotone, bounded by max_pages.
    budget_used: usize,
    /// Set once a same-domain link is turned away for budget reasons.
    budget_hit: bool,
}

impl JobState {
    fn new(base: Url, max_pages: usize) -> Self {
        Self {
            base,
            max_pages,
            inner: Mutex::new(StateInner {
                attempted: HashMap::new(),
                enqueued: HashSet::new(),
                emails: HashSet::new(),
                budget_used: 0,
                budget_hit: false,
            }),
        }
    }

    /// Atomic check-and-enqueue. A candidate makes it into the frontier only
    /// if it is same-domain, fetchable, unseen, and within the page budget.
    /// Returns whether the URL was admitted.
    fn admit(&self, frontier: &Frontier, candidate: &Url) -> bool {
        let candidate = urls::normalize(candidate);
        if !urls::same_domain(&self.base, &candidate) {
            return false;
        }
        let key = candidate.to_string();

        let mut inner = self.inner.lock().unwrap();
        if inner.attempted.contains_key(&key) || inner.enqueued.contains(&key) {
            return false;
        }
        if urls::has_disallowed_extension(&candidate) {
            inner.attempted.insert(key, Attempt::DisallowedExtension);
            return false;
        }
        if inner.budget_used >= self.max_pages {
            inner.budget_hit = true;
            return false;
        }

        inner.budget_used += 1;
        inner.enqueued.insert(key.clone());
        frontier.push(key);
        true
    }

    fn already_attempted(&self, url: &str) -> bool {
        self.inner.lock().unwrap().attempted.contains_key(url)
    }

    /// Record the terminal outcome of a dequeued URL.
    fn record(&self, url: &str, outcome: Attempt) {
        let mut inner = self.inner.lock().unwrap();
        inner.enqueued.remove(url);
        inner.attempted.insert(url.to_string(), outcome);
    }

    fn add_emails(&self, found: HashSet<String>) {
        self.inner.lock().unwrap().emails.extend(found);
    }

    fn into_report(&self, seed: &str) -> SeedReport {
        let inner = self.inner.lock().unwrap();
        let pages_fetched = inner
            .attempted
            .values()
            .filter(|outcome| outcome.counts_against_budget())
            .count();
        let status = if inner.budget_hit {
            JobStatus::Exhausted
        } else {
            JobStatus::Completed
        };
        SeedReport {
            seed_url: seed.to_string(),
            emails: inner.emails.clone(),
            pages_fetched,
            status,
            attempted: inner.attempted.clone(),
        }
    }
}

async fn worker(state: Arc<JobState>, frontier: Arc<Frontier>, fetcher: Arc<Fetcher>) {
    while let Some(url) = frontier.next().await {
        if state.already_attempted(&url) {
            frontier.task_done();
            continue;
        }

        match fetcher.fetch(&url).await {
            FetchOutcome::Html(body) => {
                state.record(&url, Attempt::Fetched);
                state.add_emails(extract_emails(&body));
                if let Ok(page_url) = Url::parse(&url) {
                    for link in extract_links(&page_url, &body) {
                        state.admit(&frontier, &link);
                    }
                }
            }
            FetchOutcome::WrongContentType => state.record(&url, Attempt::WrongContentType),
            FetchOutcome::HttpError(status) => {
                log::debug!("Giving up on {url}: HTTP {status}");
                state.record(&url, Attempt::HttpError);
            }
            FetchOutcome::TransportError => state.record(&url, Attempt::TransportError),
        }

        frontier.task_done();
    }
}

/// Crawl one seed to completion and collect every email found on its
/// domain. Per-URL faults are absorbed along the way; a job that cannot
/// even start comes back as a `Failed` report rather than an error.
pub async fn crawl_seed(config: &CrawlerConfig, seed: &str) -> SeedReport {
    match try_crawl_seed(config, seed).await {
        Ok(report) => report,
        Err(e) => {
            log::error!("Crawl failed for {seed}: {e:#}");
            SeedReport::failed(seed)
        }
    }
}

async fn try_crawl_seed(config: &CrawlerConfig, seed: &str) -> Result<SeedReport> {
    anyhow::ensure!(config.max_workers >= 1, "maxWorkers must be at least 1");
    anyhow::ensure!(config.max_pages >= 1, "maxPages must be at least 1");

    let base = Url::parse(seed).with_context(|| format!("Invalid seed URL: {seed}"))?;
    if base.host_str().is_none() {
        return Err(anyhow!("Seed URL has no host: {seed}"));
    }

    let fetcher = Arc::new(Fetcher::new(config)?);
    let state = Arc::new(JobState::new(urls::normalize(&base), config.max_pages));
    let frontier = Arc::new(Frontier::new());

    if !state.admit(&frontier, &base) {
        // Nothing will ever be outstanding, so the drain barrier cannot
        // fire on its own.
        frontier.close();
    }

    let workers: Vec<_> = (0..config.max_workers)
        .map(|_| tokio::spawn(worker(state.clone(), frontier.clone(), fetcher.clone())))
        .collect();
    for joined in futures::future::join_all(workers).await {
        if let Err(e) = joined {
            log::error!("Crawl worker for {seed} died: {e}");
        }
    }

    Ok(state.into_report(seed))
}

/// Crawl each seed in order with an independent budget and report batch
/// progress after every seed. Per-seed failures are logged and skipped;
/// the batch always runs to the end.
pub async fn run_batch<S: ProgressSink>(
    job_id: &str,
    seeds: &[String],
    config: &CrawlerConfig,
    sink: &S,
) -> Vec<SeedReport> {
    let mut reports = Vec::with_capacity(seeds.len());
    for (done, seed) in seeds.iter().enumerate() {
        let report = crawl_seed(config, seed).await;
        if report.status == JobStatus::Failed {
            log::warn!("Seed {seed} failed, moving on");
        }
        reports.push(report);

        let percentage = ((done + 1) * 100 / seeds.len()) as u8;
        sink.report(job_id, percentage);
    }
    reports
}

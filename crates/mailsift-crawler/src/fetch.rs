use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use rand::seq::SliceRandom;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use tokio::sync::Semaphore;

use crate::config::CrawlerConfig;

const HTML_CONTENT_TYPES: &[&str] = &["text/html", "application/xhtml+xml"];

const FALLBACK_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:78.0) Gecko/20100101 Firefox/78.0";

/// Terminal classification of one fetch attempt. Every variant except
/// `Html` contributes nothing to the crawl.
#[derive(Debug)]
pub enum FetchOutcome {
    Html(String),
    WrongContentType,
    HttpError(StatusCode),
    TransportError,
}

/// Issues permit-bounded GETs for one job. The client (and its connection
/// pool) is shared by the job's workers and dropped with the job.
pub struct Fetcher {
    client: reqwest::Client,
    permits: Arc<Semaphore>,
    user_agents: Vec<String>,
}

impl Fetcher {
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        let client = reqwest::ClientBuilder::new()
            .gzip(true)
            .deflate(true)
            .timeout(Duration::from_secs(config.fetch_timeout))
            .build()?;

        Ok(Self {
            client,
            permits: Arc::new(Semaphore::new(config.max_workers)),
            user_agents: config.user_agents.clone(),
        })
    }

    fn pick_user_agent(&self) -> &str {
        self.user_agents
            .choose(&mut rand::thread_rng())
            .map(|ua| ua.as_str())
            .unwrap_or(FALLBACK_USER_AGENT)
    }

    /// One GET under a concurrency permit, held until the body is read or
    /// the attempt fails. Never errors out: every failure mode collapses
    /// into a terminal `FetchOutcome`, and no URL is fetched twice.
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        let _permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            Err(_) => return FetchOutcome::TransportError,
        };

        let resp = match self
            .client
            .get(url)
            .header(USER_AGENT, self.pick_user_agent())
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                log::warn!("Skipping URL: {url} got: {e}");
                return FetchOutcome::TransportError;
            }
        };

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        if !HTML_CONTENT_TYPES.iter().any(|ct| content_type.contains(ct)) {
            return FetchOutcome::WrongContentType;
        }

        let status = resp.status();
        if status.is_client_error() {
            return FetchOutcome::HttpError(status);
        }

        match resp.text().await {
            Ok(body) => FetchOutcome::Html(body),
            Err(e) => {
                log::warn!("Skipping URL: {url} got: {e}");
                FetchOutcome::TransportError
            }
        }
    }
}

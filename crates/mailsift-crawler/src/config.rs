use std::cmp;

use serde::{Deserialize, Serialize};

/// Browsers impersonated when no user agent pool is configured.
const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (X11; Linux x86_64; rv:120.0) Gecko/20100101 Firefox/120.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlerConfig {
    /// Pool of user agents, one picked at random per request.
    #[serde(default = "default_user_agents")]
    pub user_agents: Vec<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout: u64,

    /// Number of crawl workers per seed; also bounds in-flight requests.
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Hard cap on pages fetched (or attempted) per seed.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agents: default_user_agents(),
            fetch_timeout: default_fetch_timeout(),
            max_workers: default_max_workers(),
            max_pages: default_max_pages(),
        }
    }
}

fn default_user_agents() -> Vec<String> {
    DEFAULT_USER_AGENTS.iter().map(|ua| ua.to_string()).collect()
}

fn default_fetch_timeout() -> u64 {
    10
}

fn default_max_workers() -> usize {
    cmp::max(1, num_cpus::get().saturating_sub(2))
}

fn default_max_pages() -> usize {
    100
}

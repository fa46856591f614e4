use serde::Deserialize;
use std::time::Duration;

/// Hosts that are never fetched, matched case-insensitively anywhere in the URL
pub const DEFAULT_BLACKLIST: &[&str] = &["questioneverything.typepad.com"];

/// Hard upper limit for the page budget of a single run
pub const UPPER_LIMIT_PAGES: usize = 10_000;

/// Maximum number of keywords a crawl may track
pub const MAX_KEYWORDS: usize = 10;

/// Main configuration structure for a crawl
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    pub crawl: CrawlSettings,
    #[serde(default)]
    pub workers: WorkerSettings,
    #[serde(default)]
    pub network: NetworkSettings,
}

/// What to crawl and what to look for
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlSettings {
    /// The first URL placed in the frontier
    #[serde(rename = "seed-url")]
    pub seed_url: String,

    /// Keywords to count (case-insensitive substring match)
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Maximum number of pages retrieved and parsed in one run
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: usize,

    /// Enables verbose worker lifecycle output
    #[serde(default)]
    pub debug: bool,
}

/// Pool sizes and worker timing
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerSettings {
    /// Number of fetcher workers
    #[serde(default = "default_pool_size")]
    pub fetchers: usize,

    /// Number of parser workers
    #[serde(default = "default_pool_size")]
    pub parsers: usize,

    /// Sleep between polls when a worker finds no work (milliseconds)
    #[serde(rename = "poll-interval-ms", default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// How long shutdown waits for a worker before aborting it (milliseconds)
    #[serde(rename = "shutdown-grace-ms", default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,
}

/// HTTP behavior
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkSettings {
    /// User agent sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Timeout for page requests (milliseconds)
    #[serde(rename = "request-timeout-ms", default = "default_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Timeout for robots.txt requests (milliseconds)
    #[serde(rename = "robots-timeout-ms", default = "default_timeout_ms")]
    pub robots_timeout_ms: u64,

    /// Whether robots.txt crawl delays space out requests to the same host
    #[serde(rename = "honor-crawl-delay", default = "default_true")]
    pub honor_crawl_delay: bool,

    /// Upper bound applied to any robots.txt crawl delay (seconds)
    #[serde(rename = "max-crawl-delay-secs", default = "default_max_crawl_delay")]
    pub max_crawl_delay_secs: u64,

    /// URL fragments that are never fetched
    #[serde(default = "default_blacklist")]
    pub blacklist: Vec<String>,
}

impl CrawlConfig {
    /// Creates a configuration for `seed_url` with default pools and network settings
    pub fn new(seed_url: impl Into<String>, keywords: Vec<String>) -> Self {
        Self {
            crawl: CrawlSettings {
                seed_url: seed_url.into(),
                keywords,
                max_pages: default_max_pages(),
                debug: false,
            },
            workers: WorkerSettings::default(),
            network: NetworkSettings::default(),
        }
    }
}

impl WorkerSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

impl NetworkSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn robots_timeout(&self) -> Duration {
        Duration::from_millis(self.robots_timeout_ms)
    }

    pub fn max_crawl_delay(&self) -> Duration {
        Duration::from_secs(self.max_crawl_delay_secs)
    }
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            fetchers: default_pool_size(),
            parsers: default_pool_size(),
            poll_interval_ms: default_poll_interval_ms(),
            shutdown_grace_ms: default_shutdown_grace_ms(),
        }
    }
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            request_timeout_ms: default_timeout_ms(),
            robots_timeout_ms: default_timeout_ms(),
            honor_crawl_delay: true,
            max_crawl_delay_secs: default_max_crawl_delay(),
            blacklist: default_blacklist(),
        }
    }
}

fn default_max_pages() -> usize {
    UPPER_LIMIT_PAGES
}

fn default_pool_size() -> usize {
    4
}

fn default_poll_interval_ms() -> u64 {
    20
}

fn default_shutdown_grace_ms() -> u64 {
    2000
}

fn default_timeout_ms() -> u64 {
    2000
}

fn default_max_crawl_delay() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_user_agent() -> String {
    format!("keyword-crawler/{}", env!("CARGO_PKG_VERSION"))
}

fn default_blacklist() -> Vec<String> {
    DEFAULT_BLACKLIST.iter().map(|s| s.to_string()).collect()
}

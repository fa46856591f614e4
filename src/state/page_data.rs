use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Statistics gathered while parsing one page
///
/// A `PageData` is owned by a single parser from the moment parsing starts
/// until it is handed to the aggregator, so it needs no synchronization.
#[derive(Debug, Clone)]
pub struct PageData {
    /// The page this record describes
    pub url: String,

    /// Wall-clock time parsing started
    pub started_at: DateTime<Utc>,

    /// Wall-clock time parsing finished
    pub finished_at: DateTime<Utc>,

    /// Monotonic parse duration
    pub parse_time: Duration,

    /// Number of words seen in displayable text
    pub words: u64,

    /// Number of outbound links pushed to the frontier
    pub links: u64,

    /// Hits per configured keyword, seeded with zero for every keyword
    pub keyword_hits: BTreeMap<String, u64>,

    started: Instant,
}

impl PageData {
    /// Starts a record for `url`, timing from now
    pub fn new(url: impl Into<String>, keywords: &[String]) -> Self {
        let now = Utc::now();
        Self {
            url: url.into(),
            started_at: now,
            finished_at: now,
            parse_time: Duration::ZERO,
            words: 0,
            links: 0,
            keyword_hits: keywords.iter().map(|k| (k.clone(), 0)).collect(),
            started: Instant::now(),
        }
    }

    pub fn add_words(&mut self, count: u64) {
        self.words += count;
    }

    pub fn add_link(&mut self) {
        self.links += 1;
    }

    /// Counts one hit for `keyword`; unknown keywords are ignored
    pub fn add_hit(&mut self, keyword: &str) {
        if let Some(hits) = self.keyword_hits.get_mut(keyword) {
            *hits += 1;
        }
    }

    pub fn hits(&self, keyword: &str) -> u64 {
        self.keyword_hits.get(keyword).copied().unwrap_or(0)
    }

    /// Stamps the end of parsing
    pub fn finish(&mut self) {
        self.finished_at = Utc::now();
        self.parse_time = self.started.elapsed();
    }

    /// Parse time in fractional milliseconds
    pub fn parse_time_ms(&self) -> f64 {
        self.parse_time.as_secs_f64() * 1000.0
    }
}

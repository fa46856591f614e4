//! Report sink trait and report types
//!
//! This module defines the trait interface for report sinks and the
//! snapshot types the aggregator publishes.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;

/// Cumulative statistics for one keyword
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KeywordStats {
    /// Hits across all pages so far
    pub total_hits: u64,

    /// Hits per page so far
    pub avg_hits: f64,
}

/// Snapshot published after each page is aggregated
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlReport {
    /// The page that produced this snapshot
    pub url: String,

    pub pages_retrieved: u64,
    pub avg_words_per_page: f64,
    pub avg_links_per_page: f64,

    /// Page ceiling in effect when the snapshot was taken
    pub page_limit: usize,

    pub avg_parse_time_ms: f64,
    pub total_parse_time_ms: f64,

    /// Wall-clock time since aggregation started
    pub elapsed: Duration,

    pub keywords: BTreeMap<String, KeywordStats>,
}

/// Final statistics for a crawl
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlSummary {
    // Aggregated page statistics
    pub pages_retrieved: u64,
    pub total_words: u64,
    pub total_links: u64,
    pub avg_words_per_page: f64,
    pub avg_links_per_page: f64,
    pub avg_parse_time_ms: f64,
    pub total_parse_time_ms: f64,
    pub page_limit: usize,
    pub elapsed: Duration,

    /// Reports that arrived after the ceiling was reached
    pub dropped_reports: u64,

    pub keywords: BTreeMap<String, KeywordStats>,

    // Worker outcomes, filled in by the crawler
    pub fetch_failures: u64,
    pub parse_failures: u64,
    pub robots_requests: u64,
}

impl CrawlSummary {
    /// Creates a new empty crawl summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the fraction of the page ceiling that was used, as a percentage
    pub fn budget_used(&self) -> f64 {
        if self.page_limit == 0 {
            return 0.0;
        }
        (self.pages_retrieved as f64 / self.page_limit as f64) * 100.0
    }
}

/// Receiver of aggregated reports
///
/// The aggregator calls `publish` once per accepted page, from its own task.
pub trait ReportSink: Send {
    fn publish(&mut self, report: CrawlReport);
}

/// Logs each report at info level
#[derive(Debug, Default)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn publish(&mut self, report: CrawlReport) {
        tracing::info!(
            "[{}/{}] {} (avg {:.1} words, {:.1} links, {:.2} ms/page)",
            report.pages_retrieved,
            report.page_limit,
            report.url,
            report.avg_words_per_page,
            report.avg_links_per_page,
            report.avg_parse_time_ms
        );
        for (keyword, stats) in &report.keywords {
            tracing::debug!(
                "  {}: {} hits ({:.2}/page)",
                keyword,
                stats.total_hits,
                stats.avg_hits
            );
        }
    }
}

/// Keeps every report in a shared list
///
/// Clones share the same list, so one clone can be handed to the crawler
/// while another is kept for reading.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    reports: Arc<Mutex<Vec<CrawlReport>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the reports collected so far
    pub fn reports(&self) -> Vec<CrawlReport> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ReportSink for CollectingSink {
    fn publish(&mut self, report: CrawlReport) {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(report);
    }
}

/// Forwards reports to a channel; reports sent after the receiver is dropped are discarded
impl ReportSink for mpsc::UnboundedSender<CrawlReport> {
    fn publish(&mut self, report: CrawlReport) {
        let _ = self.send(report);
    }
}

impl ReportSink for Box<dyn ReportSink> {
    fn publish(&mut self, report: CrawlReport) {
        (**self).publish(report);
    }
}

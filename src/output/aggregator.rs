//! Aggregation of per-page statistics
//!
//! Parsers send finished [`PageData`] records over a channel. A single
//! aggregator task owns the running totals, so cross-page statistics are only
//! ever mutated in one place. Each accepted page produces a [`CrawlReport`]
//! snapshot for the sink.

use crate::config::Preferences;
use crate::output::{CrawlReport, CrawlSummary, KeywordStats, ReportSink};
use crate::state::PageData;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Sending half of the report channel, cloned into every parser
pub type ReportSender = mpsc::UnboundedSender<PageData>;

/// Running totals across every accepted page
#[derive(Debug)]
pub struct AggregateState {
    pages: u64,
    words: u64,
    links: u64,
    parse_time: Duration,
    hits: BTreeMap<String, u64>,
    dropped: u64,
    started: Instant,
}

impl AggregateState {
    /// Starts empty totals, with a zero entry for every keyword
    pub fn new(keywords: &[String]) -> Self {
        Self {
            pages: 0,
            words: 0,
            links: 0,
            parse_time: Duration::ZERO,
            hits: keywords.iter().map(|k| (k.clone(), 0)).collect(),
            dropped: 0,
            started: Instant::now(),
        }
    }

    pub fn pages(&self) -> u64 {
        self.pages
    }

    /// Merges one page into the totals
    ///
    /// Pages arriving once `ceiling` pages have been counted are dropped and
    /// produce no report.
    pub fn absorb(&mut self, page: PageData, ceiling: usize) -> Option<CrawlReport> {
        if self.pages >= ceiling as u64 {
            self.dropped += 1;
            tracing::debug!("Dropping report for {}: page limit reached", page.url);
            return None;
        }

        self.pages += 1;
        self.words += page.words;
        self.links += page.links;
        self.parse_time += page.parse_time;
        for (keyword, hits) in page.keyword_hits {
            *self.hits.entry(keyword).or_insert(0) += hits;
        }

        Some(CrawlReport {
            url: page.url,
            pages_retrieved: self.pages,
            avg_words_per_page: self.per_page(self.words as f64),
            avg_links_per_page: self.per_page(self.links as f64),
            page_limit: ceiling,
            avg_parse_time_ms: self.per_page(self.total_parse_time_ms()),
            total_parse_time_ms: self.total_parse_time_ms(),
            elapsed: self.started.elapsed(),
            keywords: self.keyword_stats(),
        })
    }

    /// Final totals
    pub fn summary(&self, ceiling: usize) -> CrawlSummary {
        CrawlSummary {
            pages_retrieved: self.pages,
            total_words: self.words,
            total_links: self.links,
            avg_words_per_page: self.per_page(self.words as f64),
            avg_links_per_page: self.per_page(self.links as f64),
            avg_parse_time_ms: self.per_page(self.total_parse_time_ms()),
            total_parse_time_ms: self.total_parse_time_ms(),
            page_limit: ceiling,
            elapsed: self.started.elapsed(),
            dropped_reports: self.dropped,
            keywords: self.keyword_stats(),
            ..CrawlSummary::default()
        }
    }

    fn per_page(&self, total: f64) -> f64 {
        if self.pages == 0 {
            0.0
        } else {
            total / self.pages as f64
        }
    }

    fn total_parse_time_ms(&self) -> f64 {
        self.parse_time.as_secs_f64() * 1000.0
    }

    fn keyword_stats(&self) -> BTreeMap<String, KeywordStats> {
        self.hits
            .iter()
            .map(|(keyword, &total_hits)| {
                let stats = KeywordStats {
                    total_hits,
                    avg_hits: self.per_page(total_hits as f64),
                };
                (keyword.clone(), stats)
            })
            .collect()
    }
}

/// Spawns the aggregator task
///
/// The task runs until every [`ReportSender`] clone has been dropped, then
/// returns the final [`CrawlSummary`].
pub fn spawn_aggregator<S>(
    keywords: &[String],
    prefs: Arc<Preferences>,
    sink: S,
) -> (ReportSender, JoinHandle<CrawlSummary>)
where
    S: ReportSink + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let state = AggregateState::new(keywords);
    let task = tokio::spawn(aggregate(rx, state, prefs, sink));
    (tx, task)
}

async fn aggregate<S: ReportSink>(
    mut rx: mpsc::UnboundedReceiver<PageData>,
    mut state: AggregateState,
    prefs: Arc<Preferences>,
    mut sink: S,
) -> CrawlSummary {
    tracing::debug!("Aggregator started");

    while let Some(page) = rx.recv().await {
        if let Some(report) = state.absorb(page, prefs.max_pages()) {
            sink.publish(report);
        }
    }

    tracing::debug!("Aggregator drained after {} pages", state.pages());
    state.summary(prefs.max_pages())
}

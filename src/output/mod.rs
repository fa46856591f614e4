//! Output module for aggregating and publishing crawl statistics
//!
//! This module handles:
//! - Merging per-page statistics into running totals
//! - Publishing a snapshot per page to a report sink
//! - Rendering the final summary

mod aggregator;
pub mod stats;
mod traits;

pub use aggregator::{spawn_aggregator, AggregateState, ReportSender};
pub use stats::{format_summary, print_summary};
pub use traits::{
    CollectingSink, CrawlReport, CrawlSummary, KeywordStats, ReportSink, TracingSink,
};

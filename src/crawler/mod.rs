//! Crawler module for page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with status and content-type checks
//! - Keyword mining and link extraction
//! - The shared page budget
//! - Overall crawl coordination

mod budget;
mod coordinator;
mod fetcher;
mod parser;

pub use budget::{BudgetSlot, PageBudget};
pub use coordinator::{run_crawl, Crawler};
pub use fetcher::{
    build_http_client, fetch_page, is_accepted_content_type, FetchContext, Fetcher,
    ACCEPTED_CONTENT_TYPES,
};
pub use parser::{parse_page, KeywordScanner, PageParser, ParseContext};

use crate::config::{CrawlConfig, Preferences};
use crate::output::{CrawlSummary, TracingSink};
use crate::Result;
use std::sync::Arc;

/// Runs a complete crawl with per-page reports written to the log
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the configuration
/// 2. Start the fetcher and parser pools
/// 3. Seed the frontier
/// 4. Wait until no more work can be done
/// 5. Shut down and return the summary
///
/// # Arguments
///
/// * `config` - The crawl configuration
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - Crawl completed
/// * `Err(CrawlError)` - Crawl could not be started
pub async fn crawl(config: CrawlConfig) -> Result<CrawlSummary> {
    let prefs = Arc::new(Preferences::new());
    prefs.set_debug(config.crawl.debug);
    prefs.set_max_pages(config.crawl.max_pages);

    run_crawl(config, prefs, TracingSink).await
}

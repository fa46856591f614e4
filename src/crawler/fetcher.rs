//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for page content, including:
//! - Building the shared HTTP client
//! - Status and Content-Type checks
//! - Error classification
//! - The fetcher worker job

use crate::buffers::{Frontier, PageBuffer};
use crate::config::NetworkSettings;
use crate::crawler::budget::PageBudget;
use crate::robots::PolitenessCache;
use crate::url::{is_blacklisted, parse_http_url};
use crate::worker::{Job, Step, WorkerContext};
use crate::{CrawlError, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::{redirect::Policy, Client, StatusCode};
use std::sync::Arc;
use url::Url;

/// MIME types whose bodies are handed to the parsers
pub const ACCEPTED_CONTENT_TYPES: &[&str] = &["text/plain", "text/html"];

/// Builds the HTTP client shared by fetchers and the politeness cache
///
/// # Arguments
///
/// * `settings` - The network settings (user agent and request timeout)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(settings: &NetworkSettings) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(settings.user_agent.as_str())
        .timeout(settings.request_timeout())
        .connect_timeout(settings.request_timeout())
        .redirect(Policy::limited(5))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Returns true if a Content-Type header names an accepted MIME type
///
/// Parameters such as `charset` are ignored and the comparison is
/// case-insensitive.
pub fn is_accepted_content_type(header: &str) -> bool {
    let mime = header.split(';').next().unwrap_or("").trim();
    ACCEPTED_CONTENT_TYPES
        .iter()
        .any(|accepted| mime.eq_ignore_ascii_case(accepted))
}

/// Fetches a page and returns its trimmed body
///
/// # Request Flow
///
/// 1. Send GET request (redirects followed up to 5 hops)
/// 2. Require HTTP 200
/// 3. Require an accepted Content-Type
/// 4. Read the body as text and trim it; an empty body is an error
pub async fn fetch_page(client: &Client, url: &Url) -> Result<String> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| classify(url, e))?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(CrawlError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !is_accepted_content_type(&content_type) {
        return Err(CrawlError::ContentType {
            url: url.to_string(),
            content_type,
        });
    }

    let body = response.text().await.map_err(|e| {
        if e.is_decode() {
            CrawlError::Encoding {
                url: url.to_string(),
                message: e.to_string(),
            }
        } else {
            classify(url, e)
        }
    })?;

    let body = body.trim();
    if body.is_empty() {
        return Err(CrawlError::EmptyBody {
            url: url.to_string(),
        });
    }

    Ok(body.to_string())
}

fn classify(url: &Url, error: reqwest::Error) -> CrawlError {
    if error.is_timeout() {
        CrawlError::Timeout {
            url: url.to_string(),
        }
    } else {
        CrawlError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}

/// Everything the fetchers of one crawl share
pub struct FetchContext {
    pub frontier: Arc<Frontier>,
    pub pages: Arc<PageBuffer>,
    pub budget: Arc<PageBudget>,
    pub politeness: Arc<PolitenessCache>,
    pub client: Client,
    pub blacklist: Vec<String>,
    pub honor_crawl_delay: bool,
}

/// Worker job that moves URLs from the frontier into the page buffer
pub struct Fetcher {
    context: Arc<FetchContext>,
}

impl Fetcher {
    pub fn new(context: Arc<FetchContext>) -> Self {
        Self { context }
    }

    async fn retrieve(&self, raw_url: &str) -> Result<()> {
        let ctx = &self.context;
        let url = parse_http_url(raw_url)?;

        let instruction = ctx.politeness.check_permission(&url).await;
        if !instruction.can_crawl {
            return Err(CrawlError::RobotsDenied {
                url: raw_url.to_string(),
            });
        }
        if ctx.honor_crawl_delay {
            ctx.politeness.wait_for_turn(&url, instruction.delay).await;
        }

        let body = fetch_page(&ctx.client, &url).await?;

        if !ctx.pages.add_pending(raw_url, &body) {
            return Err(CrawlError::AlreadyBuffered {
                url: raw_url.to_string(),
            });
        }
        Ok(())
    }
}

impl Job for Fetcher {
    async fn step(&mut self, worker: &WorkerContext) -> Step {
        let ctx = &self.context;
        if !ctx.frontier.has_pending() {
            return Step::Idle;
        }

        // Reserved before the pop so a URL is never taken without a slot
        let Some(slot) = ctx.budget.try_reserve() else {
            return Step::Idle;
        };
        let Some(url) = ctx.frontier.next_pending() else {
            return Step::Idle;
        };

        worker.mark_working();

        if is_blacklisted(&url, &ctx.blacklist) {
            tracing::debug!("{} skipping blacklisted {}", worker.id(), url);
            return Step::Worked;
        }

        match self.retrieve(&url).await {
            Ok(()) => {
                slot.commit();
                worker.succeeded(&url);
            }
            Err(e) => {
                tracing::debug!("{} failed to fetch {}: {}", worker.id(), url, e);
                worker.failed(&url, Some(e));
            }
        }

        Step::Worked
    }
}

//! HTML parser for keyword statistics and link discovery
//!
//! This module walks a fetched document in order and:
//! - Counts words and keyword hits in displayable text
//! - Resolves `<a href>` targets and pushes them to the frontier
//!
//! Text inside `<script>` and `<style>` is not displayable and is skipped.

use crate::buffers::{Frontier, PageBuffer};
use crate::crawler::budget::PageBudget;
use crate::output::ReportSender;
use crate::state::PageData;
use crate::url::resolve_link;
use crate::worker::{Job, Step, WorkerContext};
use crate::{CrawlError, Result};
use scraper::{Html, Node};
use std::sync::Arc;
use url::Url;

/// Counts words and keyword hits across consecutive text runs
///
/// Keywords match case-insensitively anywhere inside a whitespace-separated
/// token. A token cut by markup (`in<b>tell</b>igence`) is rejoined with the
/// start of the next run when no whitespace separates them, so a keyword
/// spanning the cut is still counted.
#[derive(Debug, Clone)]
pub struct KeywordScanner {
    /// `(configured name, uppercased pattern)` pairs
    keywords: Vec<(String, String)>,
    carry: Option<String>,
}

impl KeywordScanner {
    pub fn new(keywords: &[String]) -> Self {
        let mut seen = std::collections::HashSet::new();
        let keywords = keywords
            .iter()
            .filter(|k| !k.trim().is_empty())
            .filter(|k| seen.insert(k.as_str()))
            .map(|k| (k.clone(), k.trim().to_uppercase()))
            .collect();

        Self {
            keywords,
            carry: None,
        }
    }

    /// Scans one text run, adding words and hits to `page`
    pub fn scan(&mut self, text: &str, page: &mut PageData) {
        let upper = text.to_uppercase();
        let joined_left = !upper.starts_with(char::is_whitespace);
        let open_right = !upper.ends_with(char::is_whitespace);

        let mut carry = self.carry.take().filter(|_| joined_left);
        let mut last: Option<(String, bool)> = None;

        for token in upper.split_whitespace() {
            page.add_words(1);
            let hit = self.count_hits(token, page);

            let candidate = match carry.take() {
                Some(previous) => {
                    let glued = format!("{}{}", previous, token);
                    let glued_hit = self.count_glued_hits(&glued, token, page);
                    (glued, hit || glued_hit)
                }
                None => (token.to_string(), hit),
            };
            last = Some(candidate);
        }

        self.carry = match last {
            Some((token, false)) if open_right => Some(token),
            _ => None,
        };
    }

    /// Forgets the pending token, for example at a skipped element
    pub fn break_run(&mut self) {
        self.carry = None;
    }

    fn count_hits(&self, token: &str, page: &mut PageData) -> bool {
        let mut hit = false;
        for (name, pattern) in &self.keywords {
            if token.contains(pattern.as_str()) {
                page.add_hit(name);
                hit = true;
            }
        }
        hit
    }

    /// Counts keywords that only appear once `token` is glued to the carry
    fn count_glued_hits(&self, glued: &str, token: &str, page: &mut PageData) -> bool {
        let mut hit = false;
        for (name, pattern) in &self.keywords {
            if glued.contains(pattern.as_str()) && !token.contains(pattern.as_str()) {
                page.add_hit(name);
                hit = true;
            }
        }
        hit
    }
}

/// Parses one fetched page
///
/// Every resolved link is pushed to `frontier` and counted, whether or not
/// the frontier already held it.
///
/// # Arguments
///
/// * `url` - The URL the content was fetched from
/// * `content` - The page body
/// * `keywords` - The configured keywords
/// * `frontier` - Destination for discovered links
///
/// # Returns
///
/// * `Ok(PageData)` - Statistics for the page
/// * `Err(CrawlError)` - The source URL could not be parsed
pub fn parse_page(
    url: &str,
    content: &str,
    keywords: &[String],
    frontier: &Frontier,
) -> Result<PageData> {
    let base = Url::parse(url).map_err(|source| CrawlError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;

    let mut page = PageData::new(url, keywords);
    let mut scanner = KeywordScanner::new(keywords);

    let document = Html::parse_document(content);
    if !document.errors.is_empty() {
        tracing::trace!("{} recoverable markup errors in {}", document.errors.len(), url);
    }

    for node in document.tree.root().descendants() {
        match node.value() {
            Node::Text(text) => {
                let hidden = node
                    .parent()
                    .and_then(|parent| parent.value().as_element())
                    .is_some_and(|e| matches!(e.name(), "script" | "style"));
                if hidden {
                    scanner.break_run();
                } else {
                    scanner.scan(text, &mut page);
                }
            }
            Node::Element(element) if element.name() == "a" => {
                let Some(href) = element.attr("href") else {
                    continue;
                };
                if let Some(link) = resolve_link(&base, href) {
                    frontier.add_pending(link.as_str());
                    page.add_link();
                }
            }
            _ => {}
        }
    }

    page.finish();
    Ok(page)
}

/// Everything the parsers of one crawl share
pub struct ParseContext {
    pub pages: Arc<PageBuffer>,
    pub frontier: Arc<Frontier>,
    pub budget: Arc<PageBudget>,
    pub keywords: Vec<String>,
}

/// Worker job that turns buffered pages into reports for the aggregator
pub struct PageParser {
    context: Arc<ParseContext>,
    reports: ReportSender,
}

impl PageParser {
    pub fn new(context: Arc<ParseContext>, reports: ReportSender) -> Self {
        Self { context, reports }
    }
}

impl Job for PageParser {
    async fn step(&mut self, worker: &WorkerContext) -> Step {
        let ctx = &self.context;
        if !ctx.pages.has_pending() {
            return Step::Idle;
        }
        let Some(slot) = ctx.budget.try_reserve() else {
            return Step::Idle;
        };
        let Some((url, content)) = ctx.pages.next_pending() else {
            return Step::Idle;
        };

        worker.mark_working();

        match parse_page(&url, &content, &ctx.keywords, &ctx.frontier) {
            Ok(page) => {
                tracing::trace!(
                    "{} parsed {}: {} words, {} links",
                    worker.id(),
                    url,
                    page.words,
                    page.links
                );
                if self.reports.send(page).is_err() {
                    worker.failed(&url, None);
                    return Step::Stop;
                }
                slot.commit();
                worker.succeeded(&url);
            }
            Err(e) => {
                tracing::debug!("{} failed to parse {}: {}", worker.id(), url, e);
                worker.failed(&url, Some(e));
            }
        }

        Step::Worked
    }
}

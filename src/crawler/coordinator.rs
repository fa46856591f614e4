//! Crawler coordinator - wiring and lifecycle of a crawl
//!
//! This module owns everything one crawl shares:
//! - The frontier and page buffer
//! - The fetch and parse budgets
//! - The HTTP client and politeness cache
//! - The worker pools and the aggregator task
//!
//! A crawl runs until every worker has gone idle with nothing left to do,
//! or until it is shut down.

use crate::buffers::{Frontier, PageBuffer};
use crate::config::{validate, CrawlConfig, Preferences};
use crate::crawler::budget::PageBudget;
use crate::crawler::fetcher::{build_http_client, FetchContext, Fetcher};
use crate::crawler::parser::{PageParser, ParseContext};
use crate::listeners::ListenerSet;
use crate::output::{spawn_aggregator, CrawlSummary, ReportSink};
use crate::robots::PolitenessCache;
use crate::worker::{
    spawn_worker, TracingListener, WorkerHandle, WorkerId, WorkerKind, WorkerListener,
    WorkerListeners,
};
use crate::{CrawlError, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Counts failed units of work per pool
#[derive(Debug, Default)]
struct OutcomeCounter {
    fetch_failures: AtomicU64,
    parse_failures: AtomicU64,
}

impl WorkerListener for OutcomeCounter {
    fn on_fail(&self, worker: &WorkerId, _url: &str, _error: Option<&CrawlError>) {
        let counter = match worker.kind {
            WorkerKind::Fetcher => &self.fetch_failures,
            WorkerKind::Parser => &self.parse_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Main crawler structure
pub struct Crawler {
    config: Arc<CrawlConfig>,
    prefs: Arc<Preferences>,
    frontier: Arc<Frontier>,
    pages: Arc<PageBuffer>,
    fetch_budget: Arc<PageBudget>,
    parse_budget: Arc<PageBudget>,
    politeness: Arc<PolitenessCache>,
    client: reqwest::Client,
    listeners: WorkerListeners,
    outcomes: Arc<OutcomeCounter>,
    fetchers: Vec<WorkerHandle>,
    parsers: Vec<WorkerHandle>,
    aggregator: Option<JoinHandle<CrawlSummary>>,
    started: bool,
}

impl Crawler {
    /// Creates a new crawler
    ///
    /// # Arguments
    ///
    /// * `config` - The crawl configuration
    /// * `prefs` - Debug flag and page ceiling, shared with the front end
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to start
    /// * `Err(CrawlError)` - Invalid configuration or HTTP client failure
    pub fn new(config: CrawlConfig, prefs: Arc<Preferences>) -> Result<Self> {
        validate(&config)?;

        let client = build_http_client(&config.network)?;
        let politeness = Arc::new(PolitenessCache::new(client.clone(), &config.network));

        let listeners: WorkerListeners = Arc::new(ListenerSet::new());
        let outcomes = Arc::new(OutcomeCounter::default());
        listeners.add(outcomes.clone());
        if prefs.debug() {
            listeners.add(Arc::new(TracingListener));
        }

        Ok(Self {
            config: Arc::new(config),
            fetch_budget: Arc::new(PageBudget::new(prefs.clone())),
            parse_budget: Arc::new(PageBudget::new(prefs.clone())),
            prefs,
            frontier: Arc::new(Frontier::new()),
            pages: Arc::new(PageBuffer::new()),
            politeness,
            client,
            listeners,
            outcomes,
            fetchers: Vec::new(),
            parsers: Vec::new(),
            aggregator: None,
            started: false,
        })
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    pub fn frontier(&self) -> &Arc<Frontier> {
        &self.frontier
    }

    pub fn page_buffer(&self) -> &Arc<PageBuffer> {
        &self.pages
    }

    pub fn politeness(&self) -> &Arc<PolitenessCache> {
        &self.politeness
    }

    /// Registers a listener for events from every worker
    pub fn add_listener(&self, listener: Arc<dyn WorkerListener>) {
        self.listeners.add(listener);
    }

    pub fn remove_listener(&self, listener: &Arc<dyn WorkerListener>) -> bool {
        self.listeners.remove(listener)
    }

    /// Spawns the aggregator and both worker pools
    ///
    /// Reports for each parsed page go to `sink`.
    pub fn start<S>(&mut self, sink: S) -> Result<()>
    where
        S: ReportSink + 'static,
    {
        if self.started {
            return Err(CrawlError::AlreadyStarted);
        }
        self.started = true;

        let settings = &self.config.workers;
        let (reports, aggregator) =
            spawn_aggregator(&self.config.crawl.keywords, self.prefs.clone(), sink);
        self.aggregator = Some(aggregator);

        let parse_context = Arc::new(ParseContext {
            pages: self.pages.clone(),
            frontier: self.frontier.clone(),
            budget: self.parse_budget.clone(),
            keywords: self.config.crawl.keywords.clone(),
        });
        // Each parser owns a sender; the aggregator drains once they are all gone
        self.parsers = (1..=settings.parsers)
            .map(|index| {
                let job = PageParser::new(parse_context.clone(), reports.clone());
                spawn_worker(job, WorkerId::parser(index), self.listeners.clone(), settings)
            })
            .collect();
        drop(reports);

        let fetch_context = Arc::new(FetchContext {
            frontier: self.frontier.clone(),
            pages: self.pages.clone(),
            budget: self.fetch_budget.clone(),
            politeness: self.politeness.clone(),
            client: self.client.clone(),
            blacklist: self.config.network.blacklist.clone(),
            honor_crawl_delay: self.config.network.honor_crawl_delay,
        });
        self.fetchers = (1..=settings.fetchers)
            .map(|index| {
                let job = Fetcher::new(fetch_context.clone());
                spawn_worker(job, WorkerId::fetcher(index), self.listeners.clone(), settings)
            })
            .collect();

        tracing::info!(
            "Started {} fetchers and {} parsers (page limit {})",
            settings.fetchers,
            settings.parsers,
            self.prefs.max_pages()
        );
        Ok(())
    }

    /// Places the configured seed URL in the frontier
    ///
    /// Returns false if the frontier already held it.
    pub fn seed(&self) -> bool {
        let seed = &self.config.crawl.seed_url;
        tracing::info!("Seeding frontier with {}", seed);
        self.frontier.add_pending(seed)
    }

    fn workers(&self) -> impl Iterator<Item = &WorkerHandle> {
        self.fetchers.iter().chain(self.parsers.iter())
    }

    /// Returns true if no worker has work and no queue can produce more
    ///
    /// A queue counts as drained when it is empty or when the budget that
    /// gates it is spent.
    pub fn is_quiescent(&self) -> bool {
        let workers_quiet = self
            .workers()
            .all(|w| w.is_idle() || w.status().is_terminal());
        let buffer_done = self.pages.num_pending() == 0 || self.parse_budget.is_exhausted();
        let frontier_done =
            self.frontier.num_pending() == 0 || self.fetch_budget.is_exhausted();

        workers_quiet && buffer_done && frontier_done
    }

    /// Waits until the crawl is quiescent on two consecutive polls
    pub async fn wait_until_idle(&self) -> Result<()> {
        if !self.started {
            return Err(CrawlError::NotStarted);
        }

        let interval = self.config.workers.poll_interval();
        let mut quiet_polls = 0;
        while quiet_polls < 2 {
            tokio::time::sleep(interval).await;
            if self.is_quiescent() {
                quiet_polls += 1;
            } else {
                quiet_polls = 0;
            }
        }

        tracing::debug!(
            "Crawl idle: {} pages fetched, {} parsed",
            self.fetch_budget.committed(),
            self.parse_budget.committed()
        );
        Ok(())
    }

    /// Stops fetchers, then parsers, then collects the aggregator's summary
    ///
    /// Each pool gets one shared grace period before its stragglers are
    /// aborted.
    pub async fn shutdown(&mut self) -> Result<CrawlSummary> {
        let aggregator = self.aggregator.take().ok_or(CrawlError::NotStarted)?;
        let grace = self.config.workers.shutdown_grace();

        tracing::info!("Shutting down fetchers");
        stop_pool(&mut self.fetchers, grace).await;

        tracing::info!("Shutting down parsers");
        stop_pool(&mut self.parsers, grace).await;

        let mut summary = aggregator.await?;
        summary.fetch_failures = self.outcomes.fetch_failures.load(Ordering::Relaxed);
        summary.parse_failures = self.outcomes.parse_failures.load(Ordering::Relaxed);
        summary.robots_requests = self.politeness.robots_requests() as u64;

        tracing::info!(
            "Crawl finished: {} pages in {:.1}s",
            summary.pages_retrieved,
            summary.elapsed.as_secs_f64()
        );
        Ok(summary)
    }
}

async fn stop_pool(pool: &mut [WorkerHandle], grace: std::time::Duration) {
    for worker in pool.iter() {
        worker.request_stop();
    }

    let deadline = tokio::time::Instant::now() + grace;
    for worker in pool.iter_mut() {
        if !worker.shutdown_before(deadline).await {
            tracing::debug!("{} was stopped forcibly", worker.id());
        }
    }
}

/// Runs a complete crawl and returns its summary
///
/// # Arguments
///
/// * `config` - The crawl configuration
/// * `prefs` - Debug flag and page ceiling
/// * `sink` - Receives a report for every parsed page
pub async fn run_crawl<S>(config: CrawlConfig, prefs: Arc<Preferences>, sink: S) -> Result<CrawlSummary>
where
    S: ReportSink + 'static,
{
    let mut crawler = Crawler::new(config, prefs)?;
    crawler.start(sink)?;
    crawler.seed();
    crawler.wait_until_idle().await?;
    crawler.shutdown().await
}

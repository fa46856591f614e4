//! Per-host cache of robots.txt rules
//!
//! Each host gets one `OnceCell`. The first caller for a host fetches and
//! parses its robots.txt while every other caller for that host waits on the
//! same cell, so at most one robots.txt request is made per host per run.
//! A failed fetch is cached as "no rule" and never retried.

use crate::config::NetworkSettings;
use crate::robots::{build_instruction, RobotInstruction, RobotRule};
use crate::state::HostState;
use crate::url::{origin_key, robots_url};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::OnceCell;
use url::Url;

type RuleCell = Arc<OnceCell<Option<Arc<RobotRule>>>>;

/// Politeness cache shared by all fetchers
pub struct PolitenessCache {
    client: Client,
    timeout: Duration,
    max_delay: Duration,
    rules: Mutex<HashMap<String, RuleCell>>,
    hosts: Mutex<HashMap<String, HostState>>,
    requests: AtomicUsize,
}

impl PolitenessCache {
    /// Creates an empty cache that fetches robots.txt through `client`
    pub fn new(client: Client, settings: &NetworkSettings) -> Self {
        Self {
            client,
            timeout: settings.robots_timeout(),
            max_delay: settings.max_crawl_delay(),
            rules: Mutex::new(HashMap::new()),
            hosts: Mutex::new(HashMap::new()),
            requests: AtomicUsize::new(0),
        }
    }

    fn lock_rules(&self) -> MutexGuard<'_, HashMap<String, RuleCell>> {
        self.rules.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Checks whether `url` may be crawled
    ///
    /// Resolves the host's rule first if it is not cached yet. Hosts whose
    /// rule could not be obtained get [`RobotInstruction::permissive`].
    pub async fn check_permission(&self, url: &Url) -> RobotInstruction {
        match self.rule_for(url).await {
            Some(rule) => build_instruction(url.as_str(), &rule),
            None => RobotInstruction::permissive(),
        }
    }

    /// Returns the rule for the host serving `url`, resolving it if needed
    pub async fn rule_for(&self, url: &Url) -> Option<Arc<RobotRule>> {
        let key = origin_key(url)?;
        let location = robots_url(url)?;

        let cell = self.lock_rules().entry(key).or_default().clone();

        cell.get_or_init(|| self.fetch_rule(location))
            .await
            .clone()
    }

    async fn fetch_rule(&self, location: Url) -> Option<Arc<RobotRule>> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        tracing::debug!("Fetching {}", location);

        let response = match self
            .client
            .get(location.clone())
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("No robots.txt rule for {}: {}", location, e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!(
                "No robots.txt rule for {}: HTTP {}",
                location,
                response.status()
            );
            return None;
        }

        match response.text().await {
            Ok(body) => Some(Arc::new(RobotRule::parse(&body))),
            Err(e) => {
                tracing::debug!("Unreadable robots.txt at {}: {}", location, e);
                None
            }
        }
    }

    /// Returns true once the host serving `url` has a published entry
    pub fn is_resolved(&self, url: &Url) -> bool {
        origin_key(url)
            .and_then(|key| self.lock_rules().get(&key).cloned())
            .is_some_and(|cell| cell.initialized())
    }

    /// Hosts whose robots.txt is currently being resolved
    pub fn in_flight_hosts(&self) -> Vec<String> {
        let mut hosts: Vec<String> = self
            .lock_rules()
            .iter()
            .filter(|(_, cell)| !cell.initialized())
            .map(|(key, _)| key.clone())
            .collect();
        hosts.sort();
        hosts
    }

    /// Number of robots.txt requests sent so far
    pub fn robots_requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Waits until a request to the host serving `url` respects its crawl delay
    ///
    /// The delay is capped at the configured maximum. Each call claims the next
    /// slot for the host, so concurrent callers are spaced out one after another.
    pub async fn wait_for_turn(&self, url: &Url, delay_secs: u64) {
        if delay_secs == 0 {
            return;
        }
        let Some(key) = origin_key(url) else {
            return;
        };

        let delay = Duration::from_secs(delay_secs).min(self.max_delay);
        let wait = {
            let mut hosts = self.hosts.lock().unwrap_or_else(PoisonError::into_inner);
            hosts
                .entry(key)
                .or_default()
                .reserve_slot(delay, Instant::now())
        };

        if !wait.is_zero() {
            tracing::trace!("Waiting {:?} before requesting {}", wait, url);
            tokio::time::sleep(wait).await;
        }
    }
}

use std::time::{Duration, Instant};

/// Tracks request spacing for a single host
///
/// Used to honor robots.txt crawl delays. A fetcher reserves its request slot
/// up front, so concurrent fetchers targeting the same host queue up behind
/// each other instead of all waiting for the same instant.
#[derive(Debug, Clone, Default)]
pub struct HostState {
    /// Number of requests scheduled against this host
    pub request_count: u32,

    /// When the most recently scheduled request may start
    pub last_request_time: Option<Instant>,
}

impl HostState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculates the time until the next request can be made
    ///
    /// Returns None if a request can be made now, or the duration to wait otherwise.
    pub fn time_until_next_request(&self, delay: Duration, now: Instant) -> Option<Duration> {
        let last = self.last_request_time?;
        let ready_at = last + delay;
        if ready_at > now {
            Some(ready_at - now)
        } else {
            None
        }
    }

    /// Records a request at `now`
    pub fn record_request(&mut self, now: Instant) {
        self.request_count += 1;
        self.last_request_time = Some(now);
    }

    /// Claims the next free request slot and returns how long to wait for it
    ///
    /// # Arguments
    ///
    /// * `delay` - Minimum spacing between two requests to this host
    /// * `now` - The current time instant
    pub fn reserve_slot(&mut self, delay: Duration, now: Instant) -> Duration {
        let wait = self.time_until_next_request(delay, now).unwrap_or_default();
        self.record_request(now + wait);
        wait
    }
}

//! Frontier queue of URLs waiting to be fetched

use crate::buffers::QueueListener;
use crate::listeners::ListenerSet;
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct FrontierInner {
    queue: VecDeque<String>,
    pending: HashSet<String>,
}

/// Thread-safe, deduplicating FIFO of pending URLs
///
/// A URL is rejected while an identical string is still pending. The
/// comparison is exact and case-sensitive; no normalization is applied.
/// Once a URL has been dequeued it may be added again.
#[derive(Default)]
pub struct Frontier {
    inner: Mutex<FrontierInner>,
    listeners: ListenerSet<dyn QueueListener>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FrontierInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns whether at least one URL is pending
    pub fn has_pending(&self) -> bool {
        let head = self.lock().queue.front().cloned();
        let found = head.is_some();
        self.listeners
            .notify(|l| l.on_peek(found, head.as_deref()));
        found
    }

    /// Removes and returns the oldest pending URL
    pub fn next_pending(&self) -> Option<String> {
        let next = {
            let mut inner = self.lock();
            let next = inner.queue.pop_front();
            if let Some(url) = &next {
                inner.pending.remove(url);
            }
            next
        };

        let success = next.is_some();
        self.listeners
            .notify(|l| l.on_retrieved(next.as_deref(), success));
        next
    }

    /// Adds a URL unless it is empty or already pending
    ///
    /// Returns whether the URL was accepted.
    pub fn add_pending(&self, url: &str) -> bool {
        let accepted = !url.is_empty() && {
            let mut inner = self.lock();
            if inner.pending.insert(url.to_string()) {
                inner.queue.push_back(url.to_string());
                true
            } else {
                false
            }
        };

        self.listeners.notify(|l| l.on_added(url, accepted));
        accepted
    }

    /// Returns the number of pending URLs
    pub fn num_pending(&self) -> usize {
        self.lock().queue.len()
    }

    pub fn add_listener(&self, listener: Arc<dyn QueueListener>) {
        self.listeners.add(listener);
    }

    pub fn remove_listener(&self, listener: &Arc<dyn QueueListener>) -> bool {
        self.listeners.remove(listener)
    }

    pub fn remove_all_listeners(&self) {
        self.listeners.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[derive(Default)]
    struct RecordingListener {
        events: Mutex<Vec<String>>,
    }

    impl QueueListener for RecordingListener {
        fn on_peek(&self, found: bool, value: Option<&str>) {
            self.events
                .lock()
                .unwrap()
                .push(format!("peek {} {:?}", found, value));
        }

        fn on_added(&self, value: &str, accepted: bool) {
            self.events
                .lock()
                .unwrap()
                .push(format!("add {} {}", value, accepted));
        }

        fn on_retrieved(&self, value: Option<&str>, success: bool) {
            self.events
                .lock()
                .unwrap()
                .push(format!("get {:?} {}", value, success));
        }
    }

    #[test]
    fn test_fifo_order() {
        let frontier = Frontier::new();
        assert!(frontier.add_pending("http://a.com/1"));
        assert!(frontier.add_pending("http://a.com/2"));
        assert!(frontier.add_pending("http://a.com/3"));

        assert_eq!(frontier.next_pending().as_deref(), Some("http://a.com/1"));
        assert_eq!(frontier.next_pending().as_deref(), Some("http://a.com/2"));
        assert_eq!(frontier.next_pending().as_deref(), Some("http://a.com/3"));
        assert_eq!(frontier.next_pending(), None);
    }

    #[test]
    fn test_rejects_empty() {
        let frontier = Frontier::new();
        assert!(!frontier.add_pending(""));
        assert!(!frontier.has_pending());
    }

    #[test]
    fn test_rejects_pending_duplicate() {
        let frontier = Frontier::new();
        assert!(frontier.add_pending("http://a.com/"));
        assert!(!frontier.add_pending("http://a.com/"));
        assert_eq!(frontier.num_pending(), 1);
    }

    #[test]
    fn test_dedup_is_case_sensitive() {
        let frontier = Frontier::new();
        assert!(frontier.add_pending("http://a.com/Page"));
        assert!(frontier.add_pending("http://a.com/page"));
        assert_eq!(frontier.num_pending(), 2);
    }

    #[test]
    fn test_readd_after_dequeue() {
        let frontier = Frontier::new();
        frontier.add_pending("http://a.com/");
        frontier.next_pending();
        assert!(frontier.add_pending("http://a.com/"));
    }

    #[test]
    fn test_listener_notifications() {
        let frontier = Frontier::new();
        let listener = Arc::new(RecordingListener::default());
        frontier.add_listener(listener.clone());

        frontier.add_pending("http://a.com/");
        frontier.add_pending("http://a.com/");
        frontier.has_pending();
        frontier.next_pending();
        frontier.next_pending();

        let events = listener.events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                "add http://a.com/ true",
                "add http://a.com/ false",
                "peek true Some(\"http://a.com/\")",
                "get Some(\"http://a.com/\") true",
                "get None false",
            ]
        );
    }

    #[test]
    fn test_removed_listener_not_notified() {
        let frontier = Frontier::new();
        let listener = Arc::new(RecordingListener::default());
        let as_dyn: Arc<dyn QueueListener> = listener.clone();
        frontier.add_listener(as_dyn.clone());
        assert!(frontier.remove_listener(&as_dyn));

        frontier.add_pending("http://a.com/");
        assert!(listener.events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_concurrent_adds_never_duplicate() {
        let frontier = Arc::new(Frontier::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let frontier = frontier.clone();
                thread::spawn(move || {
                    for i in 0..100 {
                        frontier.add_pending(&format!("http://a.com/{}", i));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(frontier.num_pending(), 100);
    }

    #[test]
    fn test_concurrent_consumers_never_share_a_url() {
        let frontier = Arc::new(Frontier::new());
        for i in 0..500 {
            frontier.add_pending(&format!("http://a.com/{}", i));
        }

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let frontier = frontier.clone();
                thread::spawn(move || {
                    let mut taken = Vec::new();
                    while let Some(url) = frontier.next_pending() {
                        taken.push(url);
                    }
                    taken
                })
            })
            .collect();

        let mut all: Vec<String> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 500);
    }
}

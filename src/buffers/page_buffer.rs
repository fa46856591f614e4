//! Page buffer of fetched content waiting to be parsed

use crate::buffers::QueueListener;
use crate::listeners::ListenerSet;
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct PageBufferInner {
    pages: VecDeque<(String, String)>,
    pending: HashSet<String>,
}

/// Thread-safe FIFO of `(url, content)` pairs handed from fetchers to parsers
///
/// A URL and its content are stored as one element, so a dequeued pair is
/// always the pair that was added together. Dedup is keyed on the URL only.
#[derive(Default)]
pub struct PageBuffer {
    inner: Mutex<PageBufferInner>,
    listeners: ListenerSet<dyn QueueListener>,
}

impl PageBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, PageBufferInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns whether at least one page is pending
    pub fn has_pending(&self) -> bool {
        let head = self.lock().pages.front().map(|(url, _)| url.clone());
        let found = head.is_some();
        self.listeners
            .notify(|l| l.on_peek(found, head.as_deref()));
        found
    }

    /// Removes and returns the oldest `(url, content)` pair
    pub fn next_pending(&self) -> Option<(String, String)> {
        let next = {
            let mut inner = self.lock();
            let next = inner.pages.pop_front();
            if let Some((url, _)) = &next {
                inner.pending.remove(url);
            }
            next
        };

        let url = next.as_ref().map(|(url, _)| url.as_str());
        self.listeners
            .notify(|l| l.on_retrieved(url, url.is_some()));
        next
    }

    /// Adds a fetched page unless either part is empty or the URL is already pending
    ///
    /// Returns whether the pair was accepted.
    pub fn add_pending(&self, url: &str, content: &str) -> bool {
        let accepted = !url.is_empty() && !content.is_empty() && {
            let mut inner = self.lock();
            if inner.pending.insert(url.to_string()) {
                inner
                    .pages
                    .push_back((url.to_string(), content.to_string()));
                true
            } else {
                false
            }
        };

        self.listeners.notify(|l| l.on_added(url, accepted));
        accepted
    }

    /// Returns the number of pending pages
    ///
    /// This takes the buffer lock and competes with every fetcher and parser;
    /// the value may be stale as soon as it is returned.
    pub fn num_pending(&self) -> usize {
        self.lock().pages.len()
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

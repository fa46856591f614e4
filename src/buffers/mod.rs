//! Shared work queues
//!
//! Two queues decouple the fetcher and parser pools:
//! - [`Frontier`]: URLs discovered but not yet fetched
//! - [`PageBuffer`]: fetched `(url, content)` pairs waiting to be parsed
//!
//! Both queues are FIFO, reject empty input and reject a URL that is already
//! pending. Every operation is reported to the registered [`QueueListener`]s
//! after the queue lock has been released.

mod frontier;
mod page_buffer;

pub use frontier::Frontier;
pub use page_buffer::PageBuffer;

/// Observer of queue operations
///
/// Listeners are informational only; nothing they do affects queue state.
/// The value passed is the URL involved in the operation, if any.
pub trait QueueListener: Send + Sync {
    /// Called after `has_pending`, with the head of the queue if there is one
    fn on_peek(&self, found: bool, value: Option<&str>) {
        let _ = (found, value);
    }

    /// Called after `add_pending`, with whether the value was accepted
    fn on_added(&self, value: &str, accepted: bool) {
        let _ = (value, accepted);
    }

    /// Called after `next_pending`, with the value removed if there was one
    fn on_retrieved(&self, value: Option<&str>, success: bool) {
        let _ = (value, success);
    }
}

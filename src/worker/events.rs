//! Worker identities, lifecycle events and their listeners

use crate::CrawlError;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Which pool a worker belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerKind {
    Fetcher,
    Parser,
}

impl WorkerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetcher => "fetcher",
            Self::Parser => "parser",
        }
    }
}

/// Identity of a single worker, displayed as `fetcher-3` or `parser-1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkerId {
    pub kind: WorkerKind,
    pub index: usize,
}

impl WorkerId {
    pub fn fetcher(index: usize) -> Self {
        Self {
            kind: WorkerKind::Fetcher,
            index,
        }
    }

    pub fn parser(index: usize) -> Self {
        Self {
            kind: WorkerKind::Parser,
            index,
        }
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind.as_str(), self.index)
    }
}

/// What happened to a worker
#[derive(Debug, Clone)]
pub enum WorkerEventKind {
    Started,
    Idle,
    Working,
    Shutdown,
    Succeeded {
        url: String,
    },
    Failed {
        url: String,
        error: Option<Arc<CrawlError>>,
    },
}

/// A lifecycle or outcome notification from one worker
#[derive(Debug, Clone)]
pub struct WorkerEvent {
    pub worker: WorkerId,
    pub kind: WorkerEventKind,
}

impl WorkerEvent {
    pub fn new(worker: WorkerId, kind: WorkerEventKind) -> Self {
        Self { worker, kind }
    }
}

/// Observer of worker events
///
/// Every callback defaults to doing nothing, so implementors override only
/// what they care about. Callbacks run on the worker's task and should return
/// quickly.
pub trait WorkerListener: Send + Sync {
    fn on_start(&self, worker: &WorkerId) {
        let _ = worker;
    }

    fn on_idle(&self, worker: &WorkerId) {
        let _ = worker;
    }

    fn on_working(&self, worker: &WorkerId) {
        let _ = worker;
    }

    fn on_shutdown(&self, worker: &WorkerId) {
        let _ = worker;
    }

    /// A unit of work for `url` completed
    fn on_success(&self, worker: &WorkerId, url: &str) {
        let _ = (worker, url);
    }

    /// A unit of work for `url` failed, with the cause when one is known
    fn on_fail(&self, worker: &WorkerId, url: &str, error: Option<&CrawlError>) {
        let _ = (worker, url, error);
    }

    /// Routes an event to the matching callback
    fn on_event(&self, event: &WorkerEvent) {
        let id = &event.worker;
        match &event.kind {
            WorkerEventKind::Started => self.on_start(id),
            WorkerEventKind::Idle => self.on_idle(id),
            WorkerEventKind::Working => self.on_working(id),
            WorkerEventKind::Shutdown => self.on_shutdown(id),
            WorkerEventKind::Succeeded { url } => self.on_success(id, url),
            WorkerEventKind::Failed { url, error } => self.on_fail(id, url, error.as_deref()),
        }
    }
}

/// Forwards every event into a channel
///
/// Events sent after the receiver is dropped are discarded.
pub struct ChannelListener {
    tx: mpsc::UnboundedSender<WorkerEvent>,
}

impl ChannelListener {
    pub fn new(tx: mpsc::UnboundedSender<WorkerEvent>) -> Self {
        Self { tx }
    }

    /// Creates a listener together with the receiving end of its channel
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<WorkerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl WorkerListener for ChannelListener {
    fn on_event(&self, event: &WorkerEvent) {
        let _ = self.tx.send(event.clone());
    }
}

/// Logs worker events through `tracing`
///
/// Registered automatically when the debug preference is on.
#[derive(Debug, Default)]
pub struct TracingListener;

impl WorkerListener for TracingListener {
    fn on_start(&self, worker: &WorkerId) {
        tracing::debug!("{} started", worker);
    }

    fn on_idle(&self, worker: &WorkerId) {
        tracing::debug!("{} idle", worker);
    }

    fn on_working(&self, worker: &WorkerId) {
        tracing::debug!("{} working", worker);
    }

    fn on_shutdown(&self, worker: &WorkerId) {
        tracing::debug!("{} shut down", worker);
    }

    fn on_success(&self, worker: &WorkerId, url: &str) {
        tracing::debug!("{} finished {}", worker, url);
    }

    fn on_fail(&self, worker: &WorkerId, url: &str, error: Option<&CrawlError>) {
        match error {
            Some(e) => tracing::debug!("{} failed {}: {}", worker, url, e),
            None => tracing::debug!("{} failed {}", worker, url),
        }
    }
}

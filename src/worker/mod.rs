//! Generic polling workers
//!
//! A worker wraps a [`Job`] in a task that repeatedly asks the job to do one
//! unit of work. The loop:
//! 1. Emits `Started` once the task runs
//! 2. Checks the run flag at the top of every iteration
//! 3. Calls [`Job::step`], then sleeps for the poll interval if the job was idle
//! 4. Emits `Shutdown` when the run flag is cleared or the job asks to stop
//!
//! Status changes are edge-triggered: `Working` and `Idle` events fire only
//! when the status actually changes.

mod events;
mod status;

pub use events::{
    ChannelListener, TracingListener, WorkerEvent, WorkerEventKind, WorkerId, WorkerKind,
    WorkerListener,
};
pub use status::{StatusCell, WorkerStatus};

use crate::config::WorkerSettings;
use crate::listeners::ListenerSet;
use crate::CrawlError;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Outcome of a single [`Job::step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Work was found and handled, successfully or not
    Worked,

    /// Nothing to do; the worker sleeps before polling again
    Idle,

    /// The job cannot continue and the worker should exit
    Stop,
}

/// One unit of repeatable work driven by a worker loop
pub trait Job: Send + 'static {
    /// Performs at most one unit of work
    ///
    /// Implementations call [`WorkerContext::mark_working`] as soon as they
    /// have taken work, and report outcomes through
    /// [`WorkerContext::succeeded`] and [`WorkerContext::failed`].
    fn step(&mut self, worker: &WorkerContext) -> impl Future<Output = Step> + Send;
}

/// Listener registry shared by every worker of a crawl
pub type WorkerListeners = Arc<ListenerSet<dyn WorkerListener>>;

/// State shared between a worker task and its handle
pub struct WorkerContext {
    id: WorkerId,
    status: StatusCell,
    running: AtomicBool,
    listeners: WorkerListeners,
}

impl WorkerContext {
    pub(crate) fn new(id: WorkerId, listeners: WorkerListeners) -> Self {
        Self {
            id,
            status: StatusCell::new(),
            running: AtomicBool::new(true),
            listeners,
        }
    }

    pub fn id(&self) -> WorkerId {
        self.id
    }

    pub fn status(&self) -> WorkerStatus {
        self.status.get()
    }

    /// Returns false once shutdown has been requested
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn mark_working(&self) {
        self.enter(WorkerStatus::Working, WorkerEventKind::Working);
    }

    pub fn mark_idle(&self) {
        self.enter(WorkerStatus::Idle, WorkerEventKind::Idle);
    }

    /// Reports that the unit of work for `url` succeeded
    pub fn succeeded(&self, url: &str) {
        self.emit(WorkerEventKind::Succeeded {
            url: url.to_string(),
        });
    }

    /// Reports that the unit of work for `url` failed
    pub fn failed(&self, url: &str, error: Option<CrawlError>) {
        self.emit(WorkerEventKind::Failed {
            url: url.to_string(),
            error: error.map(Arc::new),
        });
    }

    fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    fn enter(&self, next: WorkerStatus, kind: WorkerEventKind) {
        match self.status.transition(next) {
            Ok(true) => self.emit(kind),
            Ok(false) => {}
            Err(e) => tracing::error!("{}: {}", self.id, e),
        }
    }

    fn emit(&self, kind: WorkerEventKind) {
        let event = WorkerEvent::new(self.id, kind);
        self.listeners.notify(|l| l.on_event(&event));
    }
}

/// Handle to a spawned worker
pub struct WorkerHandle {
    context: Arc<WorkerContext>,
    task: Option<JoinHandle<()>>,
    grace: Duration,
}

impl WorkerHandle {
    pub fn id(&self) -> WorkerId {
        self.context.id
    }

    pub fn status(&self) -> WorkerStatus {
        self.context.status()
    }

    /// Returns true once the worker task has begun running
    pub fn has_started(&self) -> bool {
        self.status() != WorkerStatus::Unknown
    }

    /// Returns true if the worker is started or idle
    pub fn is_idle(&self) -> bool {
        self.status().is_idle()
    }

    pub fn is_running(&self) -> bool {
        self.context.is_running() && !self.status().is_terminal()
    }

    /// Clears the run flag without waiting for the worker to exit
    pub fn request_stop(&self) {
        self.context.stop();
    }

    /// Stops the worker
    ///
    /// Clears the run flag, then waits up to the grace period for the loop to
    /// exit on its own. A worker still blocked after that, for example on a
    /// slow read, is aborted. Returns true if the worker exited cleanly.
    pub async fn shutdown(&mut self) -> bool {
        let deadline = tokio::time::Instant::now() + self.grace;
        self.shutdown_before(deadline).await
    }

    /// Like [`WorkerHandle::shutdown`], with a grace period ending at `deadline`
    ///
    /// Lets a pool share one grace period instead of waiting for each worker
    /// in turn.
    pub async fn shutdown_before(&mut self, deadline: tokio::time::Instant) -> bool {
        self.context.stop();

        let Some(mut task) = self.task.take() else {
            return true;
        };

        match tokio::time::timeout_at(deadline, &mut task).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                tracing::error!("{} task ended abnormally: {}", self.context.id, e);
                self.context
                    .enter(WorkerStatus::Shutdown, WorkerEventKind::Shutdown);
                false
            }
            Err(_) => {
                tracing::warn!("{} did not stop in time, aborting", self.context.id);
                task.abort();
                let _ = task.await;
                self.context
                    .enter(WorkerStatus::Shutdown, WorkerEventKind::Shutdown);
                false
            }
        }
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        self.context.stop();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Spawns `job` on the current tokio runtime
pub fn spawn_worker<J: Job>(
    job: J,
    id: WorkerId,
    listeners: WorkerListeners,
    settings: &WorkerSettings,
) -> WorkerHandle {
    let context = Arc::new(WorkerContext::new(id, listeners));
    let task = tokio::spawn(run_loop(job, context.clone(), settings.poll_interval()));

    WorkerHandle {
        context,
        task: Some(task),
        grace: settings.shutdown_grace(),
    }
}

async fn run_loop<J: Job>(mut job: J, context: Arc<WorkerContext>, poll_interval: Duration) {
    context.enter(WorkerStatus::Started, WorkerEventKind::Started);

    while context.is_running() {
        match job.step(&context).await {
            Step::Worked => context.mark_working(),
            Step::Idle => {
                context.mark_idle();
                tokio::time::sleep(poll_interval).await;
            }
            Step::Stop => {
                tracing::error!("{} cannot continue, stopping", context.id);
                break;
            }
        }
    }

    context.stop();
    context.enter(WorkerStatus::Shutdown, WorkerEventKind::Shutdown);
}

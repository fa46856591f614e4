//! Worker status definitions
//!
//! A worker moves through `Unknown -> Started -> Working/Idle -> Shutdown`.
//! Only the worker's own task writes its status, apart from a handle marking
//! an aborted worker as shut down; anyone may read it.

use crate::CrawlError;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Represents the current state of a worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerStatus {
    /// The worker has been created but its task has not run yet
    Unknown,

    /// The worker task is running and has not polled for work yet
    Started,

    /// The last poll found no work
    Idle,

    /// The last poll found work
    Working,

    /// The worker has stopped; terminal
    Shutdown,
}

impl WorkerStatus {
    /// Returns true if moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: WorkerStatus) -> bool {
        use WorkerStatus::*;
        matches!(
            (self, next),
            (Unknown, Started)
                | (Unknown, Shutdown)
                | (Started, Idle)
                | (Started, Working)
                | (Started, Shutdown)
                | (Idle, Working)
                | (Idle, Shutdown)
                | (Working, Idle)
                | (Working, Shutdown)
        )
    }

    /// Returns true if the worker is running but has no work in hand
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Started | Self::Idle)
    }

    /// Returns true if this is the terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Shutdown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Started => "started",
            Self::Idle => "idle",
            Self::Working => "working",
            Self::Shutdown => "shutdown",
        }
    }

    fn to_u8(self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::Started => 1,
            Self::Idle => 2,
            Self::Working => 3,
            Self::Shutdown => 4,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Started,
            2 => Self::Idle,
            3 => Self::Working,
            4 => Self::Shutdown,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for WorkerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Atomically readable status of one worker
#[derive(Debug)]
pub struct StatusCell(AtomicU8);

impl StatusCell {
    pub fn new() -> Self {
        Self(AtomicU8::new(WorkerStatus::Unknown.to_u8()))
    }

    pub fn get(&self) -> WorkerStatus {
        WorkerStatus::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Moves to `next`
    ///
    /// Returns `Ok(true)` when the status changed, `Ok(false)` when it already
    /// was `next`, and an error for an illegal transition.
    pub fn transition(&self, next: WorkerStatus) -> Result<bool, CrawlError> {
        let current = self.get();
        if current == next {
            return Ok(false);
        }
        if !current.can_transition_to(next) {
            return Err(CrawlError::InvalidTransition {
                from: current,
                to: next,
            });
        }
        self.0.store(next.to_u8(), Ordering::Release);
        Ok(true)
    }
}

impl Default for StatusCell {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [WorkerStatus; 5] = [
        WorkerStatus::Unknown,
        WorkerStatus::Started,
        WorkerStatus::Idle,
        WorkerStatus::Working,
        WorkerStatus::Shutdown,
    ];

    #[test]
    fn test_shutdown_is_terminal() {
        for next in ALL {
            assert!(!WorkerStatus::Shutdown.can_transition_to(next));
        }
    }

    #[test]
    fn test_idle_working_cycle() {
        assert!(WorkerStatus::Idle.can_transition_to(WorkerStatus::Working));
        assert!(WorkerStatus::Working.can_transition_to(WorkerStatus::Idle));
        assert!(!WorkerStatus::Working.can_transition_to(WorkerStatus::Started));
        assert!(!WorkerStatus::Unknown.can_transition_to(WorkerStatus::Working));
    }

    #[test]
    fn test_is_idle() {
        assert!(WorkerStatus::Started.is_idle());
        assert!(WorkerStatus::Idle.is_idle());
        assert!(!WorkerStatus::Working.is_idle());
        assert!(!WorkerStatus::Unknown.is_idle());
        assert!(!WorkerStatus::Shutdown.is_idle());
    }

    #[test]
    fn test_u8_roundtrip() {
        for status in ALL {
            assert_eq!(WorkerStatus::from_u8(status.to_u8()), status);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(WorkerStatus::Working.to_string(), "working");
        assert_eq!(WorkerStatus::Shutdown.to_string(), "shutdown");
    }

    #[test]
    fn test_cell_transitions() {
        let cell = StatusCell::new();
        assert_eq!(cell.get(), WorkerStatus::Unknown);

        assert!(cell.transition(WorkerStatus::Started).unwrap());
        assert!(cell.transition(WorkerStatus::Working).unwrap());
        assert!(!cell.transition(WorkerStatus::Working).unwrap());
        assert!(cell.transition(WorkerStatus::Idle).unwrap());
        assert!(cell.transition(WorkerStatus::Shutdown).unwrap());

        assert!(matches!(
            cell.transition(WorkerStatus::Working),
            Err(CrawlError::InvalidTransition { .. })
        ));
        assert_eq!(cell.get(), WorkerStatus::Shutdown);
    }
}

//! Shared page budget
//!
//! Workers reserve a slot before starting a page and commit it only when the
//! page is handed on. Reserved and committed slots together never exceed the
//! ceiling, so concurrent workers cannot overshoot it. The ceiling is read
//! live from [`Preferences`] on every check.

use crate::config::Preferences;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct BudgetState {
    committed: usize,
    reserved: usize,
}

/// Counter of pages against the preferences' page ceiling
#[derive(Debug)]
pub struct PageBudget {
    prefs: Arc<Preferences>,
    state: Mutex<BudgetState>,
}

impl PageBudget {
    pub fn new(prefs: Arc<Preferences>) -> Self {
        Self {
            prefs,
            state: Mutex::new(BudgetState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BudgetState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn ceiling(&self) -> usize {
        self.prefs.max_pages()
    }

    /// Returns true if another slot could be reserved right now
    pub fn has_room(&self) -> bool {
        let state = self.lock();
        state.committed + state.reserved < self.ceiling()
    }

    /// Reserves a slot, or returns `None` when the budget is fully claimed
    pub fn try_reserve(self: &Arc<Self>) -> Option<BudgetSlot> {
        let mut state = self.lock();
        if state.committed + state.reserved >= self.ceiling() {
            return None;
        }
        state.reserved += 1;

        Some(BudgetSlot {
            budget: Arc::clone(self),
            settled: false,
        })
    }

    /// Number of pages committed so far
    pub fn committed(&self) -> usize {
        self.lock().committed
    }

    /// Returns true once committed pages have reached the ceiling
    pub fn is_exhausted(&self) -> bool {
        self.committed() >= self.ceiling()
    }
}

/// A reserved budget slot
///
/// Dropping the slot without calling [`BudgetSlot::commit`] returns it to the
/// budget.
#[derive(Debug)]
pub struct BudgetSlot {
    budget: Arc<PageBudget>,
    settled: bool,
}

impl BudgetSlot {
    /// Counts the reserved page against the budget
    pub fn commit(mut self) {
        let mut state = self.budget.lock();
        state.reserved = state.reserved.saturating_sub(1);
        state.committed += 1;
        self.settled = true;
    }
}

impl Drop for BudgetSlot {
    fn drop(&mut self) {
        if !self.settled {
            let mut state = self.budget.lock();
            state.reserved = state.reserved.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn budget(max_pages: usize) -> Arc<PageBudget> {
        let prefs = Arc::new(Preferences::new());
        prefs.set_max_pages(max_pages);
        Arc::new(PageBudget::new(prefs))
    }

    #[test]
    fn test_reserve_until_full() {
        let budget = budget(2);
        let a = budget.try_reserve().unwrap();
        let _b = budget.try_reserve().unwrap();
        assert!(!budget.has_room());
        assert!(budget.try_reserve().is_none());

        a.commit();
        assert_eq!(budget.committed(), 1);
        assert!(!budget.is_exhausted());
    }

    #[test]
    fn test_dropped_slot_is_released() {
        let budget = budget(1);
        let slot = budget.try_reserve().unwrap();
        drop(slot);

        assert!(budget.has_room());
        assert_eq!(budget.committed(), 0);
        budget.try_reserve().unwrap().commit();
        assert!(budget.is_exhausted());
    }

    #[test]
    fn test_ceiling_read_live() {
        let prefs = Arc::new(Preferences::new());
        prefs.set_max_pages(1);
        let budget = Arc::new(PageBudget::new(prefs.clone()));
        budget.try_reserve().unwrap().commit();
        assert!(budget.is_exhausted());

        prefs.set_max_pages(3);
        assert!(!budget.is_exhausted());
        assert!(budget.has_room());
    }

    #[test]
    fn test_concurrent_commits_never_exceed_ceiling() {
        let budget = budget(50);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let budget = budget.clone();
                thread::spawn(move || {
                    let mut committed = 0;
                    for _ in 0..100 {
                        if let Some(slot) = budget.try_reserve() {
                            slot.commit();
                            committed += 1;
                        }
                    }
                    committed
                })
            })
            .collect();

        let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total, 50);
        assert_eq!(budget.committed(), 50);
    }
}

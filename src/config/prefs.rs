//! Process-wide crawl preferences
//!
//! Preferences are owned by the front end and shared with the core as an
//! `Arc<Preferences>`. The core only reads them.

use crate::config::types::UPPER_LIMIT_PAGES;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Debug flag and page ceiling shared by every worker of a run
#[derive(Debug)]
pub struct Preferences {
    debug: AtomicBool,
    max_pages: AtomicUsize,
}

impl Preferences {
    /// Creates preferences with debug output off and the ceiling at the hard limit
    pub fn new() -> Self {
        Self {
            debug: AtomicBool::new(false),
            max_pages: AtomicUsize::new(UPPER_LIMIT_PAGES),
        }
    }

    pub fn debug(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }

    pub fn set_debug(&self, flag: bool) {
        self.debug.store(flag, Ordering::Relaxed);
    }

    /// Returns the current page ceiling
    pub fn max_pages(&self) -> usize {
        self.max_pages.load(Ordering::Relaxed)
    }

    /// Sets the page ceiling, capped at [`UPPER_LIMIT_PAGES`]
    pub fn set_max_pages(&self, max_pages: usize) {
        self.max_pages
            .store(max_pages.min(UPPER_LIMIT_PAGES), Ordering::Relaxed);
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Self::new()
    }
}

//! Robots.txt handling module
//!
//! This module provides functionality for fetching, parsing, and caching robots.txt files.
//! Rules are fetched once per host and kept for the lifetime of the crawl.

mod cache;
mod matcher;
mod parser;

pub use cache::PolitenessCache;
pub use matcher::{build_instruction, rule_matches};
pub use parser::RobotRule;

/// Whether a URL may be crawled, and how long to wait between requests to its host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RobotInstruction {
    pub can_crawl: bool,

    /// Crawl delay in seconds
    pub delay: u64,
}

impl RobotInstruction {
    /// The instruction used when no rule could be obtained for a host
    pub fn permissive() -> Self {
        Self {
            can_crawl: true,
            delay: 0,
        }
    }
}

impl Default for RobotInstruction {
    fn default() -> Self {
        Self::permissive()
    }
}

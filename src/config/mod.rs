//! Configuration module for the crawler
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and holds the process-wide [`Preferences`] shared with the workers.
//!
//! # Example
//!
//! ```no_run
//! use keyword_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl.toml")).unwrap();
//! println!("Fetchers: {}", config.workers.fetchers);
//! ```

mod parser;
mod prefs;
mod types;
mod validation;

// Re-export types
pub use prefs::Preferences;
pub use types::{
    CrawlConfig, CrawlSettings, NetworkSettings, WorkerSettings, DEFAULT_BLACKLIST, MAX_KEYWORDS,
    UPPER_LIMIT_PAGES,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;

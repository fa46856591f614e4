//! Keyword Crawler: a polite, multi-worker keyword miner
//!
//! This crate implements a web crawler in which a pool of fetchers and a pool of
//! parsers cooperate through shared queues. Fetched pages are mined for keyword
//! statistics and outbound links while per-host robots.txt rules and a global
//! page budget are respected.

pub mod buffers;
pub mod config;
pub mod crawler;
pub mod listeners;
pub mod output;
pub mod robots;
pub mod state;
pub mod url;
pub mod worker;

use thiserror::Error;

/// Main error type for crawler operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Malformed URL {url}: {source}")]
    InvalidUrl {
        url: String,
        source: ::url::ParseError,
    },

    #[error("Unsupported URL scheme for {url}")]
    UnsupportedScheme { url: String },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Unexpected HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Content type '{content_type}' is not accepted for {url}")]
    ContentType { url: String, content_type: String },

    #[error("URL disallowed by robots.txt: {url}")]
    RobotsDenied { url: String },

    #[error("Empty response body from {url}")]
    EmptyBody { url: String },

    #[error("Response body of {url} could not be decoded: {message}")]
    Encoding { url: String, message: String },

    #[error("Page buffer already holds {url}")]
    AlreadyBuffered { url: String },

    #[error("Invalid worker status transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: worker::WorkerStatus,
        to: worker::WorkerStatus,
    },

    #[error("Crawler has already been started")]
    AlreadyStarted,

    #[error("Crawler has not been started")]
    NotStarted,

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for crawler operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use buffers::{Frontier, PageBuffer};
pub use config::{CrawlConfig, Preferences};
pub use crawler::{crawl, run_crawl, Crawler};
pub use output::{CrawlReport, CrawlSummary, ReportSink};
pub use robots::{PolitenessCache, RobotInstruction, RobotRule};
pub use state::PageData;
pub use worker::{WorkerEvent, WorkerId, WorkerListener, WorkerStatus};

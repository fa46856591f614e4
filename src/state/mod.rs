//! Per-page and per-host crawl state
//!
//! # Components
//!
//! - `PageData`: Statistics for one parsed page, handed from a parser to the aggregator
//! - `HostState`: Request spacing for one host, used to honor crawl delays

mod host_state;
mod page_data;

// Re-export main types
pub use host_state::HostState;
pub use page_data::PageData;

//! Guichet Cache - Read-Through Table Cache
//!
//! The allocation table changes slowly but is polled by every open dashboard
//! session every few seconds; fetching upstream per request would blow
//! through the table service's rate limit. This crate holds the last
//! successful full-table snapshot and mediates all reads with
//! stale-while-revalidate semantics and single-flight refresh collapsing.
//!
//! See [`read_through::TableCache`] for the state machine and contracts.

pub mod fetcher;
pub mod read_through;

pub use fetcher::TableFetcher;
pub use read_through::{CacheState, CacheStatus, Snapshot, TableCache};

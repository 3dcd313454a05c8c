//! Fetcher seam between the cache and the remote table client.

use async_trait::async_trait;
use guichet_core::{Record, Result};

/// Source of full-table snapshots.
///
/// Implementations paginate through the upstream until the continuation
/// token runs out and return the complete record set, or the first error
/// encountered. The cache never retries a failed fetch on its own.
#[async_trait]
pub trait TableFetcher: Send + Sync {
    /// Fetch every record of the table, restricted to the display columns.
    async fn list_all(&self) -> Result<Vec<Record>>;
}

//! Shared application state for Axum routers.

use std::sync::Arc;

use guichet_cache::TableCache;

use crate::airtable::AirtableClient;
use crate::automation::AutomationClient;
use crate::config::{AppConfig, UPSTREAM_TIMEOUT};
use crate::error::{ApiError, ApiResult};

/// Type alias for the cache instance used by the API: one read-through entry
/// over the remote table client.
pub type ApiCache = TableCache<AirtableClient>;

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Read-through cache mediating every table read.
    pub cache: ApiCache,
    /// Remote table client, used directly for writes and backup listings.
    pub airtable: AirtableClient,
    /// Gateway to the automation webhook service.
    pub automation: AutomationClient,
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Build the state tree: one HTTP client shared by both upstream
    /// clients, and the cache wrapping the table client.
    pub fn new(config: AppConfig) -> ApiResult<Self> {
        let config = Arc::new(config);
        let http = reqwest::Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()
            .map_err(|e| ApiError::internal_error(format!("Failed to create HTTP client: {e}")))?;

        let airtable = AirtableClient::new(http.clone(), config.clone());
        let automation = AutomationClient::new(http, config.clone());
        let cache = TableCache::new(airtable.clone(), config.cache_ttl);

        Ok(Self {
            config,
            cache,
            airtable,
            automation,
            start_time: std::time::Instant::now(),
        })
    }
}

//! Guichet API - HTTP Proxy and Dashboard Server
//!
//! This crate exposes the allocation table to the browser dashboard: every
//! read goes through the read-through cache in `guichet-cache`, writes and
//! backup operations are proxied to the external table service and the
//! automation webhook service, and the static dashboard itself is served
//! behind a shared-credential gate.

pub mod airtable;
pub mod automation;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

// Re-export commonly used types
pub use airtable::AirtableClient;
pub use automation::AutomationClient;
pub use config::{AppConfig, UPSTREAM_TIMEOUT};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::create_router;
pub use state::{ApiCache, AppState};

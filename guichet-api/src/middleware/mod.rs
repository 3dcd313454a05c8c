//! Axum middleware for the dashboard's shared-credential gate.

pub mod auth;

pub use auth::require_dashboard_auth;

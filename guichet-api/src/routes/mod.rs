//! REST API Routes Module
//!
//! One module per concern, assembled here into the full application router:
//!
//! - `/api/*` and `/config.js` and the static dashboard, all behind the
//!   shared-credential gate
//! - `/health/*`, public
//!
//! CORS and request tracing wrap the whole router.

pub mod backup;
pub mod client_config;
pub mod data;
pub mod health;
pub mod record;

use axum::{
    http::{header, Method},
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::middleware::require_dashboard_auth;
use crate::state::AppState;

/// Create the complete application router.
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/data", get(data::get_data))
        .route("/api/update-record", patch(record::update_record))
        .route("/api/list-backups", get(backup::list_backups))
        .route("/api/trigger-restore", post(backup::trigger_restore))
        .route("/api/trigger-recovery", post(backup::trigger_recovery))
        .route("/api/save-snapshot", post(backup::save_snapshot))
        .route("/config.js", get(client_config::config_js))
        .fallback_service(ServeDir::new(&state.config.static_dir))
        .layer(from_fn_with_state(state.clone(), require_dashboard_auth))
        .with_state(state.clone());

    Router::new()
        .nest("/health", health::create_router(state))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
}

/// The dashboard is same-origin; the permissive layer only exists so
/// operators can front the API from another host without code changes.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_origin(Any)
}

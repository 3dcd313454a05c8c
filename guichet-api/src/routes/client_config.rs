//! Browser configuration script.
//!
//! `/config.js` hands the dashboard its column catalog, ordering, and
//! polling interval, generated per request from the running configuration.
//! Upstream credentials never appear here: the browser only ever talks to
//! this proxy.

use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use guichet_core::{ColumnSpec, COLUMNS};
use serde::Serialize;

use crate::config::AppConfig;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClientConfig<'a> {
    table_name: &'a str,
    refresh_ms: u64,
    columns: &'static [ColumnSpec],
}

/// GET /config.js - the dashboard's configuration as a script.
pub async fn config_js(State(state): State<AppState>) -> ApiResult<Response> {
    let script = render_config(&state.config)?;
    Ok((
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/javascript; charset=utf-8"),
        )],
        script,
    )
        .into_response())
}

fn render_config(config: &AppConfig) -> ApiResult<String> {
    let client_config = ClientConfig {
        table_name: &config.table_name,
        refresh_ms: config.client_refresh_ms,
        columns: COLUMNS,
    };
    let json = serde_json::to_string_pretty(&client_config)
        .map_err(|e| ApiError::internal_error(format!("Failed to render client config: {e}")))?;

    Ok(format!(
        "// Generated by the guichet server. Do not edit.\nwindow.GUICHET_CONFIG = {json};\n"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AppConfig {
        let mut config = AppConfig::from_env();
        config.airtable_api_key = "patVerySecretKey".to_string();
        config.dashboard_password = "hunter2".to_string();
        config.table_name = "Allocation billetterie".to_string();
        config.client_refresh_ms = 10_000;
        config
    }

    #[test]
    fn test_rendered_config_contains_the_catalog() {
        let script = render_config(&test_config()).unwrap();

        assert!(script.starts_with("// Generated by the guichet server"));
        assert!(script.contains("window.GUICHET_CONFIG = {"));
        assert!(script.contains("\"Allocation billetterie\""));
        assert!(script.contains("\"Ventes - Fever - Or\""));
        assert!(script.contains("\"Taux de remplissage\""));
        assert!(script.contains("\"refreshMs\": 10000"));
    }

    #[test]
    fn test_rendered_config_leaks_no_credentials() {
        let script = render_config(&test_config()).unwrap();

        assert!(!script.contains("patVerySecretKey"));
        assert!(!script.contains("hunter2"));
    }
}

//! Shared-credential gate.
//!
//! The dashboard is protected by one shared password checked over HTTP
//! Basic auth; the username half of the credential is ignored. A 401 with
//! `WWW-Authenticate: Basic` makes browsers prompt and replay the credential
//! on their own, so the static dashboard needs no login code of its own.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::Engine;

use crate::error::ApiError;
use crate::state::AppState;

/// Reject requests that don't carry the shared dashboard password.
///
/// An unset password is a server misconfiguration and answers 500 on the
/// gated routes rather than silently opening the dashboard.
pub async fn require_dashboard_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let expected = state.config.dashboard_password.as_str();
    if expected.is_empty() {
        return ApiError::configuration("GUICHET_DASHBOARD_PASSWORD is not set").into_response();
    }

    let supplied = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(basic_password);

    match supplied {
        Some(password) if password == expected => next.run(request).await,
        _ => {
            tracing::debug!(path = %request.uri().path(), "rejected request without valid dashboard credential");
            unauthorized_response()
        }
    }
}

/// Extract the password half of a `Basic` authorization header.
fn basic_password(header: &str) -> Option<String> {
    let encoded = header.strip_prefix("Basic ")?;
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (_user, password) = decoded.split_once(':')?;
    Some(password.to_string())
}

fn unauthorized_response() -> Response {
    let mut response = ApiError::unauthorized("Dashboard password required").into_response();
    response.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"guichet\", charset=\"UTF-8\""),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_basic(user: &str, password: &str) -> String {
        let raw = format!("{user}:{password}");
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(raw)
        )
    }

    #[test]
    fn test_basic_password_extraction() {
        assert_eq!(
            basic_password(&encode_basic("anyone", "hunter2")),
            Some("hunter2".to_string())
        );
        // Empty username is how browsers send a password-only credential.
        assert_eq!(
            basic_password(&encode_basic("", "hunter2")),
            Some("hunter2".to_string())
        );
    }

    #[test]
    fn test_password_may_contain_colons() {
        assert_eq!(
            basic_password(&encode_basic("user", "pa:ss:word")),
            Some("pa:ss:word".to_string())
        );
    }

    #[test]
    fn test_rejects_malformed_headers() {
        assert_eq!(basic_password("Bearer token123"), None);
        assert_eq!(basic_password("Basic not-base64!!!"), None);
        // Valid base64 but no colon separator.
        let no_colon = format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode("nocolon")
        );
        assert_eq!(basic_password(&no_colon), None);
    }

    #[test]
    fn test_unauthorized_response_prompts_browsers() {
        let response = unauthorized_response();
        assert_eq!(response.status(), axum::http::StatusCode::UNAUTHORIZED);
        let challenge = response
            .headers()
            .get(header::WWW_AUTHENTICATE)
            .and_then(|value| value.to_str().ok())
            .unwrap();
        assert!(challenge.starts_with("Basic"));
    }
}

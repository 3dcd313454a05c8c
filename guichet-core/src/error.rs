//! Error taxonomy shared across the workspace.
//!
//! Upstream errors keep the status code and body the external service
//! answered with; nothing here is retried automatically, so the diagnostics
//! must survive all the way to the caller.

use thiserror::Error;

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures talking to the external collaborators.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// A table read failed and no usable snapshot exists. `status` is absent
    /// when the request never reached the upstream (connect error, timeout).
    #[error("upstream fetch failed{}: {body}", fmt_status(.status))]
    UpstreamFetch { status: Option<u16>, body: String },

    /// A write (field update, restore, recovery, snapshot) was rejected or
    /// never reached the upstream. Never masked; the caller rolls back.
    #[error("upstream write failed{}: {body}", fmt_status(.status))]
    UpstreamWrite { status: Option<u16>, body: String },

    /// Required configuration is missing. Surfaced when the affected call is
    /// made, not at startup.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl Error {
    pub fn fetch(status: Option<u16>, body: impl Into<String>) -> Self {
        Error::UpstreamFetch {
            status,
            body: body.into(),
        }
    }

    pub fn write(status: Option<u16>, body: impl Into<String>) -> Self {
        Error::UpstreamWrite {
            status,
            body: body.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration(message.into())
    }

    /// The upstream HTTP status, when the upstream answered at all.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Error::UpstreamFetch { status, .. } | Error::UpstreamWrite { status, .. } => *status,
            Error::Configuration(_) => None,
        }
    }
}

fn fmt_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" ({code})"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display_includes_status_and_body() {
        let err = Error::fetch(Some(429), "rate limited");
        assert_eq!(err.to_string(), "upstream fetch failed (429): rate limited");
        assert_eq!(err.upstream_status(), Some(429));
    }

    #[test]
    fn test_network_error_display_omits_status() {
        let err = Error::write(None, "connection refused");
        assert_eq!(err.to_string(), "upstream write failed: connection refused");
        assert_eq!(err.upstream_status(), None);
    }

    #[test]
    fn test_configuration_error() {
        let err = Error::configuration("AIRTABLE_API_KEY is not set");
        assert_eq!(
            err.to_string(),
            "configuration error: AIRTABLE_API_KEY is not set"
        );
        assert_eq!(err.upstream_status(), None);
    }
}

//! Backup/restore gateway.
//!
//! Forwards snapshot-save, restore, and recovery requests to the external
//! automation service's webhook endpoints. Calls are fire-and-forget beyond
//! reporting accept/reject; retrying a rejected call is the user's decision.
//! Cache invalidation after an accepted restore or recovery is orchestrated
//! by the route handlers, not here.

use std::sync::Arc;

use guichet_core::{Error, Result};
use serde_json::Value;

use crate::config::AppConfig;

/// Client for the automation webhook service.
#[derive(Clone)]
pub struct AutomationClient {
    http: reqwest::Client,
    config: Arc<AppConfig>,
}

impl AutomationClient {
    pub fn new(http: reqwest::Client, config: Arc<AppConfig>) -> Self {
        Self { http, config }
    }

    /// Ask the automation service to restore the backup named by `record_id`.
    /// Returns the accepting response body.
    pub async fn trigger_restore(&self, record_id: &str) -> Result<String> {
        let url = configured_url(&self.config.restore_webhook_url, "GUICHET_RESTORE_WEBHOOK_URL")?;
        tracing::info!(record_id = %record_id, "triggering backup restore");

        let response = self
            .http
            .post(url)
            .query(&[("recordId", record_id)])
            .json(&serde_json::json!({ "recordId": record_id }))
            .send()
            .await
            .map_err(|e| Error::write(None, e.to_string()))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            tracing::warn!(record_id = %record_id, status = %status, "restore webhook rejected");
            return Err(Error::write(Some(status.as_u16()), body));
        }
        Ok(body)
    }

    /// Forward a snapshot payload to the automation service and hand its
    /// response body back verbatim.
    pub async fn save_snapshot(&self, payload: &Value) -> Result<Value> {
        let url = configured_url(
            &self.config.snapshot_webhook_url,
            "GUICHET_SNAPSHOT_WEBHOOK_URL",
        )?;
        tracing::info!("forwarding snapshot payload to automation service");

        let response = self
            .http
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| Error::write(None, e.to_string()))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            tracing::warn!(status = %status, "snapshot webhook rejected");
            return Err(Error::write(Some(status.as_u16()), body));
        }

        serde_json::from_str(&body)
            .map_err(|e| Error::write(None, format!("invalid response body: {e}")))
    }

    /// Fire both recovery hooks concurrently. The combined call succeeds only
    /// if both endpoints accept; the first rejection wins otherwise.
    pub async fn trigger_recovery(&self) -> Result<String> {
        let urls = &self.config.recovery_webhook_urls;
        if urls.len() != 2 {
            return Err(Error::configuration(
                "GUICHET_RECOVERY_WEBHOOK_URLS must name exactly two endpoints",
            ));
        }
        tracing::info!("triggering table recovery");

        let (first, second) = tokio::join!(self.fire(&urls[0]), self.fire(&urls[1]));
        let first = first?;
        let second = second?;
        Ok(format!("{first}; {second}"))
    }

    async fn fire(&self, url: &str) -> Result<String> {
        let response = self
            .http
            .post(url)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| Error::write(None, e.to_string()))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            tracing::warn!(url = %url, status = %status, "recovery webhook rejected");
            return Err(Error::write(Some(status.as_u16()), body));
        }
        Ok(body)
    }
}

impl std::fmt::Debug for AutomationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutomationClient")
            .field("restore_webhook_url", &self.config.restore_webhook_url)
            .field("snapshot_webhook_url", &self.config.snapshot_webhook_url)
            .field(
                "recovery_webhook_urls",
                &self.config.recovery_webhook_urls,
            )
            .finish()
    }
}

fn configured_url<'a>(url: &'a str, var: &str) -> Result<&'a str> {
    if url.is_empty() {
        return Err(Error::configuration(format!("{var} is not set")));
    }
    Ok(url)
}

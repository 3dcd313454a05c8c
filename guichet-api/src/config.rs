//! Server Configuration
//!
//! All configuration comes from environment variables with development
//! defaults. Missing upstream credentials are deliberately not checked at
//! startup: the affected request fails with a configuration error instead,
//! so the dashboard itself still serves and reports the problem.

use std::path::PathBuf;
use std::time::Duration;

/// Timeout applied to every upstream call (table service and webhooks).
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// Runtime configuration for the server.
///
/// # Environment variables
/// - `AIRTABLE_API_KEY`: bearer token for the table service
/// - `AIRTABLE_BASE_ID`: base identifier
/// - `AIRTABLE_TABLE_NAME`: allocation table (default: `Allocation billetterie`)
/// - `AIRTABLE_BASE_URL`: API root (default: `https://api.airtable.com/v0`)
/// - `GUICHET_BACKUP_TABLE_NAME`: backup descriptor table (default: `Backup Data`)
/// - `GUICHET_SNAPSHOT_WEBHOOK_URL`: automation hook saving a snapshot
/// - `GUICHET_RESTORE_WEBHOOK_URL`: automation hook restoring a backup
/// - `GUICHET_RECOVERY_WEBHOOK_URLS`: comma-separated pair of recovery hooks
/// - `GUICHET_DASHBOARD_PASSWORD`: shared credential gating the dashboard
/// - `GUICHET_CACHE_TTL_SECS`: snapshot freshness window (default: 300)
/// - `GUICHET_CLIENT_REFRESH_MS`: browser polling interval (default: 10000)
/// - `GUICHET_STATIC_DIR`: dashboard assets (default: `guichet-api/static`)
#[derive(Clone)]
pub struct AppConfig {
    pub airtable_api_key: String,
    pub airtable_base_id: String,
    pub airtable_base_url: String,
    pub table_name: String,
    pub backup_table_name: String,
    pub snapshot_webhook_url: String,
    pub restore_webhook_url: String,
    pub recovery_webhook_urls: Vec<String>,
    pub dashboard_password: String,
    pub cache_ttl: Duration,
    pub client_refresh_ms: u64,
    pub static_dir: PathBuf,
}

impl AppConfig {
    /// Load configuration from the environment.
    pub fn from_env() -> Self {
        Self {
            airtable_api_key: env_or("AIRTABLE_API_KEY", ""),
            airtable_base_id: env_or("AIRTABLE_BASE_ID", ""),
            airtable_base_url: env_or("AIRTABLE_BASE_URL", "https://api.airtable.com/v0"),
            table_name: env_or("AIRTABLE_TABLE_NAME", "Allocation billetterie"),
            backup_table_name: env_or("GUICHET_BACKUP_TABLE_NAME", "Backup Data"),
            snapshot_webhook_url: env_or("GUICHET_SNAPSHOT_WEBHOOK_URL", ""),
            restore_webhook_url: env_or("GUICHET_RESTORE_WEBHOOK_URL", ""),
            recovery_webhook_urls: split_urls(&env_or("GUICHET_RECOVERY_WEBHOOK_URLS", "")),
            dashboard_password: env_or("GUICHET_DASHBOARD_PASSWORD", ""),
            cache_ttl: Duration::from_secs(env_parsed("GUICHET_CACHE_TTL_SECS", 300)),
            client_refresh_ms: env_parsed("GUICHET_CLIENT_REFRESH_MS", 10_000),
            static_dir: PathBuf::from(env_or("GUICHET_STATIC_DIR", "guichet-api/static")),
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("airtable_api_key", &redact(&self.airtable_api_key))
            .field("airtable_base_id", &self.airtable_base_id)
            .field("airtable_base_url", &self.airtable_base_url)
            .field("table_name", &self.table_name)
            .field("backup_table_name", &self.backup_table_name)
            .field("snapshot_webhook_url", &self.snapshot_webhook_url)
            .field("restore_webhook_url", &self.restore_webhook_url)
            .field("recovery_webhook_urls", &self.recovery_webhook_urls)
            .field("dashboard_password", &redact(&self.dashboard_password))
            .field("cache_ttl", &self.cache_ttl)
            .field("client_refresh_ms", &self.client_refresh_ms)
            .field("static_dir", &self.static_dir)
            .finish()
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() {
        "[UNSET]"
    } else {
        "[REDACTED]"
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

fn split_urls(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_urls() {
        assert!(split_urls("").is_empty());
        assert_eq!(
            split_urls("https://a.example/hook, https://b.example/hook"),
            vec![
                "https://a.example/hook".to_string(),
                "https://b.example/hook".to_string()
            ]
        );
        assert_eq!(split_urls(",https://a.example/hook,").len(), 1);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut config = AppConfig::from_env();
        config.airtable_api_key = "patSecretToken".to_string();
        config.dashboard_password = "hunter2".to_string();

        let debug = format!("{:?}", config);
        assert!(!debug.contains("patSecretToken"));
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));
    }
}

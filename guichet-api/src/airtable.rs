//! Remote table client.
//!
//! Thin wrapper over the Airtable REST API: paginated listing restricted to
//! the catalog's field allowlist, single-field updates, and the backup
//! descriptor table. Errors keep the upstream status and body; nothing is
//! retried here, a failed call is the caller's (or the user's) to repeat.

use std::sync::Arc;

use async_trait::async_trait;
use guichet_core::{catalog, BackupEntry, Error, Record, RecordPage, Result};
use serde_json::{Map, Value};

use guichet_cache::TableFetcher;

use crate::config::AppConfig;

/// View requested on every listing; keeps upstream ordering stable.
const GRID_VIEW: &str = "Grid view";

/// Maximum number of backup descriptors returned by `list_backups`.
const MAX_BACKUPS: usize = 20;

/// Field names in the backup descriptor table.
const BACKUP_DATE_FIELD: &str = "Date";
const BACKUP_ID_FIELD: &str = "Id du backup";

/// Client for the external table service.
#[derive(Clone)]
pub struct AirtableClient {
    http: reqwest::Client,
    config: Arc<AppConfig>,
}

impl AirtableClient {
    pub fn new(http: reqwest::Client, config: Arc<AppConfig>) -> Self {
        Self { http, config }
    }

    /// Fetch every record of the allocation table, page by page, restricted
    /// to the display columns. The `offset` continuation token is handed
    /// back verbatim until the upstream stops sending one.
    pub async fn list_all(&self) -> Result<Vec<Record>> {
        let api_key = self.credentials()?;
        let url = self.table_url(&self.config.table_name);

        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(&url)
                .bearer_auth(api_key)
                .query(&[("view", GRID_VIEW)]);
            for field in catalog::target_fields() {
                request = request.query(&[("fields[]", field)]);
            }
            if let Some(token) = &offset {
                request = request.query(&[("offset", token.as_str())]);
            }

            let response = request
                .send()
                .await
                .map_err(|e| Error::fetch(None, e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(Error::fetch(Some(status.as_u16()), body));
            }

            let page: RecordPage = response
                .json()
                .await
                .map_err(|e| Error::fetch(None, format!("invalid response body: {e}")))?;

            records.extend(page.records);
            match page.offset {
                Some(token) => offset = Some(token),
                None => break,
            }
        }

        Ok(records)
    }

    /// Update a single field of a single record. Returns the upstream's
    /// updated-record body verbatim.
    pub async fn update_field(
        &self,
        record_id: &str,
        field_name: &str,
        value: &Value,
    ) -> Result<Value> {
        let api_key = self.credentials()?;
        let url = format!("{}/{}", self.table_url(&self.config.table_name), record_id);

        let mut fields = Map::new();
        fields.insert(field_name.to_string(), value.clone());
        let body = serde_json::json!({ "fields": fields });

        let response = self
            .http
            .patch(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::write(None, e.to_string()))?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(Error::write(Some(status.as_u16()), text));
        }

        serde_json::from_str(&text)
            .map_err(|e| Error::write(None, format!("invalid response body: {e}")))
    }

    /// List backup descriptors, newest first, capped at [`MAX_BACKUPS`].
    pub async fn list_backups(&self) -> Result<Vec<BackupEntry>> {
        let api_key = self.credentials()?;
        let url = self.table_url(&self.config.backup_table_name);
        let max_records = MAX_BACKUPS.to_string();

        let response = self
            .http
            .get(&url)
            .bearer_auth(api_key)
            .query(&[
                ("sort[0][field]", BACKUP_DATE_FIELD),
                ("sort[0][direction]", "desc"),
                ("maxRecords", max_records.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::fetch(None, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::fetch(Some(status.as_u16()), body));
        }

        let page: RecordPage = response
            .json()
            .await
            .map_err(|e| Error::fetch(None, format!("invalid response body: {e}")))?;

        Ok(backup_entries(page.records))
    }

    fn table_url(&self, table: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.airtable_base_url.trim_end_matches('/'),
            self.config.airtable_base_id,
            urlencoding::encode(table)
        )
    }

    fn credentials(&self) -> Result<&str> {
        if self.config.airtable_api_key.is_empty() {
            return Err(Error::configuration("AIRTABLE_API_KEY is not set"));
        }
        if self.config.airtable_base_id.is_empty() {
            return Err(Error::configuration("AIRTABLE_BASE_ID is not set"));
        }
        Ok(&self.config.airtable_api_key)
    }

}

impl std::fmt::Debug for AirtableClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AirtableClient")
            .field("base_url", &self.config.airtable_base_url)
            .field("table_name", &self.config.table_name)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
impl TableFetcher for AirtableClient {
    async fn list_all(&self) -> Result<Vec<Record>> {
        AirtableClient::list_all(self).await
    }
}

/// Map raw backup-table records into descriptors for the dashboard.
fn backup_entries(records: Vec<Record>) -> Vec<BackupEntry> {
    records
        .into_iter()
        .map(|record| BackupEntry {
            date: record
                .field(BACKUP_DATE_FIELD)
                .and_then(Value::as_str)
                .map(str::to_string),
            backup_id: record
                .field(BACKUP_ID_FIELD)
                .and_then(Value::as_str)
                .map(str::to_string),
            id: record.id,
        })
        .collect()
}

//! Guichet Core - Shared Data Types
//!
//! Pure data structures with no behavior. Both the cache layer and the HTTP
//! layer depend on this crate; it contains the wire types exchanged with the
//! external table service, the column catalog, and the error taxonomy.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod catalog;
pub mod error;

pub use catalog::{ColumnGroup, ColumnKind, ColumnSpec, COLUMNS};
pub use error::{Error, Result};

// ============================================================================
// RECORDS
// ============================================================================

/// One row of ticket-sales data as issued by the external table service.
///
/// Identity is the opaque `id` assigned upstream; it never changes once a
/// record exists. Field values are numbers, strings, or null, keyed by the
/// column names in [`catalog::COLUMNS`]. Fields the upstream omits (empty
/// cells) are simply absent from the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(rename = "createdTime", skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl Record {
    /// Look up a field value by column name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// One page of records from a paginated listing. The `offset` continuation
/// token is opaque; its absence marks the final page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordPage {
    pub records: Vec<Record>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<String>,
}

// ============================================================================
// BACKUPS
// ============================================================================

/// A snapshot descriptor read from the secondary backup table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupEntry {
    pub id: String,
    pub date: Option<String>,
    pub backup_id: Option<String>,
}

//! Column catalog for the allocation table.
//!
//! The external table's schema is fixed; this static catalog names the
//! columns the dashboard works with, in display order, each tagged with a
//! semantic kind and a display group. The catalog is the single source of
//! truth shared by server and browser: it drives the upstream field
//! allowlist, server-side editability checks, and client-side cell
//! formatting (the browser receives it through `/config.js`).

use serde::{Deserialize, Serialize};

/// Semantic kind of a column, deciding formatting and editability.
///
/// `Number` and `Quota` hold user-entered allocations; the remaining numeric
/// kinds are computed upstream by table formulas and are therefore
/// read-only everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Event date, rendered as-is and used for range filtering.
    Date,
    /// Free text (the venue city).
    Text,
    /// Plain sales figure, editable.
    Number,
    /// Allocation quota. Editable when entered per channel, read-only when
    /// the upstream computes it as a section total.
    Quota,
    /// Computed sum of sales figures.
    Total,
    /// Computed quota-minus-sales remainder.
    Delta,
    /// Computed share of overall sales, in percent.
    Percentage,
    /// Computed fill rate of the venue, rendered with a color scale.
    FillRate,
}

impl ColumnKind {
    /// Computed kinds come from upstream formulas and can never be written.
    pub fn is_computed(self) -> bool {
        matches!(
            self,
            ColumnKind::Total | ColumnKind::Delta | ColumnKind::Percentage | ColumnKind::FillRate
        )
    }
}

/// Display group a column belongs to, used for header grouping and cell
/// tinting in the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnGroup {
    Main,
    Or,
    Platinium,
    Argent,
    Total,
}

/// A single catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub group: ColumnGroup,
    pub editable: bool,
}

const fn col(
    name: &'static str,
    kind: ColumnKind,
    group: ColumnGroup,
    editable: bool,
) -> ColumnSpec {
    ColumnSpec {
        name,
        kind,
        group,
        editable,
    }
}

use ColumnGroup::{Argent, Main, Or, Platinium, Total as TotalGroup};
use ColumnKind::{Date, Delta, FillRate, Number, Percentage, Quota, Text, Total};

/// The full catalog, in display order.
pub const COLUMNS: &[ColumnSpec] = &[
    col("Date", Date, Main, false),
    col("Ville", Text, Main, false),
    // Or section
    col("Ventes - Fever - Or", Number, Or, true),
    col("Quota - Fever - Or", Quota, Or, true),
    col("Ventes - Regiondo - Or", Number, Or, true),
    col("Quota - Regiondo - Or", Quota, Or, true),
    col("Ventes - OT - Or", Number, Or, true),
    col("Quota - OT - Or", Quota, Or, true),
    col("Total - Ventes - Or", Total, Or, false),
    col("Total - Quota - Or", Quota, Or, false),
    col("Delta - Or", Delta, Or, false),
    // Platinium section
    col("Ventes - Fever - Platinium", Number, Platinium, true),
    col("Quota - Fever - Platinium", Quota, Platinium, true),
    col("Ventes - Regiondo - Platinium", Number, Platinium, true),
    col("Quota - Regiondo - Platinium", Quota, Platinium, true),
    col("Ventes - OT - Platinium", Number, Platinium, true),
    col("Quota - OT - Platinium", Quota, Platinium, true),
    col("Total - Ventes - Platinium", Total, Platinium, false),
    col("Total - Quota - Platinium", Quota, Platinium, false),
    col("Delta - Platinium", Delta, Platinium, false),
    // Argent section
    col("Ventes - Fever - Argent", Number, Argent, true),
    col("Quota - Fever - Argent", Quota, Argent, true),
    col("Ventes - Regiondo - Argent", Number, Argent, true),
    col("Quota - Regiondo - Argent", Quota, Argent, true),
    col("Ventes - OT - Argent", Number, Argent, true),
    col("Quota - OT - Argent", Quota, Argent, true),
    col("Total - Ventes - Argent", Total, Argent, false),
    col("Total - Quota - Argent", Quota, Argent, false),
    col("Delta - Argent", Delta, Argent, false),
    // Cross-section totals
    col("Total - Ventes - Fever", Total, TotalGroup, false),
    col("Total - Ventes - Fever (%)", Percentage, TotalGroup, false),
    col("Total - Ventes - Regiondo", Total, TotalGroup, false),
    col("Total - Ventes - Regiondo (%)", Percentage, TotalGroup, false),
    col("Total - Ventes - OT", Total, TotalGroup, false),
    col("Total - Ventes - OT (%)", Percentage, TotalGroup, false),
    col("Total - Ventes", Total, TotalGroup, false),
    col("Total - Quota", Quota, TotalGroup, false),
    col("Total - Delta", Delta, TotalGroup, false),
    col("Taux de remplissage", FillRate, Main, false),
];

/// Look up a catalog entry by column name.
pub fn column(name: &str) -> Option<&'static ColumnSpec> {
    COLUMNS.iter().find(|spec| spec.name == name)
}

/// Whether the named column accepts user edits.
pub fn is_editable(name: &str) -> bool {
    column(name).is_some_and(|spec| spec.editable)
}

/// The field allowlist sent upstream on every fetch, shrinking payloads to
/// the columns the dashboard actually displays.
pub fn target_fields() -> impl Iterator<Item = &'static str> {
    COLUMNS.iter().map(|spec| spec.name)
}

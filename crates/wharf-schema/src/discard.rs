//! # Discard Records
//!
//! When a value cannot be coerced to its destination column's type, the load
//! pipeline redirects it to the discards table. This module builds the
//! record for one discarded value; serialization and compressed storage
//! belong to the sink.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::coerce::render_value;
use crate::naming::{destination, to_provider_case};

/// Load file format per destination. Everything loads CSV except BigQuery,
/// which loads newline-delimited JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadFormat {
    Csv,
    Json,
}

impl LoadFormat {
    pub fn for_destination(destination_type: &str) -> Self {
        if destination_type == destination::BIGQUERY {
            LoadFormat::Json
        } else {
            LoadFormat::Csv
        }
    }

    /// chrono format string for load-time timestamp columns.
    pub fn load_time_format(self) -> &'static str {
        match self {
            LoadFormat::Csv => "%Y-%m-%d %H:%M:%S",
            LoadFormat::Json => "%Y-%m-%dT%H:%M:%S%.6fZ",
        }
    }

    /// Whether load files carry a `loaded_at` column (BigQuery downstream
    /// compatibility).
    pub fn has_loaded_at(self) -> bool {
        matches!(self, LoadFormat::Json)
    }
}

/// One row's field values, keyed by destination-cased column name.
pub type RowData = BTreeMap<String, Value>;

/// One row bound for the discards table, values already rendered in the
/// destination's casing and time format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscardRecord {
    pub table_name: String,
    pub row_id: String,
    pub column_name: String,
    pub column_value: String,
    pub received_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid_ts: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<String>,
}

/// Builds the discard record for one value that failed coercion.
///
/// Returns `None` when the row lacks an id or a received-at timestamp under
/// the destination's casing; such rows are silently skipped, not discarded.
/// `uuid_ts` is stamped for every destination; `loaded_at` only where the
/// load format expects it.
pub fn build_discard_record(
    table_name: &str,
    column_name: &str,
    column_value: &Value,
    row: &RowData,
    destination_type: &str,
    uuid_ts: DateTime<Utc>,
) -> Option<DiscardRecord> {
    let row_id = row.get(&to_provider_case(destination_type, "id"))?;
    let received_at = row.get(&to_provider_case(destination_type, "received_at"))?;

    let format = LoadFormat::for_destination(destination_type);
    let stamp = uuid_ts.format(format.load_time_format()).to_string();

    Some(DiscardRecord {
        table_name: table_name.to_string(),
        row_id: render_value(row_id),
        column_name: column_name.to_string(),
        column_value: render_value(column_value),
        received_at: render_value(received_at),
        uuid_ts: Some(stamp.clone()),
        loaded_at: format.has_loaded_at().then_some(stamp),
    })
}

//! # Schema Model
//!
//! Domain types for warehouse schemas: column types, per-table column maps,
//! full namespace schemas, and the identity tuple that scopes a sync target.
//! These mirror the serialized wire form stored in the schema cache.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SchemaError;

/// Column type as understood by the schema engines.
///
/// The wire/storage form is the lowercase token (`"string"`, `"bigint"`, ...).
/// Destination connectors may map these onto wider native types; the engines
/// only special-case `string`/`text`/`int`/`bigint`/`float`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    String,
    Text,
    Int,
    BigInt,
    Float,
    Boolean,
    Datetime,
}

impl ColumnType {
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Text => "text",
            ColumnType::Int => "int",
            ColumnType::BigInt => "bigint",
            ColumnType::Float => "float",
            ColumnType::Boolean => "boolean",
            ColumnType::Datetime => "datetime",
        }
    }

    /// Whether this type stores character data.
    pub fn is_textual(self) -> bool {
        matches!(self, ColumnType::String | ColumnType::Text)
    }

    /// Whether this type stores whole numbers.
    pub fn is_integral(self) -> bool {
        matches!(self, ColumnType::Int | ColumnType::BigInt)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(ColumnType::String),
            "text" => Ok(ColumnType::Text),
            "int" => Ok(ColumnType::Int),
            "bigint" => Ok(ColumnType::BigInt),
            "float" => Ok(ColumnType::Float),
            "boolean" => Ok(ColumnType::Boolean),
            "datetime" => Ok(ColumnType::Datetime),
            other => Err(SchemaError::UnknownColumnType {
                token: other.to_string(),
            }),
        }
    }
}

impl Serialize for ColumnType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ColumnType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        token.parse().map_err(serde::de::Error::custom)
    }
}

/// Column name to column type, for a single table. Insertion order is
/// irrelevant; the map keeps names unique.
pub type TableSchema = BTreeMap<String, ColumnType>;

/// A full warehouse namespace's structure at some point in time.
///
/// Serializes as a JSON object of objects (`{"table": {"column": "type"}}`),
/// the same shape the cache store persists. Equality is by value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema(pub BTreeMap<String, TableSchema>);

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn tables(&self) -> impl Iterator<Item = (&String, &TableSchema)> {
        self.0.iter()
    }

    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.0.get(name)
    }

    pub fn column_type(&self, table: &str, column: &str) -> Option<ColumnType> {
        self.0.get(table).and_then(|columns| columns.get(column)).copied()
    }

    /// Materializes a table entry, empty if it did not exist yet. Merged
    /// schemas never omit a table that was observed, even with no columns.
    pub fn ensure_table(&mut self, name: &str) -> &mut TableSchema {
        self.0.entry(name.to_string()).or_default()
    }

    pub fn set_column(&mut self, table: &str, column: &str, column_type: ColumnType) {
        self.ensure_table(table).insert(column.to_string(), column_type);
    }

    pub fn insert_table(&mut self, name: impl Into<String>, columns: TableSchema) {
        self.0.insert(name.into(), columns);
    }

    /// XXH3-64 over the canonical serialized form. Cheap drift check between
    /// the cached schema and a freshly introspected one.
    pub fn content_hash(&self) -> u64 {
        let canonical = serde_json::to_vec(self).unwrap_or_default();
        xxhash_rust::xxh3::xxh3_64(&canonical)
    }
}

impl FromIterator<(String, TableSchema)> for Schema {
    fn from_iter<I: IntoIterator<Item = (String, TableSchema)>>(iter: I) -> Self {
        Schema(iter.into_iter().collect())
    }
}

/// Identifies one sync target. All schema records are scoped by this tuple
/// (reads use destination + namespace only; writes use the full tuple).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WarehouseIdentity {
    pub source_id: String,
    pub destination_id: String,
    pub destination_type: String,
    pub namespace: String,
}

impl WarehouseIdentity {
    pub fn new(
        source_id: impl Into<String>,
        destination_id: impl Into<String>,
        destination_type: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            destination_id: destination_id.into(),
            destination_type: destination_type.into(),
            namespace: namespace.into(),
        }
    }
}

impl fmt::Display for WarehouseIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}/{}@{}",
            self.source_id, self.destination_id, self.destination_type, self.namespace
        )
    }
}

/// One ingested batch's inferred column types, persisted by the upstream
/// ingestion stage. The engines read only the id and the schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingFileDescriptor {
    pub id: i64,
    pub schema: Schema,
}

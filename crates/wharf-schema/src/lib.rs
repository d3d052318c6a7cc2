//! # wharf-schema
//!
//! Pure schema algebra for warehouse sync: column-type modeling, merging of
//! staging-file schemas under a cached precedence oracle, additive schema
//! diffing, synthetic bookkeeping tables, and row-level type coercion with
//! discard-record construction.
//!
//! Nothing in this crate performs I/O. Persistence, destination
//! introspection, and discard serialization live with the callers (see the
//! `wharf-store` crate).

pub mod coerce;
pub mod config;
pub mod diff;
pub mod discard;
pub mod error;
pub mod merge;
pub mod naming;
pub mod synthetic;
pub mod types;

pub use coerce::{coerce_value, infer_column_type, render_value};
pub use config::IdentityConfig;
pub use diff::{schema_diff, SchemaDiff};
pub use discard::{build_discard_record, DiscardRecord, LoadFormat, RowData};
pub use error::SchemaError;
pub use merge::{consolidate, merge_schemas, STAGING_SCHEMA_PAGE_SIZE};
pub use synthetic::{inject_discards_table, inject_identity_tables, inject_synthetic_tables};
pub use types::{ColumnType, Schema, StagingFileDescriptor, TableSchema, WarehouseIdentity};

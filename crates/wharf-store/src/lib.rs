//! # wharf-store
//!
//! Persistence and orchestration for warehouse schema sync: the SQLite
//! schema cache store, the staging-file descriptor store, the discards sink
//! writer, and the `SchemaHandle` that drives one reconciliation cycle for
//! one warehouse identity.

use thiserror::Error;

pub mod discards;
pub mod handle;
pub mod schema;
pub mod schema_cache;
pub mod staging;

pub use discards::DiscardsWriter;
pub use handle::{SchemaHandle, WarehouseIntrospector};
pub use schema_cache::SchemaCacheStore;
pub use staging::StagingFileStore;

pub type Result<T> = std::result::Result<T, Error>;

/// Store-layer errors. Every variant except `Introspection` is a
/// persistence/deserialization failure and is fatal to the current
/// reconciliation cycle; none of them may leave a partial schema upsert
/// behind.
#[derive(Error, Debug)]
pub enum Error {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("malformed schema payload: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("warehouse introspection failed: {0}")]
    Introspection(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store layout version mismatch: database has {found}, this build requires {expected}")]
    LayoutVersion { found: String, expected: i32 },
}

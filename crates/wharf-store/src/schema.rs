//! # Store SQLite Layout
//!
//! Defines the cached-schema and staging-file tables shared by the stores in
//! this crate.

use rusqlite::{Connection, OptionalExtension};

use crate::{Error, Result};

const STORE_LAYOUT_VERSION: i32 = 1;

const CREATE_WH_SCHEMAS: &str = r#"
CREATE TABLE IF NOT EXISTS wh_schemas (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    source_id        TEXT NOT NULL,
    namespace        TEXT NOT NULL,
    destination_id   TEXT NOT NULL,
    destination_type TEXT NOT NULL,
    schema           TEXT NOT NULL,
    created_at       TEXT NOT NULL,
    UNIQUE (source_id, destination_id, namespace)
)
"#;

const CREATE_WH_STAGING_FILES: &str = r#"
CREATE TABLE IF NOT EXISTS wh_staging_files (
    id     INTEGER PRIMARY KEY AUTOINCREMENT,
    schema TEXT NOT NULL
)
"#;

const CREATE_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS wh_schemas_dest_namespace
ON wh_schemas(destination_id, namespace, id);
"#;

const CREATE_METADATA: &str = r#"
CREATE TABLE IF NOT EXISTS wh_metadata (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
"#;

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA journal_mode = WAL")?;
    conn.execute_batch("PRAGMA synchronous = NORMAL")?;
    conn.execute_batch("PRAGMA foreign_keys = ON")?;
    conn.execute_batch(CREATE_WH_SCHEMAS)?;
    conn.execute_batch(CREATE_WH_STAGING_FILES)?;
    conn.execute_batch(CREATE_INDEXES)?;
    conn.execute_batch(CREATE_METADATA)?;

    ensure_layout_version(conn)
}

fn ensure_layout_version(conn: &Connection) -> Result<()> {
    let version: Option<String> = conn
        .query_row(
            "SELECT value FROM wh_metadata WHERE key = 'layout_version'",
            [],
            |row| row.get(0),
        )
        .optional()?;

    match version {
        Some(value) => {
            let parsed: i32 = value.parse().map_err(|_| Error::LayoutVersion {
                found: value.clone(),
                expected: STORE_LAYOUT_VERSION,
            })?;
            if parsed != STORE_LAYOUT_VERSION {
                return Err(Error::LayoutVersion {
                    found: value,
                    expected: STORE_LAYOUT_VERSION,
                });
            }
        }
        None => {
            conn.execute(
                "INSERT INTO wh_metadata (key, value) VALUES ('layout_version', ?)",
                [STORE_LAYOUT_VERSION.to_string()],
            )?;
        }
    }

    Ok(())
}

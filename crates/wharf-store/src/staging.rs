//! # Staging File Store
//!
//! Read side of the staging-file descriptor table: per-batch inferred
//! schemas persisted by the upstream ingestion stage, fetched in id pages
//! during consolidation.

use std::path::Path;

use rusqlite::{params_from_iter, Connection};

use wharf_schema::{Schema, StagingFileDescriptor};

use crate::schema::init_schema;
use crate::Result;

/// SQLite-backed access to staging-file descriptors.
#[derive(Debug)]
pub struct StagingFileStore {
    conn: Connection,
}

impl StagingFileStore {
    /// Opens (or creates) the store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// In-memory store, for tests and ephemeral runs.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Persists one staging file's inferred schema, returning its id.
    /// Normally the ingestion stage writes these; exposed for tests and
    /// embedded setups.
    pub fn insert(&self, schema: &Schema) -> Result<i64> {
        let payload = serde_json::to_string(schema)?;
        self.conn.execute(
            "INSERT INTO wh_staging_files (schema) VALUES (?1)",
            [payload],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Fetches the descriptors for one id page, in id order.
    ///
    /// A malformed stored payload fails the whole read; the consolidation
    /// that drives this must not proceed on partial data.
    pub fn descriptors(&self, ids: &[i64]) -> Result<Vec<StagingFileDescriptor>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT id, schema FROM wh_staging_files WHERE id IN ({placeholders}) ORDER BY id"
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(ids.iter()))?;

        let mut descriptors = Vec::new();
        while let Some(row) = rows.next()? {
            let id: i64 = row.get(0)?;
            let payload: String = row.get(1)?;
            descriptors.push(StagingFileDescriptor {
                id,
                schema: serde_json::from_str(&payload)?,
            });
        }

        Ok(descriptors)
    }

    /// Fetches just the schemas for one id page, in id order.
    pub fn schemas(&self, ids: &[i64]) -> Result<Vec<Schema>> {
        Ok(self
            .descriptors(ids)?
            .into_iter()
            .map(|descriptor| descriptor.schema)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wharf_schema::ColumnType;

    fn schema_with(table: &str, column: &str, ty: ColumnType) -> Schema {
        let mut schema = Schema::new();
        schema.set_column(table, column, ty);
        schema
    }

    #[test]
    fn schemas_come_back_in_id_order() {
        let store = StagingFileStore::open_in_memory().unwrap();
        let first = schema_with("tracks", "event", ColumnType::String);
        let second = schema_with("pages", "url", ColumnType::String);

        let id1 = store.insert(&first).unwrap();
        let id2 = store.insert(&second).unwrap();

        let schemas = store.schemas(&[id2, id1]).unwrap();
        assert_eq!(schemas, vec![first, second]);

        let descriptors = store.descriptors(&[id1, id2]).unwrap();
        assert_eq!(descriptors[0].id, id1);
        assert_eq!(descriptors[1].id, id2);
    }

    #[test]
    fn empty_page_reads_nothing() {
        let store = StagingFileStore::open_in_memory().unwrap();
        assert!(store.schemas(&[]).unwrap().is_empty());
    }

    #[test]
    fn unknown_ids_are_simply_absent() {
        let store = StagingFileStore::open_in_memory().unwrap();
        let id = store
            .insert(&schema_with("tracks", "event", ColumnType::String))
            .unwrap();

        let schemas = store.schemas(&[id, id + 100]).unwrap();
        assert_eq!(schemas.len(), 1);
    }

    #[test]
    fn malformed_payload_fails_the_whole_read() {
        let store = StagingFileStore::open_in_memory().unwrap();
        let id = store
            .insert(&schema_with("tracks", "event", ColumnType::String))
            .unwrap();
        store
            .conn
            .execute("INSERT INTO wh_staging_files (schema) VALUES ('{broken')", [])
            .unwrap();

        let err = store.schemas(&[id, id + 1]).unwrap_err();
        assert!(matches!(err, crate::Error::Deserialization(_)));
    }
}

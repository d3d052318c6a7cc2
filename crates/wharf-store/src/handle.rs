//! # Schema Handle
//!
//! Drives one reconciliation cycle for one warehouse identity: cached schema
//! in, staging schemas folded, synthetic tables appended, remote schema
//! synced, additive diff out. Synchronous and single-threaded per
//! invocation; concurrent cycles each own their handle and share nothing but
//! the cache store's backing database.

use tracing::{error, info};

use wharf_schema::{
    consolidate, inject_synthetic_tables, schema_diff, IdentityConfig, Schema, SchemaDiff,
    WarehouseIdentity,
};

use crate::schema_cache::SchemaCacheStore;
use crate::staging::StagingFileStore;
use crate::Result;

/// Live-schema introspection, owned by a destination connector. Errors are
/// surfaced, not retried, by the handle.
pub trait WarehouseIntrospector {
    fn fetch_schema(&mut self, warehouse: &WarehouseIdentity) -> Result<Schema>;
}

/// State for one reconciliation cycle.
pub struct SchemaHandle<'a> {
    warehouse: WarehouseIdentity,
    staging_file_ids: Vec<i64>,
    cache: &'a SchemaCacheStore,
    staging: &'a StagingFileStore,
    identity: IdentityConfig,

    /// Last-known-good schema from the cache store; after
    /// [`sync_remote_schema`](Self::sync_remote_schema) this is the diff
    /// baseline ("current schema").
    pub local_schema: Schema,

    /// Live schema as introspected from the destination.
    pub warehouse_schema: Schema,

    /// Consolidated staging schema plus synthetic tables.
    pub upload_schema: Schema,
}

impl<'a> SchemaHandle<'a> {
    pub fn new(
        warehouse: WarehouseIdentity,
        staging_file_ids: Vec<i64>,
        cache: &'a SchemaCacheStore,
        staging: &'a StagingFileStore,
        identity: IdentityConfig,
    ) -> Self {
        Self {
            warehouse,
            staging_file_ids,
            cache,
            staging,
            identity,
            local_schema: Schema::new(),
            warehouse_schema: Schema::new(),
            upload_schema: Schema::new(),
        }
    }

    pub fn warehouse(&self) -> &WarehouseIdentity {
        &self.warehouse
    }

    /// Loads the cached schema for this target; empty when nothing is cached.
    pub fn load_local_schema(&mut self) -> Result<&Schema> {
        self.local_schema = self
            .cache
            .local_schema(&self.warehouse.destination_id, &self.warehouse.namespace)?;
        Ok(&self.local_schema)
    }

    /// Fetches the destination's live schema and, when it differs from the
    /// cached one, adopts it as the current schema and persists it. Returns
    /// whether the cache was updated.
    pub fn sync_remote_schema(
        &mut self,
        introspector: &mut dyn WarehouseIntrospector,
    ) -> Result<bool> {
        let remote = match introspector.fetch_schema(&self.warehouse) {
            Ok(schema) => schema,
            Err(err) => {
                error!(warehouse = %self.warehouse, %err, "failed fetching schema from warehouse");
                return Err(err);
            }
        };

        let changed = remote != self.local_schema;
        if changed {
            info!(
                warehouse = %self.warehouse,
                local_hash = self.local_schema.content_hash(),
                remote_hash = remote.content_hash(),
                "remote schema differs from cache, adopting"
            );
            self.cache.upsert(&self.warehouse, &remote)?;
            self.local_schema = remote.clone();
        }
        self.warehouse_schema = remote;
        Ok(changed)
    }

    /// Folds all pending staging-file schemas (local schema as the
    /// precedence oracle) and appends the synthetic bookkeeping tables,
    /// producing the upload schema.
    pub fn consolidate_upload_schema(&mut self) -> Result<&Schema> {
        let staging = self.staging;
        let mut consolidated = consolidate(&self.local_schema, &self.staging_file_ids, |page| {
            staging.schemas(page)
        })?;
        inject_synthetic_tables(
            &mut consolidated,
            &self.warehouse.destination_type,
            &self.identity,
        );
        self.upload_schema = consolidated;
        Ok(&self.upload_schema)
    }

    /// Additive diff of the current schema against the upload schema.
    pub fn diff(&self) -> SchemaDiff {
        schema_diff(&self.local_schema, &self.upload_schema)
    }

    /// Persists a schema (normally the diff's `merged_schema`, once the DDL
    /// has been applied) as the new last-known-good state.
    pub fn update_local_schema(&mut self, schema: &Schema) -> Result<()> {
        self.cache.upsert(&self.warehouse, schema)?;
        self.local_schema = schema.clone();
        Ok(())
    }

    /// Full cycle: cache read, remote sync, consolidation, diff. DDL
    /// application and the closing [`update_local_schema`](Self::update_local_schema)
    /// belong to the caller.
    pub fn reconcile(&mut self, introspector: &mut dyn WarehouseIntrospector) -> Result<SchemaDiff> {
        self.load_local_schema()?;
        self.sync_remote_schema(introspector)?;
        self.consolidate_upload_schema()?;
        Ok(self.diff())
    }
}

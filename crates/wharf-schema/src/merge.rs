//! # Schema Merge Engine
//!
//! Folds the per-staging-file schemas of one sync cycle into a single
//! consolidated schema, using the locally cached schema as a type-precedence
//! oracle. Staging files are processed in fixed-size id pages to bound any
//! single retrieval; the merge state is threaded as an accumulator across
//! pages, so the result is identical regardless of page size.

use tracing::warn;

use crate::types::{ColumnType, Schema};

/// Staging-file descriptors fetched per page during consolidation.
pub const STAGING_SCHEMA_PAGE_SIZE: usize = 100;

/// Merges one batch of staging-file schemas into the accumulator.
///
/// Precedence, per (table, column, type) triple in staging-file order:
///
/// 1. A type already recorded in `authoritative` wins, except that
///    authoritative `string` is widened to `text` when a staging file offers
///    `text`. Widening is one-way: once a column has widened, later files
///    offering other types do not undo it.
/// 2. For columns unknown to `authoritative`, the first observed type wins.
///    Later files offering a different type for the same new column are
///    ignored; the conflict is logged, not reconciled.
///
/// Tables observed in a staging schema are materialized in the accumulator
/// even when their column map is empty.
pub fn merge_schemas(authoritative: &Schema, incoming: &[Schema], mut acc: Schema) -> Schema {
    for schema in incoming {
        for (table, columns) in schema.tables() {
            acc.ensure_table(table);
            for (column, &incoming_type) in columns {
                if let Some(known) = authoritative.column_type(table, column) {
                    if known == ColumnType::String && incoming_type == ColumnType::Text {
                        acc.set_column(table, column, ColumnType::Text);
                        continue;
                    }
                    if known == ColumnType::String
                        && acc.column_type(table, column) == Some(ColumnType::Text)
                    {
                        // already widened this cycle
                        continue;
                    }
                    acc.set_column(table, column, known);
                    continue;
                }

                match acc.column_type(table, column) {
                    None => acc.set_column(table, column, incoming_type),
                    Some(adopted) if adopted != incoming_type => {
                        warn!(
                            %table,
                            %column,
                            adopted = %adopted,
                            ignored = %incoming_type,
                            "conflicting type for new column, keeping first observed"
                        );
                    }
                    Some(_) => {}
                }
            }
        }
    }
    acc
}

/// Consolidates every staging-file schema for a cycle, pulling schemas from
/// `fetch` one id page at a time.
///
/// Any fetch or deserialization error is fatal for the whole consolidation:
/// the error propagates and no partial result is produced.
pub fn consolidate<E>(
    authoritative: &Schema,
    staging_file_ids: &[i64],
    mut fetch: impl FnMut(&[i64]) -> Result<Vec<Schema>, E>,
) -> Result<Schema, E> {
    let mut consolidated = Schema::new();
    for page in staging_file_ids.chunks(STAGING_SCHEMA_PAGE_SIZE) {
        let schemas = fetch(page)?;
        consolidated = merge_schemas(authoritative, &schemas, consolidated);
    }
    Ok(consolidated)
}

//! # Schema Diff Engine
//!
//! Compares the current (destination-side) schema against the upload schema
//! and emits the additive change set the DDL-executing connector consumes:
//! tables to create, columns to add, and string columns to widen to text.
//!
//! The diff is additive only. Type mismatches other than the single
//! `string -> text` widening path are not represented and not an error here;
//! such values are handled per row by the coercion engine at load time.

use std::collections::BTreeMap;

use crate::types::{ColumnType, Schema, TableSchema};

/// Additive change set between a baseline schema and an upload schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaDiff {
    /// Tables present in the upload schema but absent from the baseline.
    pub tables_to_create: Vec<String>,

    /// New columns per table, including the full column map of each table in
    /// `tables_to_create`. Tables with no new columns have no entry.
    pub columns_to_add: BTreeMap<String, TableSchema>,

    /// Columns needing a `string -> text` alteration, in encounter order.
    pub string_columns_to_widen: BTreeMap<String, Vec<String>>,

    /// The baseline with the diff applied: a strict superset of the baseline,
    /// unchanged except for widened string columns, which become text.
    pub merged_schema: Schema,

    /// Whether the diff contains any change at all.
    pub has_changes: bool,
}

/// Computes the additive diff between `current` and `upload`.
///
/// Pure: neither input is mutated; `current` is deep-copied into the
/// resulting `merged_schema` before changes are layered on top.
pub fn schema_diff(current: &Schema, upload: &Schema) -> SchemaDiff {
    let mut diff = SchemaDiff {
        merged_schema: current.clone(),
        ..SchemaDiff::default()
    };

    for (table, upload_columns) in upload.tables() {
        let Some(current_columns) = current.table(table) else {
            diff.tables_to_create.push(table.clone());
            diff.columns_to_add.insert(table.clone(), upload_columns.clone());
            diff.merged_schema.insert_table(table.clone(), upload_columns.clone());
            diff.has_changes = true;
            continue;
        };

        for (column, &upload_type) in upload_columns {
            match current_columns.get(column) {
                None => {
                    diff.columns_to_add
                        .entry(table.clone())
                        .or_default()
                        .insert(column.clone(), upload_type);
                    diff.merged_schema.set_column(table, column, upload_type);
                    diff.has_changes = true;
                }
                Some(ColumnType::String) if upload_type == ColumnType::Text => {
                    diff.string_columns_to_widen
                        .entry(table.clone())
                        .or_default()
                        .push(column.clone());
                    diff.merged_schema.set_column(table, column, ColumnType::Text);
                    diff.has_changes = true;
                }
                Some(_) => {}
            }
        }
    }

    diff
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema_of(table: &str, pairs: &[(&str, ColumnType)]) -> Schema {
        let columns: TableSchema = pairs
            .iter()
            .map(|(name, ty)| (name.to_string(), *ty))
            .collect();
        let mut schema = Schema::new();
        schema.insert_table(table, columns);
        schema
    }

    #[test]
    fn detects_new_table() {
        let upload = schema_of("tracks", &[("event", ColumnType::String)]);
        let diff = schema_diff(&Schema::new(), &upload);

        assert!(diff.has_changes);
        assert_eq!(diff.tables_to_create, vec!["tracks".to_string()]);
        assert_eq!(
            diff.columns_to_add["tracks"].get("event"),
            Some(&ColumnType::String)
        );
        assert_eq!(diff.merged_schema, upload);
    }

    #[test]
    fn detects_new_column_in_existing_table() {
        let current = schema_of("tracks", &[("event", ColumnType::String)]);
        let upload = schema_of(
            "tracks",
            &[("event", ColumnType::String), ("ts", ColumnType::Datetime)],
        );

        let diff = schema_diff(&current, &upload);
        assert!(diff.has_changes);
        assert!(diff.tables_to_create.is_empty());
        assert_eq!(diff.columns_to_add["tracks"].len(), 1);
        assert_eq!(
            diff.columns_to_add["tracks"].get("ts"),
            Some(&ColumnType::Datetime)
        );
        assert_eq!(
            diff.merged_schema.column_type("tracks", "ts"),
            Some(ColumnType::Datetime)
        );
    }

    #[test]
    fn detects_widening_only() {
        let current = schema_of("tracks", &[("event", ColumnType::String)]);
        let upload = schema_of("tracks", &[("event", ColumnType::Text)]);

        let diff = schema_diff(&current, &upload);
        assert!(diff.has_changes);
        assert_eq!(
            diff.string_columns_to_widen["tracks"],
            vec!["event".to_string()]
        );
        assert!(diff.columns_to_add.is_empty());
        assert_eq!(
            diff.merged_schema.column_type("tracks", "event"),
            Some(ColumnType::Text)
        );
    }

    #[test]
    fn other_type_mismatches_are_not_represented() {
        let current = schema_of("tracks", &[("count", ColumnType::String)]);
        let upload = schema_of("tracks", &[("count", ColumnType::Int)]);

        let diff = schema_diff(&current, &upload);
        assert!(!diff.has_changes);
        assert!(diff.columns_to_add.is_empty());
        assert!(diff.string_columns_to_widen.is_empty());
        assert_eq!(
            diff.merged_schema.column_type("tracks", "count"),
            Some(ColumnType::String)
        );
    }

    #[test]
    fn diff_is_additive_only() {
        let mut current = Schema::new();
        current.set_column("tracks", "event", ColumnType::String);
        current.set_column("tracks", "count", ColumnType::Int);
        current.set_column("users", "id", ColumnType::String);

        let mut upload = Schema::new();
        upload.set_column("tracks", "event", ColumnType::Text);
        upload.set_column("pages", "url", ColumnType::String);

        let diff = schema_diff(&current, &upload);

        // everything in current survives, untouched except the widened column
        for (table, columns) in current.tables() {
            for (column, &ty) in columns {
                let merged = diff.merged_schema.column_type(table, column).unwrap();
                if table == "tracks" && column == "event" {
                    assert_eq!(merged, ColumnType::Text);
                } else {
                    assert_eq!(merged, ty);
                }
            }
        }
        assert_eq!(diff.tables_to_create, vec!["pages".to_string()]);
    }

    #[test]
    fn identical_schemas_produce_no_changes() {
        let schema = schema_of("tracks", &[("event", ColumnType::String)]);
        let diff = schema_diff(&schema, &schema);

        assert!(!diff.has_changes);
        assert_eq!(diff.merged_schema, schema);
    }

    #[test]
    fn inputs_are_not_mutated() {
        let current = schema_of("tracks", &[("event", ColumnType::String)]);
        let upload = schema_of("tracks", &[("event", ColumnType::Text)]);
        let current_before = current.clone();
        let upload_before = upload.clone();

        let _ = schema_diff(&current, &upload);

        assert_eq!(current, current_before);
        assert_eq!(upload, upload_before);
    }
}

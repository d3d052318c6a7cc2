//! # Synthetic Table Injector
//!
//! Extends a consolidated upload schema with the bookkeeping tables the load
//! pipeline expects: the discards table always, and the identity-resolution
//! tables when the feature is enabled for the destination. All names are
//! rendered in the destination's naming-case convention.

use crate::config::IdentityConfig;
use crate::naming::{
    destination, to_provider_case, DISCARDS_TABLE, IDENTITY_MAPPINGS_TABLE,
    IDENTITY_MERGE_RULES_TABLE,
};
use crate::types::{ColumnType, Schema, TableSchema};

/// Adds the discards table to the consolidated schema. Unconditional.
///
/// BigQuery loads additionally carry a `loaded_at` column for downstream
/// compatibility.
pub fn inject_discards_table(schema: &mut Schema, destination_type: &str) {
    let mut columns = TableSchema::new();
    for (name, ty) in [
        ("table_name", ColumnType::String),
        ("row_id", ColumnType::String),
        ("column_name", ColumnType::String),
        ("column_value", ColumnType::String),
        ("received_at", ColumnType::Datetime),
        ("uuid_ts", ColumnType::Datetime),
    ] {
        columns.insert(to_provider_case(destination_type, name), ty);
    }
    if destination_type == destination::BIGQUERY {
        columns.insert(
            to_provider_case(destination_type, "loaded_at"),
            ColumnType::Datetime,
        );
    }

    schema.insert_table(to_provider_case(destination_type, DISCARDS_TABLE), columns);
}

/// Adds the identity-resolution tables when the feature applies.
///
/// Requires identity resolution to be enabled, the destination type to be in
/// the allowlist, and the merge-rules table to already exist in the schema:
/// identity resolution cannot retrofit a table that was never created
/// upstream. The merge-rules table is topped up to its four standard columns
/// (existing columns are left untouched), and the identity-mappings table is
/// inserted with its fixed four columns.
pub fn inject_identity_tables(
    schema: &mut Schema,
    destination_type: &str,
    identity: &IdentityConfig,
) {
    if !identity.resolution_enabled() || !identity.enabled_for(destination_type) {
        return;
    }

    let merge_rules_table = to_provider_case(destination_type, IDENTITY_MERGE_RULES_TABLE);
    let Some(merge_rules) = schema.0.get_mut(&merge_rules_table) else {
        return;
    };

    for name in [
        "merge_property_1_type",
        "merge_property_1_value",
        "merge_property_2_type",
        "merge_property_2_value",
    ] {
        merge_rules
            .entry(to_provider_case(destination_type, name))
            .or_insert(ColumnType::String);
    }

    let mut mappings = TableSchema::new();
    for (name, ty) in [
        ("merge_property_type", ColumnType::String),
        ("merge_property_value", ColumnType::String),
        ("rudder_id", ColumnType::String),
        ("updated_at", ColumnType::Datetime),
    ] {
        mappings.insert(to_provider_case(destination_type, name), ty);
    }
    schema.insert_table(
        to_provider_case(destination_type, IDENTITY_MAPPINGS_TABLE),
        mappings,
    );
}

/// Applies every synthetic table for one destination in order.
pub fn inject_synthetic_tables(
    schema: &mut Schema,
    destination_type: &str,
    identity: &IdentityConfig,
) {
    inject_discards_table(schema, destination_type);
    inject_identity_tables(schema, destination_type, identity);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity_enabled() -> IdentityConfig {
        IdentityConfig {
            resolution_enabled: true,
            ..IdentityConfig::default()
        }
    }

    #[test]
    fn discards_table_is_always_added() {
        let mut schema = Schema::new();
        inject_discards_table(&mut schema, destination::POSTGRES);

        let discards = schema.table(DISCARDS_TABLE).unwrap();
        assert_eq!(discards.len(), 6);
        assert_eq!(discards.get("table_name"), Some(&ColumnType::String));
        assert_eq!(discards.get("received_at"), Some(&ColumnType::Datetime));
        assert_eq!(discards.get("uuid_ts"), Some(&ColumnType::Datetime));
        assert!(!discards.contains_key("loaded_at"));
    }

    #[test]
    fn bigquery_discards_table_carries_loaded_at() {
        let mut schema = Schema::new();
        inject_discards_table(&mut schema, destination::BIGQUERY);

        let discards = schema.table(DISCARDS_TABLE).unwrap();
        assert_eq!(discards.get("loaded_at"), Some(&ColumnType::Datetime));
        assert_eq!(discards.len(), 7);
    }

    #[test]
    fn snowflake_discards_table_is_provider_cased() {
        let mut schema = Schema::new();
        inject_discards_table(&mut schema, destination::SNOWFLAKE);

        let discards = schema.table("RUDDER_DISCARDS").unwrap();
        assert_eq!(discards.get("TABLE_NAME"), Some(&ColumnType::String));
        assert_eq!(discards.get("UUID_TS"), Some(&ColumnType::Datetime));
    }

    #[test]
    fn identity_tables_require_existing_merge_rules_table() {
        let mut schema = Schema::new();
        inject_identity_tables(&mut schema, destination::BIGQUERY, &identity_enabled());

        assert!(schema.table(IDENTITY_MAPPINGS_TABLE).is_none());
        assert!(schema.table(IDENTITY_MERGE_RULES_TABLE).is_none());
    }

    #[test]
    fn merge_rules_table_is_topped_up_without_touching_existing_columns() {
        let mut schema = Schema::new();
        schema.set_column(
            IDENTITY_MERGE_RULES_TABLE,
            "merge_property_1_type",
            ColumnType::Text,
        );
        schema.set_column(
            IDENTITY_MERGE_RULES_TABLE,
            "merge_property_1_value",
            ColumnType::String,
        );

        inject_identity_tables(&mut schema, destination::BIGQUERY, &identity_enabled());

        let merge_rules = schema.table(IDENTITY_MERGE_RULES_TABLE).unwrap();
        assert_eq!(merge_rules.len(), 4);
        // the pre-existing type survives even though the default would be string
        assert_eq!(
            merge_rules.get("merge_property_1_type"),
            Some(&ColumnType::Text)
        );
        assert_eq!(
            merge_rules.get("merge_property_2_type"),
            Some(&ColumnType::String)
        );
        assert_eq!(
            merge_rules.get("merge_property_2_value"),
            Some(&ColumnType::String)
        );

        let mappings = schema.table(IDENTITY_MAPPINGS_TABLE).unwrap();
        assert_eq!(mappings.len(), 4);
        assert_eq!(mappings.get("rudder_id"), Some(&ColumnType::String));
        assert_eq!(mappings.get("updated_at"), Some(&ColumnType::Datetime));
    }

    #[test]
    fn identity_tables_are_skipped_when_disabled_or_not_allowlisted() {
        let mut with_rules = Schema::new();
        with_rules.set_column(
            IDENTITY_MERGE_RULES_TABLE,
            "merge_property_1_type",
            ColumnType::String,
        );

        // disabled globally
        let mut schema = with_rules.clone();
        inject_identity_tables(&mut schema, destination::BIGQUERY, &IdentityConfig::default());
        assert!(schema.table(IDENTITY_MAPPINGS_TABLE).is_none());

        // enabled globally, destination not allowlisted
        let mut schema = with_rules.clone();
        inject_identity_tables(&mut schema, destination::POSTGRES, &identity_enabled());
        assert!(schema.table(IDENTITY_MAPPINGS_TABLE).is_none());
    }
}

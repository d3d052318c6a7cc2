//! # Provider Naming
//!
//! Destination-specific identifier casing and the well-known names of the
//! synthetic bookkeeping tables. Destinations address columns in their own
//! case convention (Snowflake upper-cases unquoted identifiers), so every
//! synthetic table/column name is rendered through [`to_provider_case`]
//! before it enters a schema.

/// Destination type tokens used across the engines.
pub mod destination {
    pub const BIGQUERY: &str = "BQ";
    pub const SNOWFLAKE: &str = "SNOWFLAKE";
    pub const REDSHIFT: &str = "RS";
    pub const POSTGRES: &str = "POSTGRES";
    pub const CLICKHOUSE: &str = "CLICKHOUSE";
}

/// Table capturing values that could not be coerced to their destination
/// column's type.
pub const DISCARDS_TABLE: &str = "rudder_discards";

/// Identity-resolution rule table produced upstream; the injector only ever
/// extends it, never creates it.
pub const IDENTITY_MERGE_RULES_TABLE: &str = "rudder_identity_merge_rules";

/// Identity-resolution mapping table added by the injector.
pub const IDENTITY_MAPPINGS_TABLE: &str = "rudder_identity_mappings";

/// Renders an identifier in the destination's naming-case convention.
pub fn to_provider_case(destination_type: &str, name: &str) -> String {
    if destination_type == destination::SNOWFLAKE {
        name.to_uppercase()
    } else {
        name.to_string()
    }
}

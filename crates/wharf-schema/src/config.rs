//! Identity-resolution configuration.

use crate::naming::destination;

/// Feature configuration for identity resolution, resolved once per
/// reconciliation cycle and passed explicitly into the synthetic table
/// injector rather than read from ambient global state.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Deployment-wide switch for identity resolution.
    pub resolution_enabled: bool,

    /// Destination types eligible for identity resolution.
    pub enabled_destinations: Vec<String>,
}

impl IdentityConfig {
    pub fn resolution_enabled(&self) -> bool {
        self.resolution_enabled
    }

    pub fn enabled_for(&self, destination_type: &str) -> bool {
        self.enabled_destinations
            .iter()
            .any(|dest| dest == destination_type)
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            resolution_enabled: false,
            enabled_destinations: vec![
                destination::SNOWFLAKE.to_string(),
                destination::BIGQUERY.to_string(),
            ],
        }
    }
}

//! Testing harness for code built on the catalog client.
//!
//! Helper constructors for configs and sample assets, shared by this
//! crate's tests and by downstream integration tests.

use crate::config::{AuthConfig, ClientConfig};
use crate::errors::CatalogResult;
use crate::model::column::Column;
use crate::model::table::Table;
use crate::service::ServiceHealth;
use std::collections::HashMap;

/// Creates a test client config with sensible defaults and no retries.
pub fn test_client_config(name: &str, base_url: &str) -> ClientConfig {
    ClientConfig {
        name: name.to_string(),
        base_url: base_url.to_string(),
        auth: AuthConfig::None,
        timeout_secs: 30,
        max_retries: 0,
        verify_tls: true,
        headers: HashMap::new(),
    }
}

/// Creates a test client config with an API token.
pub fn test_client_config_with_token(name: &str, base_url: &str, token: &str) -> ClientConfig {
    ClientConfig {
        auth: AuthConfig::ApiToken {
            token: crate::SecureString::new(token.to_string()),
        },
        ..test_client_config(name, base_url)
    }
}

/// A schema qualifiedName usable as a parent for sample assets.
pub const SAMPLE_SCHEMA_QN: &str = "default/postgres/1699000000/sales/public";

/// Creates a sample table under [`SAMPLE_SCHEMA_QN`].
pub fn sample_table(name: &str) -> Table {
    Table::creator(name, SAMPLE_SCHEMA_QN)
        .with_description(format!("Sample table {}", name))
        .with_row_count(1000)
        .with_column_count(3)
}

/// Creates a sample column on the given table.
pub fn sample_column(name: &str, table_name: &str, order: i32) -> Column {
    Column::creator(
        name,
        format!("{}/{}", SAMPLE_SCHEMA_QN, table_name),
        order,
    )
    .with_data_type("text")
}

/// Asserts that a health check returned healthy.
pub fn assert_healthy(result: &CatalogResult<ServiceHealth>) {
    match result {
        Ok(ServiceHealth::Healthy) => {}
        other => panic!("Expected Healthy, got {:?}", other),
    }
}

/// Asserts that a health check returned unhealthy.
pub fn assert_unhealthy(result: &CatalogResult<ServiceHealth>) {
    match result {
        Ok(ServiceHealth::Unhealthy(_)) => {}
        other => panic!("Expected Unhealthy, got {:?}", other),
    }
}

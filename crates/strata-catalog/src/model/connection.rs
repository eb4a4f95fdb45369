//! Connection assets: the root of every source hierarchy.
//!
//! A connection's qualifiedName anchors the qualifiedNames of everything
//! crawled through it, so it is generated once at creation time and never
//! changes afterwards.

use super::core::{AssetType, CommonAttributes, Entity};
use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionAttributes {
    #[serde(flatten)]
    pub common: CommonAttributes,
    /// Source system behind the connection, e.g. `postgres`, `tableau`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connector_name: Option<String>,
    /// Connector category, e.g. `warehouse`, `bi`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
}

impl AssetType for ConnectionAttributes {
    const TYPE_NAME: &'static str = "Connection";

    fn common(&self) -> &CommonAttributes {
        &self.common
    }

    fn common_mut(&mut self) -> &mut CommonAttributes {
        &mut self.common
    }
}

pub type Connection = Entity<ConnectionAttributes>;

impl Connection {
    /// Starts a connection to create. The qualifiedName is generated as
    /// `default/{connector}/{epoch-seconds}`; the epoch suffix keeps
    /// re-created connections distinct.
    pub fn creator(name: impl Into<String>, connector_name: impl Into<String>) -> Self {
        let name = name.into();
        let connector_name = connector_name.into();
        let qualified_name = format!(
            "default/{}/{}",
            connector_name.to_lowercase(),
            Utc::now().timestamp()
        );

        let mut attributes = ConnectionAttributes {
            connector_name: Some(connector_name),
            ..Default::default()
        };
        attributes.common.name = Some(name);
        attributes.common.qualified_name = Some(qualified_name);
        Self::new(attributes)
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.attributes.category = Some(category.into());
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.attributes.host = Some(host.into());
        self
    }

    pub fn with_port(mut self, port: i32) -> Self {
        self.attributes.port = Some(port);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creator_generates_qualified_name() {
        let connection = Connection::creator("Analytics Warehouse", "Postgres");
        let qn = connection.qualified_name().unwrap();
        assert!(qn.starts_with("default/postgres/"));
        assert_eq!(connection.name(), Some("Analytics Warehouse"));
        assert_eq!(
            connection.attributes.connector_name.as_deref(),
            Some("Postgres")
        );
    }

    #[test]
    fn test_builder_setters() {
        let connection = Connection::creator("wh", "snowflake")
            .with_category("warehouse")
            .with_host("acme.snowflakecomputing.com")
            .with_port(443);

        assert_eq!(connection.attributes.category.as_deref(), Some("warehouse"));
        assert_eq!(connection.attributes.port, Some(443));
    }
}

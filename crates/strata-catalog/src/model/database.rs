//! Database assets.

use super::core::{child_qualified_name, AssetType, CommonAttributes, Entity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseAttributes {
    #[serde(flatten)]
    pub common: CommonAttributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_qualified_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_count: Option<i32>,
}

impl AssetType for DatabaseAttributes {
    const TYPE_NAME: &'static str = "Database";

    fn common(&self) -> &CommonAttributes {
        &self.common
    }

    fn common_mut(&mut self) -> &mut CommonAttributes {
        &mut self.common
    }
}

pub type Database = Entity<DatabaseAttributes>;

impl Database {
    /// Starts a database to create under the given connection. The
    /// qualifiedName is `{connectionQualifiedName}/{name}`.
    pub fn creator(name: impl Into<String>, connection_qualified_name: impl Into<String>) -> Self {
        let name = name.into();
        let connection_qualified_name = connection_qualified_name.into();
        let qualified_name = child_qualified_name(&connection_qualified_name, &name);

        let mut attributes = DatabaseAttributes {
            connection_qualified_name: Some(connection_qualified_name),
            ..Default::default()
        };
        attributes.common.name = Some(name);
        attributes.common.qualified_name = Some(qualified_name);
        Self::new(attributes)
    }

    pub fn with_schema_count(mut self, count: i32) -> Self {
        self.attributes.schema_count = Some(count);
        self
    }
}

//! Schema assets.

use super::core::{
    child_qualified_name, parent_qualified_name, qualified_name_tail, AssetType, CommonAttributes,
    Entity,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchemaAttributes {
    #[serde(flatten)]
    pub common: CommonAttributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_qualified_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_qualified_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_count: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_count: Option<i32>,
}

impl AssetType for SchemaAttributes {
    const TYPE_NAME: &'static str = "Schema";

    fn common(&self) -> &CommonAttributes {
        &self.common
    }

    fn common_mut(&mut self) -> &mut CommonAttributes {
        &mut self.common
    }
}

pub type Schema = Entity<SchemaAttributes>;

impl Schema {
    /// Starts a schema to create under the given database. Ancestor names
    /// and qualifiedNames are derived from the database qualifiedName.
    pub fn creator(name: impl Into<String>, database_qualified_name: impl Into<String>) -> Self {
        let name = name.into();
        let database_qualified_name = database_qualified_name.into();
        let qualified_name = child_qualified_name(&database_qualified_name, &name);
        let database_name = qualified_name_tail(&database_qualified_name).map(str::to_string);
        let connection_qualified_name =
            parent_qualified_name(&database_qualified_name).map(str::to_string);

        let mut attributes = SchemaAttributes {
            connection_qualified_name,
            database_name,
            database_qualified_name: Some(database_qualified_name),
            ..Default::default()
        };
        attributes.common.name = Some(name);
        attributes.common.qualified_name = Some(qualified_name);
        Self::new(attributes)
    }

    pub fn with_table_count(mut self, count: i32) -> Self {
        self.attributes.table_count = Some(count);
        self
    }

    pub fn with_view_count(mut self, count: i32) -> Self {
        self.attributes.view_count = Some(count);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creator_derives_ancestors() {
        let schema = Schema::creator("public", "default/postgres/1699000000/sales");
        assert_eq!(
            schema.qualified_name(),
            Some("default/postgres/1699000000/sales/public")
        );
        assert_eq!(schema.attributes.database_name.as_deref(), Some("sales"));
        assert_eq!(
            schema.attributes.connection_qualified_name.as_deref(),
            Some("default/postgres/1699000000")
        );
    }
}

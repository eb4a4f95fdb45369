//! View assets. Same hierarchy as tables, plus the defining SQL.

use super::core::{
    child_qualified_name, parent_qualified_name, qualified_name_tail, AssetType, CommonAttributes,
    Entity,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewAttributes {
    #[serde(flatten)]
    pub common: CommonAttributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_qualified_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_qualified_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_qualified_name: Option<String>,
    /// SQL statement defining the view.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_count: Option<i32>,
}

impl AssetType for ViewAttributes {
    const TYPE_NAME: &'static str = "View";

    fn common(&self) -> &CommonAttributes {
        &self.common
    }

    fn common_mut(&mut self) -> &mut CommonAttributes {
        &mut self.common
    }
}

pub type View = Entity<ViewAttributes>;

impl View {
    /// Starts a view to create under the given schema.
    pub fn creator(name: impl Into<String>, schema_qualified_name: impl Into<String>) -> Self {
        let name = name.into();
        let schema_qualified_name = schema_qualified_name.into();
        let qualified_name = child_qualified_name(&schema_qualified_name, &name);

        let schema_name = qualified_name_tail(&schema_qualified_name).map(str::to_string);
        let database_qualified_name =
            parent_qualified_name(&schema_qualified_name).map(str::to_string);
        let database_name = database_qualified_name
            .as_deref()
            .and_then(qualified_name_tail)
            .map(str::to_string);
        let connection_qualified_name = database_qualified_name
            .as_deref()
            .and_then(parent_qualified_name)
            .map(str::to_string);

        let mut attributes = ViewAttributes {
            connection_qualified_name,
            database_name,
            database_qualified_name,
            schema_name,
            schema_qualified_name: Some(schema_qualified_name),
            ..Default::default()
        };
        attributes.common.name = Some(name);
        attributes.common.qualified_name = Some(qualified_name);
        Self::new(attributes)
    }

    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        self.attributes.definition = Some(definition.into());
        self
    }

    pub fn with_column_count(mut self, count: i32) -> Self {
        self.attributes.column_count = Some(count);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creator_and_definition() {
        let view = View::creator("daily_orders", "default/postgres/1699000000/sales/public")
            .with_definition("SELECT * FROM orders WHERE created_at > now() - interval '1 day'");

        assert_eq!(
            view.qualified_name(),
            Some("default/postgres/1699000000/sales/public/daily_orders")
        );
        assert_eq!(view.attributes.database_name.as_deref(), Some("sales"));
        assert!(view.attributes.definition.as_deref().unwrap().starts_with("SELECT"));
    }
}

//! Column assets.

use super::core::{
    child_qualified_name, parent_qualified_name, qualified_name_tail, AssetType, CommonAttributes,
    Entity,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnAttributes {
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
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_qualified_name: Option<String>,
    /// Source data type, e.g. `varchar(255)`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    /// 1-based position of the column in its table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_primary: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_nullable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric_scale: Option<i32>,
}

impl AssetType for ColumnAttributes {
    const TYPE_NAME: &'static str = "Column";

    fn common(&self) -> &CommonAttributes {
        &self.common
    }

    fn common_mut(&mut self) -> &mut CommonAttributes {
        &mut self.common
    }
}

pub type Column = Entity<ColumnAttributes>;

impl Column {
    /// Starts a column to create under the given table, at the given
    /// 1-based position. Ancestor identifiers are recovered from the table
    /// qualifiedName.
    pub fn creator(
        name: impl Into<String>,
        table_qualified_name: impl Into<String>,
        order: i32,
    ) -> Self {
        let name = name.into();
        let table_qualified_name = table_qualified_name.into();
        let qualified_name = child_qualified_name(&table_qualified_name, &name);

        let table_name = qualified_name_tail(&table_qualified_name).map(str::to_string);
        let schema_qualified_name =
            parent_qualified_name(&table_qualified_name).map(str::to_string);
        let schema_name = schema_qualified_name
            .as_deref()
            .and_then(qualified_name_tail)
            .map(str::to_string);
        let database_qualified_name = schema_qualified_name
            .as_deref()
            .and_then(parent_qualified_name)
            .map(str::to_string);
        let database_name = database_qualified_name
            .as_deref()
            .and_then(qualified_name_tail)
            .map(str::to_string);
        let connection_qualified_name = database_qualified_name
            .as_deref()
            .and_then(parent_qualified_name)
            .map(str::to_string);

        let mut attributes = ColumnAttributes {
            connection_qualified_name,
            database_name,
            database_qualified_name,
            schema_name,
            schema_qualified_name,
            table_name,
            table_qualified_name: Some(table_qualified_name),
            order: Some(order),
            ..Default::default()
        };
        attributes.common.name = Some(name);
        attributes.common.qualified_name = Some(qualified_name);
        Self::new(attributes)
    }

    pub fn with_data_type(mut self, data_type: impl Into<String>) -> Self {
        self.attributes.data_type = Some(data_type.into());
        self
    }

    pub fn with_is_primary(mut self, is_primary: bool) -> Self {
        self.attributes.is_primary = Some(is_primary);
        self
    }

    pub fn with_is_nullable(mut self, is_nullable: bool) -> Self {
        self.attributes.is_nullable = Some(is_nullable);
        self
    }

    pub fn with_precision(mut self, precision: i32) -> Self {
        self.attributes.precision = Some(precision);
        self
    }

    pub fn with_numeric_scale(mut self, scale: i32) -> Self {
        self.attributes.numeric_scale = Some(scale);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE_QN: &str = "default/postgres/1699000000/sales/public/orders";

    #[test]
    fn test_creator_derives_hierarchy() {
        let column = Column::creator("order_id", TABLE_QN, 1);

        assert_eq!(
            column.qualified_name(),
            Some("default/postgres/1699000000/sales/public/orders/order_id")
        );
        assert_eq!(column.attributes.table_name.as_deref(), Some("orders"));
        assert_eq!(column.attributes.schema_name.as_deref(), Some("public"));
        assert_eq!(column.attributes.database_name.as_deref(), Some("sales"));
        assert_eq!(
            column.attributes.connection_qualified_name.as_deref(),
            Some("default/postgres/1699000000")
        );
        assert_eq!(column.attributes.order, Some(1));
    }

    #[test]
    fn test_builder_fields() {
        let column = Column::creator("amount", TABLE_QN, 4)
            .with_data_type("numeric(12,2)")
            .with_is_primary(false)
            .with_is_nullable(false)
            .with_precision(12)
            .with_numeric_scale(2);

        assert_eq!(column.attributes.data_type.as_deref(), Some("numeric(12,2)"));
        assert_eq!(column.attributes.is_nullable, Some(false));
        assert_eq!(column.attributes.precision, Some(12));
        assert_eq!(column.attributes.numeric_scale, Some(2));
    }
}

//! Table assets.
//!
//! Tables sit three levels below a connection
//! (`connection/database/schema/table`), so the creator recovers every
//! ancestor name and qualifiedName from the schema qualifiedName alone.

use super::core::{
    child_qualified_name, parent_qualified_name, qualified_name_tail, AssetRef, AssetType,
    CommonAttributes, Entity,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableAttributes {
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
    pub row_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_count: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partitioned: Option<bool>,
    /// Columns of this table, as references.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<AssetRef>,
}

impl AssetType for TableAttributes {
    const TYPE_NAME: &'static str = "Table";

    fn common(&self) -> &CommonAttributes {
        &self.common
    }

    fn common_mut(&mut self) -> &mut CommonAttributes {
        &mut self.common
    }
}

pub type Table = Entity<TableAttributes>;

impl Table {
    /// Starts a table to create under the given schema.
    ///
    /// The table qualifiedName is `{schemaQualifiedName}/{name}`; database
    /// and connection identifiers are recovered by popping path segments.
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

        let mut attributes = TableAttributes {
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

    pub fn with_row_count(mut self, rows: i64) -> Self {
        self.attributes.row_count = Some(rows);
        self
    }

    pub fn with_size_bytes(mut self, bytes: i64) -> Self {
        self.attributes.size_bytes = Some(bytes);
        self
    }

    pub fn with_column_count(mut self, count: i32) -> Self {
        self.attributes.column_count = Some(count);
        self
    }

    pub fn with_partitioned(mut self, partitioned: bool) -> Self {
        self.attributes.partitioned = Some(partitioned);
        self
    }

    /// Adds a column reference to this table.
    pub fn with_column(mut self, column: AssetRef) -> Self {
        self.attributes.columns.push(column);
        self
    }
}

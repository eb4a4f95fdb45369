//! BI assets: dashboards and the fields they expose.

use super::core::{
    child_qualified_name, parent_qualified_name, qualified_name_tail, AssetRef, AssetType,
    CommonAttributes, Entity,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardAttributes {
    #[serde(flatten)]
    pub common: CommonAttributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_qualified_name: Option<String>,
    /// Deep link to the dashboard in the source BI tool.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_count: Option<i32>,
    /// Fields on this dashboard, as references.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<AssetRef>,
}

impl AssetType for DashboardAttributes {
    const TYPE_NAME: &'static str = "Dashboard";

    fn common(&self) -> &CommonAttributes {
        &self.common
    }

    fn common_mut(&mut self) -> &mut CommonAttributes {
        &mut self.common
    }
}

pub type Dashboard = Entity<DashboardAttributes>;

impl Dashboard {
    /// Starts a dashboard to create under the given BI connection.
    pub fn creator(name: impl Into<String>, connection_qualified_name: impl Into<String>) -> Self {
        let name = name.into();
        let connection_qualified_name = connection_qualified_name.into();
        let qualified_name = child_qualified_name(&connection_qualified_name, &name);

        let mut attributes = DashboardAttributes {
            connection_qualified_name: Some(connection_qualified_name),
            ..Default::default()
        };
        attributes.common.name = Some(name);
        attributes.common.qualified_name = Some(qualified_name);
        Self::new(attributes)
    }

    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.attributes.source_url = Some(url.into());
        self
    }

    pub fn with_field_count(mut self, count: i32) -> Self {
        self.attributes.field_count = Some(count);
        self
    }

    pub fn with_field(mut self, field: AssetRef) -> Self {
        self.attributes.fields.push(field);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardFieldAttributes {
    #[serde(flatten)]
    pub common: CommonAttributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_qualified_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard_qualified_name: Option<String>,
    /// Field kind in the source tool, e.g. `measure`, `dimension`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    /// Calculation formula, when the field is computed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
}

impl AssetType for DashboardFieldAttributes {
    const TYPE_NAME: &'static str = "DashboardField";

    fn common(&self) -> &CommonAttributes {
        &self.common
    }

    fn common_mut(&mut self) -> &mut CommonAttributes {
        &mut self.common
    }
}

pub type DashboardField = Entity<DashboardFieldAttributes>;

impl DashboardField {
    /// Starts a dashboard field to create under the given dashboard.
    pub fn creator(name: impl Into<String>, dashboard_qualified_name: impl Into<String>) -> Self {
        let name = name.into();
        let dashboard_qualified_name = dashboard_qualified_name.into();
        let qualified_name = child_qualified_name(&dashboard_qualified_name, &name);

        let dashboard_name = qualified_name_tail(&dashboard_qualified_name).map(str::to_string);
        let connection_qualified_name =
            parent_qualified_name(&dashboard_qualified_name).map(str::to_string);

        let mut attributes = DashboardFieldAttributes {
            connection_qualified_name,
            dashboard_name,
            dashboard_qualified_name: Some(dashboard_qualified_name),
            ..Default::default()
        };
        attributes.common.name = Some(name);
        attributes.common.qualified_name = Some(qualified_name);
        Self::new(attributes)
    }

    pub fn with_field_type(mut self, field_type: impl Into<String>) -> Self {
        self.attributes.field_type = Some(field_type.into());
        self
    }

    pub fn with_formula(mut self, formula: impl Into<String>) -> Self {
        self.attributes.formula = Some(formula.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONNECTION_QN: &str = "default/tableau/1699000000";

    #[test]
    fn test_dashboard_creator() {
        let dashboard = Dashboard::creator("Revenue Overview", CONNECTION_QN)
            .with_source_url("https://bi.acme.io/views/revenue")
            .with_field_count(8);

        assert_eq!(
            dashboard.qualified_name(),
            Some("default/tableau/1699000000/Revenue Overview")
        );
        assert_eq!(dashboard.attributes.field_count, Some(8));
    }

    #[test]
    fn test_field_creator_derives_dashboard() {
        let dashboard_qn = format!("{}/Revenue Overview", CONNECTION_QN);
        let field = DashboardField::creator("Total Revenue", dashboard_qn.clone())
            .with_field_type("measure")
            .with_formula("SUM(amount)");

        assert_eq!(
            field.attributes.dashboard_name.as_deref(),
            Some("Revenue Overview")
        );
        assert_eq!(
            field.attributes.dashboard_qualified_name.as_deref(),
            Some(dashboard_qn.as_str())
        );
        assert_eq!(
            field.attributes.connection_qualified_name.as_deref(),
            Some(CONNECTION_QN)
        );
        assert_eq!(field.attributes.formula.as_deref(), Some("SUM(amount)"));
    }
}

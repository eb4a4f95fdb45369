//! Glossary assets: glossaries, terms, and categories.
//!
//! Glossaries are not connection-scoped; their qualifiedName is a slug of
//! the name, generated client-side and treated as opaque by the service.
//! Terms and categories are anchored to their glossary by reference.

use super::core::{AssetRef, AssetType, CommonAttributes, Entity};
use serde::{Deserialize, Serialize};

fn slug(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GlossaryAttributes {
    #[serde(flatten)]
    pub common: CommonAttributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl AssetType for GlossaryAttributes {
    const TYPE_NAME: &'static str = "Glossary";

    fn common(&self) -> &CommonAttributes {
        &self.common
    }

    fn common_mut(&mut self) -> &mut CommonAttributes {
        &mut self.common
    }
}

pub type Glossary = Entity<GlossaryAttributes>;

impl Glossary {
    /// Starts a glossary to create.
    pub fn creator(name: impl Into<String>) -> Self {
        let name = name.into();
        let qualified_name = slug(&name);

        let mut attributes = GlossaryAttributes::default();
        attributes.common.name = Some(name);
        attributes.common.qualified_name = Some(qualified_name);
        Self::new(attributes)
    }

    pub fn with_short_description(mut self, description: impl Into<String>) -> Self {
        self.attributes.short_description = Some(description.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.attributes.language = Some(language.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GlossaryTermAttributes {
    #[serde(flatten)]
    pub common: CommonAttributes,
    /// The glossary this term belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<AssetRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abbreviation: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

impl AssetType for GlossaryTermAttributes {
    const TYPE_NAME: &'static str = "GlossaryTerm";

    fn common(&self) -> &CommonAttributes {
        &self.common
    }

    fn common_mut(&mut self) -> &mut CommonAttributes {
        &mut self.common
    }
}

pub type GlossaryTerm = Entity<GlossaryTermAttributes>;

impl GlossaryTerm {
    /// Starts a term to create inside the glossary with the given GUID.
    pub fn creator(name: impl Into<String>, glossary_guid: impl Into<String>) -> Self {
        Self::creator_with_anchor(name, Glossary::ref_by_guid(glossary_guid))
    }

    /// Starts a term to create with an explicit glossary reference, for
    /// callers that only know the glossary's qualifiedName.
    pub fn creator_with_anchor(name: impl Into<String>, anchor: AssetRef) -> Self {
        let mut attributes = GlossaryTermAttributes {
            anchor: Some(anchor),
            ..Default::default()
        };
        attributes.common.name = Some(name.into());
        Self::new(attributes)
    }

    pub fn with_short_description(mut self, description: impl Into<String>) -> Self {
        self.attributes.short_description = Some(description.into());
        self
    }

    pub fn with_abbreviation(mut self, abbreviation: impl Into<String>) -> Self {
        self.attributes.abbreviation = Some(abbreviation.into());
        self
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.attributes.examples.push(example.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GlossaryCategoryAttributes {
    #[serde(flatten)]
    pub common: CommonAttributes,
    /// The glossary this category belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<AssetRef>,
    /// Parent category, for nested hierarchies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_category: Option<AssetRef>,
}

impl AssetType for GlossaryCategoryAttributes {
    const TYPE_NAME: &'static str = "GlossaryCategory";

    fn common(&self) -> &CommonAttributes {
        &self.common
    }

    fn common_mut(&mut self) -> &mut CommonAttributes {
        &mut self.common
    }
}

pub type GlossaryCategory = Entity<GlossaryCategoryAttributes>;

impl GlossaryCategory {
    /// Starts a category to create inside the glossary with the given GUID.
    pub fn creator(name: impl Into<String>, glossary_guid: impl Into<String>) -> Self {
        let mut attributes = GlossaryCategoryAttributes {
            anchor: Some(Glossary::ref_by_guid(glossary_guid)),
            ..Default::default()
        };
        attributes.common.name = Some(name.into());
        Self::new(attributes)
    }

    pub fn with_parent_category(mut self, parent: AssetRef) -> Self {
        self.attributes.parent_category = Some(parent);
        self
    }
}

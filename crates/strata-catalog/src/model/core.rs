//! Core entity envelope and shared value types for the asset model.
//!
//! Every asset the catalog serves is an [`Entity`]: a thin bookkeeping
//! envelope (type name, GUID, status, audit stamps) around a flat record of
//! named attributes. Typed asset modules plug their attribute record into
//! the envelope through the [`AssetType`] trait; [`AnyEntity`] is the
//! untyped wire form used at API boundaries.

use crate::errors::{CatalogError, CatalogResult};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle status of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityStatus {
    /// Entity is live.
    Active,
    /// Entity was soft-deleted and is retained for audit.
    Deleted,
}

impl std::fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Active => "ACTIVE",
            Self::Deleted => "DELETED",
        };
        write!(f, "{}", s)
    }
}

/// Certification stamp an asset can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertificateStatus {
    Verified,
    Draft,
    Deprecated,
}

impl std::fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Verified => "VERIFIED",
            Self::Draft => "DRAFT",
            Self::Deprecated => "DEPRECATED",
        };
        write!(f, "{}", s)
    }
}

/// Kind of announcement banner shown on an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnouncementType {
    Information,
    Warning,
    Issue,
}

/// An announcement banner: type, title, and message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub announcement_type: AnnouncementType,
    pub title: String,
    pub message: String,
}

impl Announcement {
    pub fn new(
        announcement_type: AnnouncementType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            announcement_type,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// A tag attached to an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagAssignment {
    /// Tag name (the tag typedef's name).
    pub type_name: String,
    /// Whether the tag propagates to downstream assets.
    #[serde(default)]
    pub propagate: bool,
}

impl TagAssignment {
    /// Creates a non-propagating tag assignment.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            type_name: name.into(),
            propagate: false,
        }
    }

    pub fn with_propagate(mut self, propagate: bool) -> Self {
        self.propagate = propagate;
        self
    }
}

/// A glossary term assigned to an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermAssignment {
    /// GUID of the glossary term.
    pub term_guid: String,
    /// Human-readable term name, filled in by the server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_text: Option<String>,
}

impl TermAssignment {
    pub fn new(term_guid: impl Into<String>) -> Self {
        Self {
            term_guid: term_guid.into(),
            display_text: None,
        }
    }

    pub fn with_display_text(mut self, text: impl Into<String>) -> Self {
        self.display_text = Some(text.into());
        self
    }
}

/// Unique attributes identifying an asset without a GUID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniqueAttributes {
    pub qualified_name: String,
}

/// A reference to an asset, by GUID or by (typeName, qualifiedName).
///
/// References are what relationship attributes carry on the wire; they
/// identify an asset without embedding its attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRef {
    pub type_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_attributes: Option<UniqueAttributes>,
}

impl AssetRef {
    /// Reference by GUID.
    pub fn by_guid(type_name: impl Into<String>, guid: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            guid: Some(guid.into()),
            unique_attributes: None,
        }
    }

    /// Reference by qualifiedName.
    pub fn by_qualified_name(
        type_name: impl Into<String>,
        qualified_name: impl Into<String>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            guid: None,
            unique_attributes: Some(UniqueAttributes {
                qualified_name: qualified_name.into(),
            }),
        }
    }
}

/// Attributes every asset carries, regardless of type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommonAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualified_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Description set by a user in the UI, overriding the crawled one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub owner_users: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub owner_groups: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_status: Option<CertificateStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_status_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub announcement_type: Option<AnnouncementType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub announcement_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub announcement_message: Option<String>,
}

impl CommonAttributes {
    /// Applies an announcement to the three underlying attribute fields.
    pub fn set_announcement(&mut self, announcement: Announcement) {
        self.announcement_type = Some(announcement.announcement_type);
        self.announcement_title = Some(announcement.title);
        self.announcement_message = Some(announcement.message);
    }

    /// Clears all announcement fields.
    pub fn clear_announcement(&mut self) {
        self.announcement_type = None;
        self.announcement_title = None;
        self.announcement_message = None;
    }

    /// Reads the announcement, if one is set.
    pub fn announcement(&self) -> Option<Announcement> {
        Some(Announcement {
            announcement_type: self.announcement_type?,
            title: self.announcement_title.clone().unwrap_or_default(),
            message: self.announcement_message.clone().unwrap_or_default(),
        })
    }
}

/// Attribute record of a concrete asset type.
///
/// Implementations pair a fixed wire `TYPE_NAME` with accessors for the
/// [`CommonAttributes`] embedded in the record.
pub trait AssetType:
    Clone + Default + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Fixed type name on the wire.
    const TYPE_NAME: &'static str;

    fn common(&self) -> &CommonAttributes;
    fn common_mut(&mut self) -> &mut CommonAttributes;
}

/// An asset entity: bookkeeping envelope plus an attribute record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity<A> {
    pub type_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EntityStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    /// Creation time, epoch milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<i64>,
    /// Last-update time, epoch milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<i64>,
    pub attributes: A,
    /// Tags attached to the asset.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classifications: Vec<TagAssignment>,
    /// Glossary terms assigned to the asset.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub meanings: Vec<TermAssignment>,
}

/// Untyped entity as it appears at API boundaries.
pub type AnyEntity = Entity<Value>;

impl<A: AssetType> Entity<A> {
    /// Wraps an attribute record in a fresh envelope.
    pub fn new(attributes: A) -> Self {
        Self {
            type_name: A::TYPE_NAME.to_string(),
            guid: None,
            status: None,
            created_by: None,
            updated_by: None,
            create_time: None,
            update_time: None,
            attributes,
            classifications: Vec::new(),
            meanings: Vec::new(),
        }
    }

    /// Starts an update payload: only identity fields are populated, so a
    /// save touches nothing the caller did not set.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` if `qualified_name` or `name` is empty; both are
    /// required to address an existing asset.
    pub fn updater(
        qualified_name: impl Into<String>,
        name: impl Into<String>,
    ) -> CatalogResult<Self> {
        let qualified_name = qualified_name.into();
        let name = name.into();
        validate_update_identity(&qualified_name, &name)?;

        let mut entity = Self::new(A::default());
        entity.attributes.common_mut().qualified_name = Some(qualified_name);
        entity.attributes.common_mut().name = Some(name);
        Ok(entity)
    }

    pub fn name(&self) -> Option<&str> {
        self.attributes.common().name.as_deref()
    }

    pub fn qualified_name(&self) -> Option<&str> {
        self.attributes.common().qualified_name.as_deref()
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.attributes.common_mut().description = Some(description.into());
        self
    }

    pub fn with_user_description(mut self, description: impl Into<String>) -> Self {
        self.attributes.common_mut().user_description = Some(description.into());
        self
    }

    pub fn with_owner_users(mut self, users: Vec<String>) -> Self {
        self.attributes.common_mut().owner_users = users;
        self
    }

    pub fn with_owner_groups(mut self, groups: Vec<String>) -> Self {
        self.attributes.common_mut().owner_groups = groups;
        self
    }

    pub fn with_certificate(mut self, status: CertificateStatus) -> Self {
        self.attributes.common_mut().certificate_status = Some(status);
        self
    }

    pub fn with_certificate_message(mut self, message: impl Into<String>) -> Self {
        self.attributes.common_mut().certificate_status_message = Some(message.into());
        self
    }

    pub fn with_announcement(mut self, announcement: Announcement) -> Self {
        self.attributes.common_mut().set_announcement(announcement);
        self
    }

    pub fn with_tag(mut self, tag: TagAssignment) -> Self {
        self.classifications.push(tag);
        self
    }

    pub fn with_term(mut self, term: TermAssignment) -> Self {
        self.meanings.push(term);
        self
    }

    /// Reference to an asset of this type by GUID.
    pub fn ref_by_guid(guid: impl Into<String>) -> AssetRef {
        AssetRef::by_guid(A::TYPE_NAME, guid)
    }

    /// Reference to an asset of this type by qualifiedName.
    pub fn ref_by_qualified_name(qualified_name: impl Into<String>) -> AssetRef {
        AssetRef::by_qualified_name(A::TYPE_NAME, qualified_name)
    }

    /// Trims this entity down to a reference suitable for relationship
    /// payloads: GUID if known, otherwise (typeName, qualifiedName).
    ///
    /// # Errors
    ///
    /// `InvalidRequest` if the entity has neither a GUID nor a
    /// qualifiedName.
    pub fn trim_to_reference(&self) -> CatalogResult<AssetRef> {
        if let Some(guid) = self.guid.as_deref().filter(|g| !g.is_empty()) {
            return Ok(AssetRef::by_guid(self.type_name.clone(), guid));
        }
        if let Some(qn) = self.qualified_name().filter(|q| !q.is_empty()) {
            return Ok(AssetRef::by_qualified_name(self.type_name.clone(), qn));
        }
        Err(CatalogError::InvalidRequest(format!(
            "Unable to create a reference to a {} without a GUID or qualifiedName",
            self.type_name
        )))
    }

    /// Erases the attribute record into its untyped wire form.
    pub fn into_any(self) -> CatalogResult<AnyEntity> {
        let attributes = serde_json::to_value(&self.attributes)
            .map_err(|e| CatalogError::Internal(e.to_string()))?;
        Ok(Entity {
            type_name: self.type_name,
            guid: self.guid,
            status: self.status,
            created_by: self.created_by,
            updated_by: self.updated_by,
            create_time: self.create_time,
            update_time: self.update_time,
            attributes,
            classifications: self.classifications,
            meanings: self.meanings,
        })
    }
}

impl AnyEntity {
    /// Narrows an untyped entity into a typed one.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if the entity's `typeName` is not `A::TYPE_NAME`;
    /// `InvalidResponse` if the attribute record does not deserialize.
    pub fn downcast<A: AssetType>(self) -> CatalogResult<Entity<A>> {
        if self.type_name != A::TYPE_NAME {
            return Err(CatalogError::TypeMismatch {
                guid: self.guid.unwrap_or_default(),
                expected: A::TYPE_NAME,
                actual: self.type_name,
            });
        }

        let attributes: A = if self.attributes.is_null() {
            A::default()
        } else {
            serde_json::from_value(self.attributes)
                .map_err(|e| CatalogError::InvalidResponse(e.to_string()))?
        };

        Ok(Entity {
            type_name: self.type_name,
            guid: self.guid,
            status: self.status,
            created_by: self.created_by,
            updated_by: self.updated_by,
            create_time: self.create_time,
            update_time: self.update_time,
            attributes,
            classifications: self.classifications,
            meanings: self.meanings,
        })
    }

    /// Reads an attribute from the untyped record.
    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Reads a string attribute from the untyped record.
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attr(key).and_then(Value::as_str)
    }

    /// Writes an attribute into the untyped record, promoting a null
    /// record to an object first.
    pub fn set_attr(&mut self, key: &str, value: Value) {
        if !self.attributes.is_object() {
            self.attributes = Value::Object(serde_json::Map::new());
        }
        if let Some(map) = self.attributes.as_object_mut() {
            map.insert(key.to_string(), value);
        }
    }

    /// Removes an attribute from the untyped record.
    pub fn remove_attr(&mut self, key: &str) {
        if let Some(map) = self.attributes.as_object_mut() {
            map.remove(key);
        }
    }
}

/// Joins a parent qualifiedName and a child name into the child's
/// qualifiedName.
pub fn child_qualified_name(parent: &str, name: &str) -> String {
    format!("{}/{}", parent.trim_end_matches('/'), name)
}

/// Recovers the parent qualifiedName by popping the last path segment.
pub fn parent_qualified_name(qualified_name: &str) -> Option<&str> {
    qualified_name
        .rsplit_once('/')
        .map(|(parent, _)| parent)
        .filter(|p| !p.is_empty())
}

/// The last path segment of a qualifiedName (the asset's own name).
pub fn qualified_name_tail(qualified_name: &str) -> Option<&str> {
    qualified_name
        .rsplit_once('/')
        .map(|(_, tail)| tail)
        .filter(|t| !t.is_empty())
}

/// Checks the identity fields an update must carry.
pub fn validate_update_identity(qualified_name: &str, name: &str) -> CatalogResult<()> {
    if qualified_name.is_empty() {
        return Err(CatalogError::InvalidRequest(
            "qualifiedName is required to update an asset".to_string(),
        ));
    }
    if name.is_empty() {
        return Err(CatalogError::InvalidRequest(
            "name is required to update an asset".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    struct ProbeAttributes {
        #[serde(flatten)]
        common: CommonAttributes,
        #[serde(skip_serializing_if = "Option::is_none")]
        probe_field: Option<String>,
    }

    impl AssetType for ProbeAttributes {
        const TYPE_NAME: &'static str = "Probe";

        fn common(&self) -> &CommonAttributes {
            &self.common
        }

        fn common_mut(&mut self) -> &mut CommonAttributes {
            &mut self.common
        }
    }

    #[test]
    fn test_qualified_name_helpers() {
        let qn = child_qualified_name("default/postgres/1699", "sales");
        assert_eq!(qn, "default/postgres/1699/sales");
        assert_eq!(parent_qualified_name(&qn), Some("default/postgres/1699"));
        assert_eq!(qualified_name_tail(&qn), Some("sales"));
        assert_eq!(parent_qualified_name("solo"), None);
        assert_eq!(qualified_name_tail("solo"), None);
    }

    #[test]
    fn test_updater_requires_identity() {
        let err = Entity::<ProbeAttributes>::updater("", "name").unwrap_err();
        assert!(matches!(err, CatalogError::InvalidRequest(_)));

        let err = Entity::<ProbeAttributes>::updater("default/x/y", "").unwrap_err();
        assert!(matches!(err, CatalogError::InvalidRequest(_)));

        let entity = Entity::<ProbeAttributes>::updater("default/x/y", "y").unwrap();
        assert_eq!(entity.qualified_name(), Some("default/x/y"));
        assert_eq!(entity.name(), Some("y"));
    }

    #[test]
    fn test_downcast_checks_type_name() {
        let mut any = Entity::<ProbeAttributes>::new(ProbeAttributes::default())
            .into_any()
            .unwrap();
        any.type_name = "SomethingElse".to_string();
        any.guid = Some("g-1".to_string());

        match any.downcast::<ProbeAttributes>() {
            Err(CatalogError::TypeMismatch {
                guid,
                expected,
                actual,
            }) => {
                assert_eq!(guid, "g-1");
                assert_eq!(expected, "Probe");
                assert_eq!(actual, "SomethingElse");
            }
            other => panic!("Expected TypeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_downcast_round_trip() {
        let entity = Entity::<ProbeAttributes>::updater("default/a/b", "b")
            .unwrap()
            .with_description("probe asset")
            .with_tag(TagAssignment::new("PII").with_propagate(true));

        let any = entity.clone().into_any().unwrap();
        assert_eq!(any.attr_str("qualifiedName"), Some("default/a/b"));

        let back = any.downcast::<ProbeAttributes>().unwrap();
        assert_eq!(back, entity);
    }

    #[test]
    fn test_trim_to_reference_prefers_guid() {
        let mut entity = Entity::<ProbeAttributes>::updater("default/a/b", "b").unwrap();
        entity.guid = Some("guid-9".to_string());

        let reference = entity.trim_to_reference().unwrap();
        assert_eq!(reference.guid.as_deref(), Some("guid-9"));
        assert!(reference.unique_attributes.is_none());

        entity.guid = None;
        let reference = entity.trim_to_reference().unwrap();
        assert_eq!(
            reference.unique_attributes.unwrap().qualified_name,
            "default/a/b"
        );
    }

    #[test]
    fn test_trim_to_reference_requires_identity() {
        let entity = Entity::<ProbeAttributes>::new(ProbeAttributes::default());
        assert!(matches!(
            entity.trim_to_reference(),
            Err(CatalogError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_announcement_round_trip_on_common() {
        let mut common = CommonAttributes::default();
        common.set_announcement(Announcement::new(
            AnnouncementType::Warning,
            "Backfill running",
            "Numbers may shift until Friday",
        ));

        let announcement = common.announcement().unwrap();
        assert_eq!(announcement.announcement_type, AnnouncementType::Warning);
        assert_eq!(announcement.title, "Backfill running");

        common.clear_announcement();
        assert!(common.announcement().is_none());
    }

    #[test]
    fn test_entity_serializes_camel_case() {
        let entity = Entity::<ProbeAttributes>::updater("default/a/b", "b").unwrap();
        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(json["typeName"], "Probe");
        assert_eq!(json["attributes"]["qualifiedName"], "default/a/b");
        // Unset optional fields stay off the wire entirely.
        assert!(json.get("guid").is_none());
        assert!(json["attributes"].get("description").is_none());
    }
}

//! The catalog service interface.
//!
//! [`CatalogService`] is the seam between callers and the remote API: the
//! live [`CatalogClient`](crate::CatalogClient) implements it over REST,
//! and [`MockCatalog`](crate::MockCatalog) implements it in memory for
//! tests and offline development.

use crate::errors::CatalogResult;
use crate::model::core::{
    Announcement, AnyEntity, AssetType, CertificateStatus, Entity, EntityStatus, TagAssignment,
    TermAssignment,
};
use crate::search::{SearchRequest, SearchResponse};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Health status of the service connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ServiceHealth {
    /// Service is reachable and responding normally.
    Healthy,
    /// Service responds but something is off.
    Degraded(String),
    /// Service is not usable.
    Unhealthy(String),
    /// Health status is unknown.
    Unknown,
}

/// Entity header returned inside mutation responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityHeader {
    pub type_name: String,
    pub guid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EntityStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_text: Option<String>,
}

/// Entities touched by a mutation, grouped by what happened to them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MutatedEntities {
    #[serde(rename = "CREATE", skip_serializing_if = "Vec::is_empty")]
    pub create: Vec<EntityHeader>,
    #[serde(rename = "UPDATE", skip_serializing_if = "Vec::is_empty")]
    pub update: Vec<EntityHeader>,
    #[serde(rename = "DELETE", skip_serializing_if = "Vec::is_empty")]
    pub delete: Vec<EntityHeader>,
}

/// Response to any entity mutation (save, delete).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MutationResponse {
    pub mutated_entities: MutatedEntities,
    /// Mapping from client-side placeholder GUIDs to assigned GUIDs.
    pub guid_assignments: HashMap<String, String>,
}

impl MutationResponse {
    /// GUID assigned to the first created entity, if any.
    pub fn first_created_guid(&self) -> Option<&str> {
        self.mutated_entities
            .create
            .first()
            .map(|h| h.guid.as_str())
    }
}

/// Operations the catalog exposes.
///
/// Assets addressed by `(type_name, qualified_name)` use the asset's fixed
/// wire type name, e.g. `Table`. All mutation operations validate identity
/// fields before any network traffic.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Returns the service name (tenant label in logs).
    fn name(&self) -> &str;

    /// Checks the health of the connection.
    async fn health_check(&self) -> CatalogResult<ServiceHealth>;

    /// Tests the connection.
    async fn test_connection(&self) -> CatalogResult<bool>;

    /// Fetches an asset by GUID.
    async fn get_by_guid(&self, guid: &str) -> CatalogResult<AnyEntity>;

    /// Fetches an asset by its unique (typeName, qualifiedName) pair.
    async fn get_by_qualified_name(
        &self,
        type_name: &str,
        qualified_name: &str,
    ) -> CatalogResult<AnyEntity>;

    /// Creates or updates an asset (upsert by qualifiedName).
    async fn save(&self, entity: AnyEntity) -> CatalogResult<MutationResponse>;

    /// Creates or updates a batch of assets in one call.
    async fn save_many(&self, entities: Vec<AnyEntity>) -> CatalogResult<MutationResponse>;

    /// Soft-deletes an asset; it stays readable with `DELETED` status.
    async fn delete_by_guid(&self, guid: &str) -> CatalogResult<MutationResponse>;

    /// Hard-deletes an asset, removing it entirely.
    async fn purge_by_guid(&self, guid: &str) -> CatalogResult<MutationResponse>;

    /// Runs an index search.
    async fn search(&self, request: SearchRequest) -> CatalogResult<SearchResponse>;

    /// Attaches tags to an asset.
    async fn add_tags(
        &self,
        type_name: &str,
        qualified_name: &str,
        tags: Vec<TagAssignment>,
    ) -> CatalogResult<()>;

    /// Detaches one tag from an asset.
    async fn remove_tag(
        &self,
        type_name: &str,
        qualified_name: &str,
        tag_name: &str,
    ) -> CatalogResult<()>;

    /// Appends glossary terms to an asset, keeping existing ones.
    async fn append_terms(
        &self,
        type_name: &str,
        qualified_name: &str,
        terms: Vec<TermAssignment>,
    ) -> CatalogResult<AnyEntity>;

    /// Removes the given terms from an asset.
    async fn remove_terms(
        &self,
        type_name: &str,
        qualified_name: &str,
        term_guids: Vec<String>,
    ) -> CatalogResult<AnyEntity>;

    /// Replaces all terms on an asset with the given set.
    async fn replace_terms(
        &self,
        type_name: &str,
        qualified_name: &str,
        terms: Vec<TermAssignment>,
    ) -> CatalogResult<AnyEntity>;

    /// Sets the certificate on an asset. Requires qualifiedName and name.
    async fn update_certificate(
        &self,
        type_name: &str,
        qualified_name: &str,
        name: &str,
        status: CertificateStatus,
        message: Option<String>,
    ) -> CatalogResult<()>;

    /// Removes the certificate from an asset. Requires qualifiedName and name.
    async fn remove_certificate(
        &self,
        type_name: &str,
        qualified_name: &str,
        name: &str,
    ) -> CatalogResult<()>;

    /// Sets the announcement on an asset. Requires qualifiedName and name.
    async fn update_announcement(
        &self,
        type_name: &str,
        qualified_name: &str,
        name: &str,
        announcement: Announcement,
    ) -> CatalogResult<()>;

    /// Removes the announcement from an asset. Requires qualifiedName and name.
    async fn remove_announcement(
        &self,
        type_name: &str,
        qualified_name: &str,
        name: &str,
    ) -> CatalogResult<()>;
}

/// Fetches an asset by GUID, narrowed to the requested type.
///
/// # Errors
///
/// `TypeMismatch` if the stored asset has a different type than `A`.
pub async fn get_typed<A, S>(service: &S, guid: &str) -> CatalogResult<Entity<A>>
where
    A: AssetType,
    S: CatalogService + ?Sized,
{
    service.get_by_guid(guid).await?.downcast::<A>()
}

/// Fetches an asset by qualifiedName, narrowed to the requested type.
pub async fn get_typed_by_qualified_name<A, S>(
    service: &S,
    qualified_name: &str,
) -> CatalogResult<Entity<A>>
where
    A: AssetType,
    S: CatalogService + ?Sized,
{
    service
        .get_by_qualified_name(A::TYPE_NAME, qualified_name)
        .await?
        .downcast::<A>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutation_response_first_created_guid() {
        let mut response = MutationResponse::default();
        assert!(response.first_created_guid().is_none());

        response.mutated_entities.create.push(EntityHeader {
            type_name: "Table".to_string(),
            guid: "new-guid".to_string(),
            status: Some(EntityStatus::Active),
            display_text: None,
        });
        assert_eq!(response.first_created_guid(), Some("new-guid"));
    }

    #[test]
    fn test_mutated_entities_wire_keys() {
        let response = MutationResponse {
            mutated_entities: MutatedEntities {
                create: vec![EntityHeader {
                    type_name: "Table".to_string(),
                    guid: "g1".to_string(),
                    status: None,
                    display_text: None,
                }],
                ..Default::default()
            },
            guid_assignments: HashMap::new(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["mutatedEntities"]["CREATE"][0]["guid"], "g1");
        assert!(json["mutatedEntities"].get("UPDATE").is_none());
    }
}

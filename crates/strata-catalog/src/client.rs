//! Live REST implementation of [`CatalogService`].
//!
//! Every operation delegates to the shared [`HttpClient`]; this module only
//! knows endpoint paths, wire DTOs, and the merge rules for partial updates.

use crate::config::ClientConfig;
use crate::errors::{CatalogError, CatalogResult};
use crate::http::{HttpClient, RateLimitConfig, ResponseCache};
use crate::model::connection::{Connection, ConnectionAttributes};
use crate::model::core::{
    validate_update_identity, Announcement, AnyEntity, AssetType, CertificateStatus,
    TagAssignment, TermAssignment,
};
use crate::search::{SearchRequest, SearchResponse};
use crate::service::{CatalogService, MutationResponse, ServiceHealth};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use tracing::{debug, info, instrument};

const ENTITY_BY_GUID: &str = "api/meta/entity/guid";
const ENTITY_BULK: &str = "api/meta/entity/bulk";
const ENTITY_UNIQUE: &str = "api/meta/entity/uniqueAttribute/type";
const INDEX_SEARCH: &str = "api/meta/search/indexsearch";
const SERVICE_HEALTH: &str = "api/service/health";

/// Query parameter addressing an asset by qualifiedName on the
/// unique-attribute endpoints.
const QN_PARAM: &str = "attr:qualifiedName";

/// Client for a Strata catalog tenant.
pub struct CatalogClient {
    name: String,
    http: HttpClient,
    /// Connections change rarely and are referenced by every asset under
    /// them, so lookups are cached briefly.
    connection_cache: ResponseCache<AnyEntity>,
}

/// Response wrapper for single-entity fetches.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntityResponse {
    #[serde(default)]
    #[allow(dead_code)]
    referred_entities: HashMap<String, AnyEntity>,
    entity: AnyEntity,
}

impl CatalogClient {
    /// Creates a client from configuration.
    ///
    /// Tenant rate limits are generous, but a client-side limiter keeps
    /// bulk-loading scripts from tripping them.
    pub fn new(config: ClientConfig) -> CatalogResult<Self> {
        let rate_limit = RateLimitConfig {
            max_requests: 300,
            period: std::time::Duration::from_secs(60),
            burst_size: 50,
        };

        let name = config.name.clone();
        let http = HttpClient::with_rate_limit(config, Some(rate_limit))?;

        info!("Catalog client initialized for tenant {}", name);

        Ok(Self {
            name,
            http,
            connection_cache: ResponseCache::new(std::time::Duration::from_secs(300), 100),
        })
    }

    /// Fetches a connection by qualifiedName, through the cache.
    pub async fn get_connection(&self, qualified_name: &str) -> CatalogResult<Connection> {
        let entity = self
            .connection_cache
            .get_or_try_insert_with(qualified_name.to_string(), || async {
                self.get_by_qualified_name(ConnectionAttributes::TYPE_NAME, qualified_name)
                    .await
            })
            .await?;
        entity.downcast()
    }

    fn qn_query<'a>(qualified_name: &'a str) -> [(&'static str, &'a str); 1] {
        [(QN_PARAM, qualified_name)]
    }

    /// Applies a partial attribute update to an asset addressed by
    /// (typeName, qualifiedName). `attributes` may carry explicit nulls to
    /// unset fields; `meanings` replaces the term list when given.
    async fn partial_update(
        &self,
        type_name: &str,
        qualified_name: &str,
        attributes: serde_json::Value,
        meanings: Option<&[TermAssignment]>,
    ) -> CatalogResult<AnyEntity> {
        let mut entity = json!({
            "typeName": type_name,
            "attributes": attributes,
        });
        if let Some(meanings) = meanings {
            entity["meanings"] = json!(meanings);
        }

        let path = format!("{}/{}", ENTITY_UNIQUE, type_name);
        let response = self
            .http
            .put_with_query(&path, &Self::qn_query(qualified_name), &json!({ "entity": entity }))
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::RequestFailed(format!(
                "Failed to update {} {}: {}",
                type_name, qualified_name, body
            )));
        }

        self.get_by_qualified_name(type_name, qualified_name).await
    }
}

#[async_trait::async_trait]
impl CatalogService for CatalogClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn health_check(&self) -> CatalogResult<ServiceHealth> {
        match self.http.get(SERVICE_HEALTH).await {
            Ok(response) if response.status().is_success() => Ok(ServiceHealth::Healthy),
            Ok(response) => Ok(ServiceHealth::Degraded(format!(
                "Unexpected status: {}",
                response.status()
            ))),
            Err(CatalogError::AuthenticationFailed(_)) => Ok(ServiceHealth::Unhealthy(
                "Authentication failed".to_string(),
            )),
            Err(CatalogError::ConnectionFailed(e)) => Ok(ServiceHealth::Unhealthy(format!(
                "Connection failed: {}",
                e
            ))),
            Err(e) => Ok(ServiceHealth::Degraded(e.to_string())),
        }
    }

    async fn test_connection(&self) -> CatalogResult<bool> {
        let response = self.http.get(SERVICE_HEALTH).await?;
        Ok(response.status().is_success())
    }

    #[instrument(skip(self))]
    async fn get_by_guid(&self, guid: &str) -> CatalogResult<AnyEntity> {
        let path = format!("{}/{}", ENTITY_BY_GUID, guid);
        let response: EntityResponse = self.http.get_json(&path).await.map_err(|e| match e {
            CatalogError::NotFound(_) => {
                CatalogError::NotFound(format!("No asset found with GUID {}", guid))
            }
            other => other,
        })?;
        Ok(response.entity)
    }

    #[instrument(skip(self))]
    async fn get_by_qualified_name(
        &self,
        type_name: &str,
        qualified_name: &str,
    ) -> CatalogResult<AnyEntity> {
        let path = format!("{}/{}", ENTITY_UNIQUE, type_name);
        let response: EntityResponse = self
            .http
            .get_json_with_query(&path, &Self::qn_query(qualified_name))
            .await
            .map_err(|e| match e {
                CatalogError::NotFound(_) => CatalogError::NotFound(format!(
                    "No {} found with qualifiedName {}",
                    type_name, qualified_name
                )),
                other => other,
            })?;
        Ok(response.entity)
    }

    async fn save(&self, entity: AnyEntity) -> CatalogResult<MutationResponse> {
        self.save_many(vec![entity]).await
    }

    #[instrument(skip(self, entities), fields(count = entities.len()))]
    async fn save_many(&self, entities: Vec<AnyEntity>) -> CatalogResult<MutationResponse> {
        let response: MutationResponse = self
            .http
            .post_json(ENTITY_BULK, &json!({ "entities": entities }))
            .await?;

        debug!(
            created = response.mutated_entities.create.len(),
            updated = response.mutated_entities.update.len(),
            "Saved entities"
        );
        Ok(response)
    }

    #[instrument(skip(self))]
    async fn delete_by_guid(&self, guid: &str) -> CatalogResult<MutationResponse> {
        let path = format!("{}/{}", ENTITY_BY_GUID, guid);
        self.http
            .delete_json_with_query(&path, &[("deleteType", "SOFT")])
            .await
    }

    #[instrument(skip(self))]
    async fn purge_by_guid(&self, guid: &str) -> CatalogResult<MutationResponse> {
        let path = format!("{}/{}", ENTITY_BY_GUID, guid);
        self.http
            .delete_json_with_query(&path, &[("deleteType", "PURGE")])
            .await
    }

    #[instrument(skip(self, request))]
    async fn search(&self, request: SearchRequest) -> CatalogResult<SearchResponse> {
        self.http.post_json(INDEX_SEARCH, &request).await
    }

    #[instrument(skip(self, tags))]
    async fn add_tags(
        &self,
        type_name: &str,
        qualified_name: &str,
        tags: Vec<TagAssignment>,
    ) -> CatalogResult<()> {
        if tags.is_empty() {
            return Err(CatalogError::InvalidRequest(
                "No tags given to add".to_string(),
            ));
        }

        let path = format!("{}/{}/classifications", ENTITY_UNIQUE, type_name);
        let response = self
            .http
            .post_with_query(&path, &Self::qn_query(qualified_name), &tags)
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::RequestFailed(format!(
                "Failed to add tags: {}",
                body
            )));
        }

        info!("Added {} tag(s) to {}", tags.len(), qualified_name);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_tag(
        &self,
        type_name: &str,
        qualified_name: &str,
        tag_name: &str,
    ) -> CatalogResult<()> {
        let path = format!(
            "{}/{}/classification/{}",
            ENTITY_UNIQUE, type_name, tag_name
        );
        let response = self
            .http
            .delete_with_query(&path, &Self::qn_query(qualified_name))
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::RequestFailed(format!(
                "Failed to remove tag {}: {}",
                tag_name, body
            )));
        }

        info!("Removed tag {} from {}", tag_name, qualified_name);
        Ok(())
    }

    #[instrument(skip(self, terms))]
    async fn append_terms(
        &self,
        type_name: &str,
        qualified_name: &str,
        terms: Vec<TermAssignment>,
    ) -> CatalogResult<AnyEntity> {
        let current = self.get_by_qualified_name(type_name, qualified_name).await?;

        let mut merged = current.meanings.clone();
        for term in terms {
            if !merged.iter().any(|t| t.term_guid == term.term_guid) {
                merged.push(term);
            }
        }

        let name = current.attr_str("name").unwrap_or_default().to_string();
        validate_update_identity(qualified_name, &name)?;

        self.partial_update(
            type_name,
            qualified_name,
            json!({ "qualifiedName": qualified_name, "name": name }),
            Some(&merged),
        )
        .await
    }

    #[instrument(skip(self, term_guids))]
    async fn remove_terms(
        &self,
        type_name: &str,
        qualified_name: &str,
        term_guids: Vec<String>,
    ) -> CatalogResult<AnyEntity> {
        let current = self.get_by_qualified_name(type_name, qualified_name).await?;

        let merged: Vec<TermAssignment> = current
            .meanings
            .iter()
            .filter(|t| !term_guids.contains(&t.term_guid))
            .cloned()
            .collect();

        let name = current.attr_str("name").unwrap_or_default().to_string();
        validate_update_identity(qualified_name, &name)?;

        self.partial_update(
            type_name,
            qualified_name,
            json!({ "qualifiedName": qualified_name, "name": name }),
            Some(&merged),
        )
        .await
    }

    #[instrument(skip(self, terms))]
    async fn replace_terms(
        &self,
        type_name: &str,
        qualified_name: &str,
        terms: Vec<TermAssignment>,
    ) -> CatalogResult<AnyEntity> {
        let current = self.get_by_qualified_name(type_name, qualified_name).await?;
        let name = current.attr_str("name").unwrap_or_default().to_string();
        validate_update_identity(qualified_name, &name)?;

        self.partial_update(
            type_name,
            qualified_name,
            json!({ "qualifiedName": qualified_name, "name": name }),
            Some(&terms),
        )
        .await
    }

    #[instrument(skip(self, message))]
    async fn update_certificate(
        &self,
        type_name: &str,
        qualified_name: &str,
        name: &str,
        status: CertificateStatus,
        message: Option<String>,
    ) -> CatalogResult<()> {
        validate_update_identity(qualified_name, name)?;

        self.partial_update(
            type_name,
            qualified_name,
            json!({
                "qualifiedName": qualified_name,
                "name": name,
                "certificateStatus": status,
                "certificateStatusMessage": message,
            }),
            None,
        )
        .await?;

        info!("Set certificate {} on {}", status, qualified_name);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_certificate(
        &self,
        type_name: &str,
        qualified_name: &str,
        name: &str,
    ) -> CatalogResult<()> {
        validate_update_identity(qualified_name, name)?;

        self.partial_update(
            type_name,
            qualified_name,
            json!({
                "qualifiedName": qualified_name,
                "name": name,
                "certificateStatus": null,
                "certificateStatusMessage": null,
            }),
            None,
        )
        .await?;

        info!("Removed certificate from {}", qualified_name);
        Ok(())
    }

    #[instrument(skip(self, announcement))]
    async fn update_announcement(
        &self,
        type_name: &str,
        qualified_name: &str,
        name: &str,
        announcement: Announcement,
    ) -> CatalogResult<()> {
        validate_update_identity(qualified_name, name)?;

        self.partial_update(
            type_name,
            qualified_name,
            json!({
                "qualifiedName": qualified_name,
                "name": name,
                "announcementType": announcement.announcement_type,
                "announcementTitle": announcement.title,
                "announcementMessage": announcement.message,
            }),
            None,
        )
        .await?;

        info!("Set announcement on {}", qualified_name);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_announcement(
        &self,
        type_name: &str,
        qualified_name: &str,
        name: &str,
    ) -> CatalogResult<()> {
        validate_update_identity(qualified_name, name)?;

        self.partial_update(
            type_name,
            qualified_name,
            json!({
                "qualifiedName": qualified_name,
                "name": name,
                "announcementType": null,
                "announcementTitle": null,
                "announcementMessage": null,
            }),
            None,
        )
        .await?;

        info!("Removed announcement from {}", qualified_name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthConfig;

    fn create_test_client() -> CatalogClient {
        let config = ClientConfig::new(
            "test-tenant",
            "https://tenant.strata.io",
            AuthConfig::ApiToken {
                token: "test-token".into(),
            },
        );
        CatalogClient::new(config).unwrap()
    }

    #[test]
    fn test_client_name() {
        let client = create_test_client();
        assert_eq!(client.name(), "test-tenant");
    }

    #[tokio::test]
    async fn test_update_certificate_requires_identity() {
        let client = create_test_client();
        let err = client
            .update_certificate("Table", "", "orders", CertificateStatus::Verified, None)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidRequest(_)));

        let err = client
            .update_certificate(
                "Table",
                "default/postgres/1/sales/public/orders",
                "",
                CertificateStatus::Verified,
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_add_tags_rejects_empty_list() {
        let client = create_test_client();
        let err = client
            .add_tags("Table", "default/postgres/1/sales/public/orders", vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidRequest(_)));
    }

    #[test]
    fn test_entity_response_parsing() {
        let json = serde_json::json!({
            "referredEntities": {},
            "entity": {
                "typeName": "Table",
                "guid": "g-1",
                "attributes": { "name": "orders" }
            }
        });
        let response: EntityResponse = serde_json::from_value(json).unwrap();
        assert_eq!(response.entity.type_name, "Table");
        assert_eq!(response.entity.attr_str("name"), Some("orders"));
    }
}

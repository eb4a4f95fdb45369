//! In-memory catalog for tests and offline development.
//!
//! Implements every [`CatalogService`] operation against a `HashMap`,
//! including a small interpreter for the search DSL. Upsert, soft delete,
//! and partial-merge semantics mirror the live service.

use crate::errors::{CatalogError, CatalogResult};
use crate::model::core::{
    validate_update_identity, Announcement, AnyEntity, CertificateStatus, EntityStatus,
    TagAssignment, TermAssignment,
};
use crate::search::{fields, Query, SearchRequest, SearchResponse};
use crate::service::{CatalogService, EntityHeader, MutationResponse, ServiceHealth};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Mock catalog backed by in-memory state.
pub struct MockCatalog {
    name: String,
    /// GUID -> entity.
    entities: Arc<RwLock<HashMap<String, AnyEntity>>>,
    /// (typeName, qualifiedName) -> GUID.
    by_qualified_name: Arc<RwLock<HashMap<(String, String), String>>>,
}

impl MockCatalog {
    /// Creates an empty mock catalog.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entities: Arc::new(RwLock::new(HashMap::new())),
            by_qualified_name: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    async fn guid_for(&self, type_name: &str, qualified_name: &str) -> CatalogResult<String> {
        let index = self.by_qualified_name.read().await;
        index
            .get(&(type_name.to_string(), qualified_name.to_string()))
            .cloned()
            .ok_or_else(|| {
                CatalogError::NotFound(format!(
                    "No {} found with qualifiedName {}",
                    type_name, qualified_name
                ))
            })
    }

    /// Merges a partial attribute payload into a stored entity: non-null
    /// values overwrite, explicit nulls unset.
    fn merge_attributes(stored: &mut AnyEntity, incoming: &Value) {
        if let Some(map) = incoming.as_object() {
            for (key, value) in map {
                if value.is_null() {
                    stored.remove_attr(key);
                } else {
                    stored.set_attr(key, value.clone());
                }
            }
        }
    }

    async fn mutate_by_qualified_name<F>(
        &self,
        type_name: &str,
        qualified_name: &str,
        mutate: F,
    ) -> CatalogResult<AnyEntity>
    where
        F: FnOnce(&mut AnyEntity) -> CatalogResult<()>,
    {
        let guid = self.guid_for(type_name, qualified_name).await?;
        let mut entities = self.entities.write().await;
        let entity = entities
            .get_mut(&guid)
            .ok_or_else(|| CatalogError::NotFound(format!("No asset found with GUID {}", guid)))?;
        mutate(entity)?;
        entity.update_time = Some(Utc::now().timestamp_millis());
        Ok(entity.clone())
    }

    fn header(entity: &AnyEntity) -> EntityHeader {
        EntityHeader {
            type_name: entity.type_name.clone(),
            guid: entity.guid.clone().unwrap_or_default(),
            status: entity.status,
            display_text: entity.attr_str("name").map(str::to_string),
        }
    }
}

#[async_trait]
impl CatalogService for MockCatalog {
    fn name(&self) -> &str {
        &self.name
    }

    async fn health_check(&self) -> CatalogResult<ServiceHealth> {
        Ok(ServiceHealth::Healthy)
    }

    async fn test_connection(&self) -> CatalogResult<bool> {
        Ok(true)
    }

    async fn get_by_guid(&self, guid: &str) -> CatalogResult<AnyEntity> {
        let entities = self.entities.read().await;
        entities
            .get(guid)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("No asset found with GUID {}", guid)))
    }

    async fn get_by_qualified_name(
        &self,
        type_name: &str,
        qualified_name: &str,
    ) -> CatalogResult<AnyEntity> {
        let guid = self.guid_for(type_name, qualified_name).await?;
        self.get_by_guid(&guid).await
    }

    async fn save(&self, entity: AnyEntity) -> CatalogResult<MutationResponse> {
        self.save_many(vec![entity]).await
    }

    async fn save_many(&self, incoming: Vec<AnyEntity>) -> CatalogResult<MutationResponse> {
        let mut response = MutationResponse::default();
        let now = Utc::now().timestamp_millis();

        for mut entity in incoming {
            let qualified_name = entity.attr_str("qualifiedName").map(str::to_string);

            // Resolve an existing GUID: explicit, or through the
            // qualifiedName index (upsert semantics).
            let existing_guid = match entity.guid.clone().filter(|g| !g.is_empty()) {
                Some(guid) => Some(guid),
                None => match &qualified_name {
                    Some(qn) => self
                        .by_qualified_name
                        .read()
                        .await
                        .get(&(entity.type_name.clone(), qn.clone()))
                        .cloned(),
                    None => None,
                },
            };

            let mut entities = self.entities.write().await;
            match existing_guid.filter(|g| entities.contains_key(g)) {
                Some(guid) => {
                    let stored = entities.get_mut(&guid).expect("checked above");
                    let attributes = entity.attributes.clone();
                    Self::merge_attributes(stored, &attributes);
                    if !entity.classifications.is_empty() {
                        stored.classifications = entity.classifications.clone();
                    }
                    if !entity.meanings.is_empty() {
                        stored.meanings = entity.meanings.clone();
                    }
                    stored.update_time = Some(now);
                    response.mutated_entities.update.push(Self::header(stored));
                }
                None => {
                    let placeholder = entity.guid.clone();
                    let guid = Uuid::new_v4().to_string();
                    entity.guid = Some(guid.clone());
                    entity.status = Some(EntityStatus::Active);
                    entity.create_time = Some(now);
                    entity.update_time = Some(now);

                    if let Some(qn) = &qualified_name {
                        self.by_qualified_name
                            .write()
                            .await
                            .insert((entity.type_name.clone(), qn.clone()), guid.clone());
                    }
                    if let Some(placeholder) = placeholder.filter(|p| !p.is_empty()) {
                        response.guid_assignments.insert(placeholder, guid.clone());
                    }

                    response.mutated_entities.create.push(Self::header(&entity));
                    entities.insert(guid, entity);
                }
            }
        }

        Ok(response)
    }

    async fn delete_by_guid(&self, guid: &str) -> CatalogResult<MutationResponse> {
        let mut entities = self.entities.write().await;
        let entity = entities
            .get_mut(guid)
            .ok_or_else(|| CatalogError::NotFound(format!("No asset found with GUID {}", guid)))?;

        entity.status = Some(EntityStatus::Deleted);
        entity.update_time = Some(Utc::now().timestamp_millis());

        let mut response = MutationResponse::default();
        response.mutated_entities.delete.push(Self::header(entity));
        Ok(response)
    }

    async fn purge_by_guid(&self, guid: &str) -> CatalogResult<MutationResponse> {
        let mut entities = self.entities.write().await;
        let entity = entities
            .remove(guid)
            .ok_or_else(|| CatalogError::NotFound(format!("No asset found with GUID {}", guid)))?;

        if let Some(qn) = entity.attr_str("qualifiedName") {
            self.by_qualified_name
                .write()
                .await
                .remove(&(entity.type_name.clone(), qn.to_string()));
        }

        let mut response = MutationResponse::default();
        response.mutated_entities.delete.push(Self::header(&entity));
        Ok(response)
    }

    async fn search(&self, request: SearchRequest) -> CatalogResult<SearchResponse> {
        let entities = self.entities.read().await;
        let mut hits: Vec<&AnyEntity> = entities
            .values()
            .filter(|e| matches(e, &request.dsl.query))
            .collect();
        hits.sort_by(|a, b| {
            a.attr_str("qualifiedName")
                .unwrap_or_default()
                .cmp(b.attr_str("qualifiedName").unwrap_or_default())
        });

        let approximate_count = hits.len() as u64;
        let page: Vec<AnyEntity> = hits
            .into_iter()
            .skip(request.dsl.from)
            .take(request.dsl.size)
            .cloned()
            .collect();

        Ok(SearchResponse {
            approximate_count,
            entities: page,
        })
    }

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

        self.mutate_by_qualified_name(type_name, qualified_name, |entity| {
            for tag in tags {
                if !entity
                    .classifications
                    .iter()
                    .any(|existing| existing.type_name == tag.type_name)
                {
                    entity.classifications.push(tag);
                }
            }
            Ok(())
        })
        .await?;
        Ok(())
    }

    async fn remove_tag(
        &self,
        type_name: &str,
        qualified_name: &str,
        tag_name: &str,
    ) -> CatalogResult<()> {
        self.mutate_by_qualified_name(type_name, qualified_name, |entity| {
            let before = entity.classifications.len();
            entity.classifications.retain(|t| t.type_name != tag_name);
            if entity.classifications.len() == before {
                return Err(CatalogError::NotFound(format!(
                    "Tag {} not present on {}",
                    tag_name, qualified_name
                )));
            }
            Ok(())
        })
        .await?;
        Ok(())
    }

    async fn append_terms(
        &self,
        type_name: &str,
        qualified_name: &str,
        terms: Vec<TermAssignment>,
    ) -> CatalogResult<AnyEntity> {
        self.mutate_by_qualified_name(type_name, qualified_name, |entity| {
            for term in terms {
                if !entity
                    .meanings
                    .iter()
                    .any(|existing| existing.term_guid == term.term_guid)
                {
                    entity.meanings.push(term);
                }
            }
            Ok(())
        })
        .await
    }

    async fn remove_terms(
        &self,
        type_name: &str,
        qualified_name: &str,
        term_guids: Vec<String>,
    ) -> CatalogResult<AnyEntity> {
        self.mutate_by_qualified_name(type_name, qualified_name, |entity| {
            entity.meanings.retain(|t| !term_guids.contains(&t.term_guid));
            Ok(())
        })
        .await
    }

    async fn replace_terms(
        &self,
        type_name: &str,
        qualified_name: &str,
        terms: Vec<TermAssignment>,
    ) -> CatalogResult<AnyEntity> {
        self.mutate_by_qualified_name(type_name, qualified_name, |entity| {
            entity.meanings = terms;
            Ok(())
        })
        .await
    }

    async fn update_certificate(
        &self,
        type_name: &str,
        qualified_name: &str,
        name: &str,
        status: CertificateStatus,
        message: Option<String>,
    ) -> CatalogResult<()> {
        validate_update_identity(qualified_name, name)?;

        self.mutate_by_qualified_name(type_name, qualified_name, |entity| {
            entity.set_attr("certificateStatus", Value::String(status.to_string()));
            match message {
                Some(message) => {
                    entity.set_attr("certificateStatusMessage", Value::String(message))
                }
                None => entity.remove_attr("certificateStatusMessage"),
            }
            Ok(())
        })
        .await?;
        Ok(())
    }

    async fn remove_certificate(
        &self,
        type_name: &str,
        qualified_name: &str,
        name: &str,
    ) -> CatalogResult<()> {
        validate_update_identity(qualified_name, name)?;

        self.mutate_by_qualified_name(type_name, qualified_name, |entity| {
            entity.remove_attr("certificateStatus");
            entity.remove_attr("certificateStatusMessage");
            Ok(())
        })
        .await?;
        Ok(())
    }

    async fn update_announcement(
        &self,
        type_name: &str,
        qualified_name: &str,
        name: &str,
        announcement: Announcement,
    ) -> CatalogResult<()> {
        validate_update_identity(qualified_name, name)?;

        self.mutate_by_qualified_name(type_name, qualified_name, |entity| {
            let kind = serde_json::to_value(announcement.announcement_type)
                .map_err(|e| CatalogError::Internal(e.to_string()))?;
            entity.set_attr("announcementType", kind);
            entity.set_attr("announcementTitle", Value::String(announcement.title));
            entity.set_attr("announcementMessage", Value::String(announcement.message));
            Ok(())
        })
        .await?;
        Ok(())
    }

    async fn remove_announcement(
        &self,
        type_name: &str,
        qualified_name: &str,
        name: &str,
    ) -> CatalogResult<()> {
        validate_update_identity(qualified_name, name)?;

        self.mutate_by_qualified_name(type_name, qualified_name, |entity| {
            entity.remove_attr("announcementType");
            entity.remove_attr("announcementTitle");
            entity.remove_attr("announcementMessage");
            Ok(())
        })
        .await?;
        Ok(())
    }
}

/// Resolves a search field against an entity, covering the reserved
/// index fields as well as plain attributes.
fn field_value(entity: &AnyEntity, field: &str) -> Option<Value> {
    match field {
        fields::TYPE_NAME => Some(Value::String(entity.type_name.clone())),
        fields::STATE => entity.status.map(|s| Value::String(s.to_string())),
        fields::GUID => entity.guid.clone().map(Value::String),
        _ => entity.attr(field).cloned(),
    }
}

/// Evaluates a query node against a single entity.
fn matches(entity: &AnyEntity, query: &Query) -> bool {
    match query {
        Query::Term { field, value } => field_value(entity, field).as_ref() == Some(value),
        Query::Prefix { field, value } => field_value(entity, field)
            .and_then(|v| v.as_str().map(|s| s.starts_with(value.as_str())))
            .unwrap_or(false),
        Query::Wildcard { field, pattern } => field_value(entity, field)
            .and_then(|v| v.as_str().map(|s| wildcard_match(pattern, s)))
            .unwrap_or(false),
        Query::Exists { field } => field_value(entity, field)
            .map(|v| !v.is_null())
            .unwrap_or(false),
        Query::Range { field, gte, lte } => {
            let value = match field_value(entity, field).and_then(|v| v.as_f64()) {
                Some(value) => value,
                None => return false,
            };
            let above = gte
                .as_ref()
                .and_then(Value::as_f64)
                .map_or(true, |bound| value >= bound);
            let below = lte
                .as_ref()
                .and_then(Value::as_f64)
                .map_or(true, |bound| value <= bound);
            above && below
        }
        Query::Bool {
            must,
            should,
            must_not,
            filter,
        } => {
            must.iter().all(|q| matches(entity, q))
                && filter.iter().all(|q| matches(entity, q))
                && (should.is_empty() || should.iter().any(|q| matches(entity, q)))
                && !must_not.iter().any(|q| matches(entity, q))
        }
    }
}

/// Glob matching with `*` (any run) and `?` (any single character).
fn wildcard_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    // dp[i][j]: pattern[..i] matches text[..j]
    let mut dp = vec![vec![false; text.len() + 1]; pattern.len() + 1];
    dp[0][0] = true;
    for i in 1..=pattern.len() {
        if pattern[i - 1] == '*' {
            dp[i][0] = dp[i - 1][0];
        }
    }

    for i in 1..=pattern.len() {
        for j in 1..=text.len() {
            dp[i][j] = match pattern[i - 1] {
                '*' => dp[i - 1][j] || dp[i][j - 1],
                '?' => dp[i - 1][j - 1],
                c => dp[i - 1][j - 1] && c == text[j - 1],
            };
        }
    }

    dp[pattern.len()][text.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::table::Table;
    use crate::search::FluentSearch;
    use crate::service::get_typed_by_qualified_name;

    const SCHEMA_QN: &str = "default/postgres/1699000000/sales/public";

    async fn seeded_catalog() -> MockCatalog {
        let catalog = MockCatalog::new("test");
        for name in ["orders", "customers", "payments"] {
            let table = Table::creator(name, SCHEMA_QN)
                .with_row_count(100)
                .into_any()
                .unwrap();
            catalog.save(table).await.unwrap();
        }
        catalog
    }

    #[test]
    fn test_wildcard_match() {
        assert!(wildcard_match("ord*", "orders"));
        assert!(wildcard_match("*ders", "orders"));
        assert!(wildcard_match("or?ers", "orders"));
        assert!(wildcard_match("*", "anything"));
        assert!(!wildcard_match("ord?", "orders"));
        assert!(!wildcard_match("x*", "orders"));
    }

    #[tokio::test]
    async fn test_save_assigns_guid_and_indexes() {
        let catalog = seeded_catalog().await;

        let fetched = catalog
            .get_by_qualified_name("Table", &format!("{}/orders", SCHEMA_QN))
            .await
            .unwrap();
        assert!(fetched.guid.is_some());
        assert_eq!(fetched.status, Some(EntityStatus::Active));
        assert!(fetched.create_time.is_some());
    }

    #[tokio::test]
    async fn test_save_upserts_by_qualified_name() {
        let catalog = seeded_catalog().await;

        let update = Table::creator("orders", SCHEMA_QN)
            .with_row_count(500)
            .into_any()
            .unwrap();
        let response = catalog.save(update).await.unwrap();
        assert_eq!(response.mutated_entities.update.len(), 1);
        assert!(response.mutated_entities.create.is_empty());

        let table: crate::model::table::Table =
            get_typed_by_qualified_name(&catalog, &format!("{}/orders", SCHEMA_QN))
                .await
                .unwrap();
        assert_eq!(table.attributes.row_count, Some(500));
    }

    #[tokio::test]
    async fn test_merge_unsets_on_null() {
        let catalog = seeded_catalog().await;
        let qn = format!("{}/orders", SCHEMA_QN);

        let mut update = Table::updater(&qn, "orders").unwrap().into_any().unwrap();
        update.set_attr("rowCount", Value::Null);
        catalog.save(update).await.unwrap();

        let fetched = catalog.get_by_qualified_name("Table", &qn).await.unwrap();
        assert!(fetched.attr("rowCount").is_none());
    }

    #[tokio::test]
    async fn test_soft_delete_and_purge() {
        let catalog = seeded_catalog().await;
        let qn = format!("{}/orders", SCHEMA_QN);
        let guid = catalog
            .get_by_qualified_name("Table", &qn)
            .await
            .unwrap()
            .guid
            .unwrap();

        catalog.delete_by_guid(&guid).await.unwrap();
        let deleted = catalog.get_by_guid(&guid).await.unwrap();
        assert_eq!(deleted.status, Some(EntityStatus::Deleted));

        catalog.purge_by_guid(&guid).await.unwrap();
        assert!(catalog.get_by_guid(&guid).await.unwrap_err().is_not_found());
        assert!(catalog
            .get_by_qualified_name("Table", &qn)
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_search_filters_and_pages() {
        let catalog = seeded_catalog().await;

        let response = FluentSearch::new()
            .of_type("Table")
            .active_only()
            .page_size(2)
            .execute(&catalog)
            .await
            .unwrap();
        assert_eq!(response.approximate_count, 3);
        assert_eq!(response.entities.len(), 2);

        let rest = FluentSearch::new()
            .of_type("Table")
            .active_only()
            .page_size(2)
            .next_page()
            .execute(&catalog)
            .await
            .unwrap();
        assert_eq!(rest.entities.len(), 1);
    }

    #[tokio::test]
    async fn test_search_wildcard_on_qualified_name() {
        let catalog = seeded_catalog().await;

        let response = FluentSearch::new()
            .where_(Query::wildcard(fields::QUALIFIED_NAME, "*/pay*"))
            .execute(&catalog)
            .await
            .unwrap();
        assert_eq!(response.approximate_count, 1);
        assert_eq!(response.entities[0].attr_str("name"), Some("payments"));
    }

    #[tokio::test]
    async fn test_tag_lifecycle() {
        let catalog = seeded_catalog().await;
        let qn = format!("{}/orders", SCHEMA_QN);

        catalog
            .add_tags(
                "Table",
                &qn,
                vec![TagAssignment::new("PII").with_propagate(true)],
            )
            .await
            .unwrap();

        let entity = catalog.get_by_qualified_name("Table", &qn).await.unwrap();
        assert_eq!(entity.classifications.len(), 1);
        assert!(entity.classifications[0].propagate);

        catalog.remove_tag("Table", &qn, "PII").await.unwrap();
        let entity = catalog.get_by_qualified_name("Table", &qn).await.unwrap();
        assert!(entity.classifications.is_empty());

        let err = catalog.remove_tag("Table", &qn, "PII").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_term_lifecycle() {
        let catalog = seeded_catalog().await;
        let qn = format!("{}/orders", SCHEMA_QN);

        let entity = catalog
            .append_terms("Table", &qn, vec![TermAssignment::new("term-1")])
            .await
            .unwrap();
        assert_eq!(entity.meanings.len(), 1);

        // Appending the same term again is a no-op.
        let entity = catalog
            .append_terms("Table", &qn, vec![TermAssignment::new("term-1")])
            .await
            .unwrap();
        assert_eq!(entity.meanings.len(), 1);

        let entity = catalog
            .replace_terms(
                "Table",
                &qn,
                vec![
                    TermAssignment::new("term-2"),
                    TermAssignment::new("term-3"),
                ],
            )
            .await
            .unwrap();
        assert_eq!(entity.meanings.len(), 2);

        let entity = catalog
            .remove_terms("Table", &qn, vec!["term-2".to_string()])
            .await
            .unwrap();
        assert_eq!(entity.meanings.len(), 1);
        assert_eq!(entity.meanings[0].term_guid, "term-3");
    }

    #[tokio::test]
    async fn test_certificate_requires_identity() {
        let catalog = seeded_catalog().await;
        let err = catalog
            .update_certificate("Table", "", "orders", CertificateStatus::Verified, None)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_certificate_lifecycle() {
        let catalog = seeded_catalog().await;
        let qn = format!("{}/orders", SCHEMA_QN);

        catalog
            .update_certificate(
                "Table",
                &qn,
                "orders",
                CertificateStatus::Verified,
                Some("Reviewed by data platform".to_string()),
            )
            .await
            .unwrap();

        let entity = catalog.get_by_qualified_name("Table", &qn).await.unwrap();
        assert_eq!(entity.attr_str("certificateStatus"), Some("VERIFIED"));

        catalog
            .remove_certificate("Table", &qn, "orders")
            .await
            .unwrap();
        let entity = catalog.get_by_qualified_name("Table", &qn).await.unwrap();
        assert!(entity.attr("certificateStatus").is_none());
        assert!(entity.attr("certificateStatusMessage").is_none());
    }

    #[tokio::test]
    async fn test_announcement_lifecycle() {
        let catalog = seeded_catalog().await;
        let qn = format!("{}/orders", SCHEMA_QN);

        catalog
            .update_announcement(
                "Table",
                &qn,
                "orders",
                Announcement::new(
                    crate::model::core::AnnouncementType::Issue,
                    "Late data",
                    "Upstream loader is delayed",
                ),
            )
            .await
            .unwrap();

        let entity = catalog.get_by_qualified_name("Table", &qn).await.unwrap();
        assert_eq!(entity.attr_str("announcementType"), Some("issue"));
        assert_eq!(entity.attr_str("announcementTitle"), Some("Late data"));

        catalog
            .remove_announcement("Table", &qn, "orders")
            .await
            .unwrap();
        let entity = catalog.get_by_qualified_name("Table", &qn).await.unwrap();
        assert!(entity.attr("announcementType").is_none());
    }
}

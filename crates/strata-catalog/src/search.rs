//! Search DSL for the catalog's index-search endpoint.
//!
//! Queries serialize to the Elasticsearch-style JSON the service expects.
//! [`FluentSearch`] is the ergonomic entry point; [`Query`] can be composed
//! directly when a search needs a shape the fluent builder does not cover.

use crate::errors::CatalogResult;
use crate::model::core::AnyEntity;
use crate::service::CatalogService;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Value};

/// Index fields with reserved names on the search API.
pub mod fields {
    /// Entity type name.
    pub const TYPE_NAME: &str = "__typeName";
    /// Entity lifecycle state (`ACTIVE` / `DELETED`).
    pub const STATE: &str = "__state";
    /// Entity GUID.
    pub const GUID: &str = "__guid";
    pub const NAME: &str = "name";
    pub const QUALIFIED_NAME: &str = "qualifiedName";
    pub const CERTIFICATE_STATUS: &str = "certificateStatus";
}

/// A single search query node.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Exact match on a field.
    Term { field: String, value: Value },
    /// Field starts with the given string.
    Prefix { field: String, value: String },
    /// Field matches a `*`/`?` wildcard pattern.
    Wildcard { field: String, pattern: String },
    /// Field is present and non-null.
    Exists { field: String },
    /// Numeric range on a field; either bound may be open.
    Range {
        field: String,
        gte: Option<Value>,
        lte: Option<Value>,
    },
    /// Boolean combination of sub-queries.
    Bool {
        must: Vec<Query>,
        should: Vec<Query>,
        must_not: Vec<Query>,
        filter: Vec<Query>,
    },
}

impl Query {
    pub fn term(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Query::Term {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn prefix(field: impl Into<String>, value: impl Into<String>) -> Self {
        Query::Prefix {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn wildcard(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Query::Wildcard {
            field: field.into(),
            pattern: pattern.into(),
        }
    }

    pub fn exists(field: impl Into<String>) -> Self {
        Query::Exists {
            field: field.into(),
        }
    }

    pub fn range(
        field: impl Into<String>,
        gte: Option<Value>,
        lte: Option<Value>,
    ) -> Self {
        Query::Range {
            field: field.into(),
            gte,
            lte,
        }
    }

    /// All of the given queries must match.
    pub fn and(queries: Vec<Query>) -> Self {
        Query::Bool {
            must: queries,
            should: Vec::new(),
            must_not: Vec::new(),
            filter: Vec::new(),
        }
    }

    /// At least one of the given queries must match.
    pub fn or(queries: Vec<Query>) -> Self {
        Query::Bool {
            must: Vec::new(),
            should: queries,
            must_not: Vec::new(),
            filter: Vec::new(),
        }
    }

    /// The given query must not match.
    pub fn not(query: Query) -> Self {
        Query::Bool {
            must: Vec::new(),
            should: Vec::new(),
            must_not: vec![query],
            filter: Vec::new(),
        }
    }

    /// Renders the query as the JSON the search endpoint expects.
    pub fn to_json(&self) -> Value {
        match self {
            Query::Term { field, value } => json!({ "term": { field: { "value": value } } }),
            Query::Prefix { field, value } => json!({ "prefix": { field: { "value": value } } }),
            Query::Wildcard { field, pattern } => {
                json!({ "wildcard": { field: { "value": pattern } } })
            }
            Query::Exists { field } => json!({ "exists": { "field": field } }),
            Query::Range { field, gte, lte } => {
                let mut bounds = serde_json::Map::new();
                if let Some(gte) = gte {
                    bounds.insert("gte".to_string(), gte.clone());
                }
                if let Some(lte) = lte {
                    bounds.insert("lte".to_string(), lte.clone());
                }
                json!({ "range": { field: bounds } })
            }
            Query::Bool {
                must,
                should,
                must_not,
                filter,
            } => {
                let mut clauses = serde_json::Map::new();
                let render =
                    |queries: &[Query]| -> Value { queries.iter().map(Query::to_json).collect() };
                if !must.is_empty() {
                    clauses.insert("must".to_string(), render(must));
                }
                if !should.is_empty() {
                    clauses.insert("should".to_string(), render(should));
                }
                if !must_not.is_empty() {
                    clauses.insert("must_not".to_string(), render(must_not));
                }
                if !filter.is_empty() {
                    clauses.insert("filter".to_string(), render(filter));
                }
                json!({ "bool": clauses })
            }
        }
    }
}

impl Serialize for Query {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}

/// The `dsl` block of an index-search request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSearchDsl {
    pub from: usize,
    pub size: usize,
    pub query: Query,
}

/// A request against the index-search endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub dsl: IndexSearchDsl,
    /// Attributes to return on each hit, beyond the identity fields.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,
}

/// A page of search results.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchResponse {
    /// Server-side estimate of the total number of hits.
    pub approximate_count: u64,
    pub entities: Vec<AnyEntity>,
}

const DEFAULT_PAGE_SIZE: usize = 20;

/// Fluent builder for the common search shapes.
///
/// ```
/// use strata_catalog::search::{fields, FluentSearch, Query};
///
/// let request = FluentSearch::new()
///     .of_type("Table")
///     .active_only()
///     .where_(Query::prefix(fields::QUALIFIED_NAME, "default/postgres/"))
///     .page_size(50)
///     .to_request();
/// assert_eq!(request.dsl.size, 50);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FluentSearch {
    wheres: Vec<Query>,
    where_nots: Vec<Query>,
    from: usize,
    size: usize,
    attributes: Vec<String>,
}

impl FluentSearch {
    pub fn new() -> Self {
        Self {
            size: DEFAULT_PAGE_SIZE,
            ..Default::default()
        }
    }

    /// Restricts results to a single asset type.
    pub fn of_type(self, type_name: impl Into<String>) -> Self {
        self.where_(Query::term(fields::TYPE_NAME, type_name.into()))
    }

    /// Excludes soft-deleted assets.
    pub fn active_only(self) -> Self {
        self.where_(Query::term(fields::STATE, "ACTIVE"))
    }

    pub fn where_(mut self, query: Query) -> Self {
        self.wheres.push(query);
        self
    }

    pub fn where_not(mut self, query: Query) -> Self {
        self.where_nots.push(query);
        self
    }

    pub fn page_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    pub fn starting_at(mut self, from: usize) -> Self {
        self.from = from;
        self
    }

    /// Advances to the next page of the same search.
    pub fn next_page(mut self) -> Self {
        self.from += self.size;
        self
    }

    /// Requests an extra attribute on each hit.
    pub fn include_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attributes.push(attribute.into());
        self
    }

    /// Lowers the builder into a request.
    pub fn to_request(&self) -> SearchRequest {
        SearchRequest {
            dsl: IndexSearchDsl {
                from: self.from,
                size: self.size,
                query: Query::Bool {
                    must: Vec::new(),
                    should: Vec::new(),
                    must_not: self.where_nots.clone(),
                    filter: self.wheres.clone(),
                },
            },
            attributes: self.attributes.clone(),
        }
    }

    /// Runs the search against the given service.
    pub async fn execute<S: CatalogService + ?Sized>(
        &self,
        service: &S,
    ) -> CatalogResult<SearchResponse> {
        service.search(self.to_request()).await
    }

    /// Returns only the approximate hit count, fetching no entities.
    pub async fn count<S: CatalogService + ?Sized>(&self, service: &S) -> CatalogResult<u64> {
        let mut request = self.to_request();
        request.dsl.size = 0;
        Ok(service.search(request).await?.approximate_count)
    }
}

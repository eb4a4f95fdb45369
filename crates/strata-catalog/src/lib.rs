//! # strata-catalog
//!
//! Typed Rust client for the Strata metadata catalog.
//!
//! The crate has three layers:
//!
//! - an asset model ([`model`]): typed records with builder-style
//!   construction, qualifiedName generation, and reference helpers;
//! - a service interface ([`service::CatalogService`]) with a live REST
//!   implementation ([`CatalogClient`]) and an in-memory one
//!   ([`MockCatalog`]);
//! - a search DSL ([`search`]) mirroring the service's index-search
//!   endpoint.
//!
//! ```no_run
//! use strata_catalog::{AuthConfig, CatalogClient, CatalogService, ClientConfig, Table};
//!
//! # async fn example() -> strata_catalog::CatalogResult<()> {
//! let client = CatalogClient::new(ClientConfig::new(
//!     "acme",
//!     "https://acme.strata.io",
//!     AuthConfig::ApiToken { token: "sk-...".into() },
//! ))?;
//!
//! let table = Table::creator("orders", "default/postgres/1699000000/sales/public")
//!     .with_description("Customer orders, one row per order")
//!     .into_any()?;
//! let response = client.save(table).await?;
//! println!("created: {:?}", response.first_created_guid());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod errors;
pub mod http;
pub mod mock;
pub mod model;
pub mod search;
pub mod secure_string;
pub mod service;
pub mod testing;

// Re-export the common surface.
pub use client::CatalogClient;
pub use config::{AuthConfig, ClientConfig};
pub use errors::{CatalogError, CatalogResult};
pub use mock::MockCatalog;
pub use model::{
    Announcement, AnnouncementType, AnyEntity, AssetRef, AssetType, CertificateStatus, Column,
    Connection, Dashboard, DashboardField, Database, Entity, EntityStatus, Glossary,
    GlossaryCategory, GlossaryTerm, Schema, TagAssignment, TermAssignment, Table, View,
};
pub use search::{FluentSearch, Query, SearchRequest, SearchResponse};
pub use secure_string::SecureString;
pub use service::{
    get_typed, get_typed_by_qualified_name, CatalogService, MutationResponse, ServiceHealth,
};

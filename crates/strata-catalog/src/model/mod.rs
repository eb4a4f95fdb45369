//! Typed asset model for the Strata catalog.
//!
//! Each asset family lives in its own module: relational assets under
//! [`connection`] through [`column`], BI assets under [`dashboard`], and
//! glossary assets under [`glossary`]. The shared envelope and value types
//! are in [`core`].

pub mod column;
pub mod connection;
pub mod core;
pub mod dashboard;
pub mod database;
pub mod glossary;
pub mod schema;
pub mod table;
pub mod view;

pub use column::{Column, ColumnAttributes};
pub use connection::{Connection, ConnectionAttributes};
pub use core::{
    child_qualified_name, parent_qualified_name, qualified_name_tail, validate_update_identity,
    Announcement, AnnouncementType, AnyEntity, AssetRef, AssetType, CertificateStatus,
    CommonAttributes, Entity, EntityStatus, TagAssignment, TermAssignment, UniqueAttributes,
};
pub use dashboard::{Dashboard, DashboardAttributes, DashboardField, DashboardFieldAttributes};
pub use database::{Database, DatabaseAttributes};
pub use glossary::{
    Glossary, GlossaryAttributes, GlossaryCategory, GlossaryCategoryAttributes, GlossaryTerm,
    GlossaryTermAttributes,
};
pub use schema::{Schema, SchemaAttributes};
pub use table::{Table, TableAttributes};
pub use view::{View, ViewAttributes};

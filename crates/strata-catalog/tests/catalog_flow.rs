//! End-to-end flows over the in-memory catalog: build a source hierarchy,
//! fetch it back typed, and run the governance mutations.

use strata_catalog::model::core::qualified_name_tail;
use strata_catalog::testing::{sample_column, sample_table};
use strata_catalog::{
    get_typed, get_typed_by_qualified_name, Announcement, AnnouncementType, CatalogError,
    CatalogService, CertificateStatus, Column, Connection, Database, Glossary, GlossaryTerm,
    MockCatalog, Schema, Table, TagAssignment, TermAssignment,
};

#[tokio::test]
async fn builds_and_reads_back_a_source_hierarchy() {
    let catalog = MockCatalog::new("flow-test");

    let connection = Connection::creator("warehouse", "postgres");
    let connection_qn = connection.qualified_name().unwrap().to_string();
    catalog.save(connection.into_any().unwrap()).await.unwrap();

    let database = Database::creator("sales", &connection_qn);
    let database_qn = database.qualified_name().unwrap().to_string();
    catalog.save(database.into_any().unwrap()).await.unwrap();

    let schema = Schema::creator("public", &database_qn);
    let schema_qn = schema.qualified_name().unwrap().to_string();
    catalog.save(schema.into_any().unwrap()).await.unwrap();

    let table = Table::creator("orders", &schema_qn)
        .with_row_count(42)
        .with_column(Column::ref_by_qualified_name(format!(
            "{}/orders/order_id",
            schema_qn
        )));
    let table_qn = table.qualified_name().unwrap().to_string();
    let response = catalog.save(table.into_any().unwrap()).await.unwrap();
    assert_eq!(response.mutated_entities.create.len(), 1);

    let table: Table = get_typed_by_qualified_name(&catalog, &table_qn)
        .await
        .unwrap();
    assert_eq!(table.name(), Some("orders"));
    assert_eq!(table.attributes.row_count, Some(42));
    assert_eq!(
        table.attributes.schema_qualified_name.as_deref(),
        Some(schema_qn.as_str())
    );
    assert_eq!(table.attributes.columns.len(), 1);

    // The same entity, fetched by GUID this time.
    let guid = table.guid.clone().unwrap();
    let by_guid: Table = get_typed(&catalog, &guid).await.unwrap();
    assert_eq!(by_guid.qualified_name(), Some(table_qn.as_str()));
}

#[tokio::test]
async fn typed_get_rejects_wrong_type() {
    let catalog = MockCatalog::new("narrowing-test");

    let table = sample_table("orders");
    let table_qn = table.qualified_name().unwrap().to_string();
    catalog.save(table.into_any().unwrap()).await.unwrap();

    let guid = catalog
        .get_by_qualified_name("Table", &table_qn)
        .await
        .unwrap()
        .guid
        .unwrap();

    match get_typed::<strata_catalog::model::ColumnAttributes, _>(&catalog, &guid).await {
        Err(CatalogError::TypeMismatch {
            expected, actual, ..
        }) => {
            assert_eq!(expected, "Column");
            assert_eq!(actual, "Table");
        }
        other => panic!("Expected TypeMismatch, got {:?}", other),
    }

    // Absence helpers treat a mismatch like a miss.
    let err =
        get_typed::<strata_catalog::model::ColumnAttributes, _>(&catalog, &guid).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn governance_mutations_round_trip() {
    let catalog = MockCatalog::new("governance-test");

    let table = sample_table("payments");
    let qn = table.qualified_name().unwrap().to_string();
    catalog.save(table.into_any().unwrap()).await.unwrap();

    // Glossary + term, then assign the term to the table.
    let glossary = Glossary::creator("Finance");
    catalog.save(glossary.into_any().unwrap()).await.unwrap();
    let glossary_guid = catalog
        .get_by_qualified_name("Glossary", "finance")
        .await
        .unwrap()
        .guid
        .unwrap();

    let term = GlossaryTerm::creator("Settlement", &glossary_guid);
    let term_guid = catalog
        .save(term.into_any().unwrap())
        .await
        .unwrap()
        .mutated_entities
        .create[0]
        .guid
        .clone();

    catalog
        .append_terms("Table", &qn, vec![TermAssignment::new(&term_guid)])
        .await
        .unwrap();

    catalog
        .add_tags("Table", &qn, vec![TagAssignment::new("Sensitive")])
        .await
        .unwrap();

    catalog
        .update_certificate(
            "Table",
            &qn,
            "payments",
            CertificateStatus::Draft,
            Some("Pending review".to_string()),
        )
        .await
        .unwrap();

    catalog
        .update_announcement(
            "Table",
            &qn,
            "payments",
            Announcement::new(AnnouncementType::Information, "New owner", "Now owned by FinData"),
        )
        .await
        .unwrap();

    let entity = catalog.get_by_qualified_name("Table", &qn).await.unwrap();
    assert_eq!(entity.meanings.len(), 1);
    assert_eq!(entity.meanings[0].term_guid, term_guid);
    assert_eq!(entity.classifications[0].type_name, "Sensitive");
    assert_eq!(entity.attr_str("certificateStatus"), Some("DRAFT"));
    assert_eq!(entity.attr_str("announcementTitle"), Some("New owner"));
}

#[tokio::test]
async fn update_validation_fires_before_any_network_effect() {
    let catalog = MockCatalog::new("validation-test");

    // Nothing saved yet, but identity validation must trip first: a missing
    // name errors as InvalidRequest, not NotFound.
    let err = catalog
        .update_certificate("Table", "default/x/1/db/sch/t", "", CertificateStatus::Verified, None)
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::InvalidRequest(_)));

    let err = catalog
        .remove_announcement("Table", "", "t")
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::InvalidRequest(_)));
}

#[tokio::test]
async fn column_creator_matches_saved_hierarchy() {
    let catalog = MockCatalog::new("column-test");

    let table = sample_table("orders");
    let table_qn = table.qualified_name().unwrap().to_string();
    catalog.save(table.into_any().unwrap()).await.unwrap();

    let column = sample_column("order_id", "orders", 1).with_is_primary(true);
    assert_eq!(
        column.attributes.table_qualified_name.as_deref(),
        Some(table_qn.as_str())
    );
    assert_eq!(
        qualified_name_tail(column.qualified_name().unwrap()),
        Some("order_id")
    );

    catalog.save(column.into_any().unwrap()).await.unwrap();
    let column: Column =
        get_typed_by_qualified_name(&catalog, &format!("{}/order_id", table_qn))
            .await
            .unwrap();
    assert_eq!(column.attributes.is_primary, Some(true));
    assert_eq!(column.attributes.order, Some(1));
}

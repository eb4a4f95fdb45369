//! Search flows over the in-memory catalog: paging, counting, and the
//! richer query nodes.

use serde_json::json;
use strata_catalog::search::{fields, FluentSearch, Query};
use strata_catalog::testing::SAMPLE_SCHEMA_QN;
use strata_catalog::{CatalogService, MockCatalog, Table};

async fn seeded() -> MockCatalog {
    let catalog = MockCatalog::new("search-test");
    for (name, rows) in [("orders", 1_000), ("customers", 250), ("payments", 9_000)] {
        let table = Table::creator(name, SAMPLE_SCHEMA_QN)
            .with_row_count(rows)
            .into_any()
            .unwrap();
        catalog.save(table).await.unwrap();
    }
    catalog
}

#[tokio::test]
async fn count_without_fetching_entities() {
    let catalog = seeded().await;

    let count = FluentSearch::new()
        .of_type("Table")
        .count(&catalog)
        .await
        .unwrap();
    assert_eq!(count, 3);
}

#[tokio::test]
async fn range_query_filters_on_row_count() {
    let catalog = seeded().await;

    let response = FluentSearch::new()
        .of_type("Table")
        .where_(Query::range("rowCount", Some(json!(500)), None))
        .execute(&catalog)
        .await
        .unwrap();

    let mut names: Vec<&str> = response
        .entities
        .iter()
        .filter_map(|e| e.attr_str("name"))
        .collect();
    names.sort_unstable();
    assert_eq!(names, vec!["orders", "payments"]);
}

#[tokio::test]
async fn exists_and_negation() {
    let catalog = seeded().await;

    // None of the seeded tables carries a certificate.
    let certified = FluentSearch::new()
        .of_type("Table")
        .where_(Query::exists(fields::CERTIFICATE_STATUS))
        .count(&catalog)
        .await
        .unwrap();
    assert_eq!(certified, 0);

    let uncertified = FluentSearch::new()
        .of_type("Table")
        .where_not(Query::exists(fields::CERTIFICATE_STATUS))
        .count(&catalog)
        .await
        .unwrap();
    assert_eq!(uncertified, 3);
}

#[tokio::test]
async fn prefix_narrows_to_connection_subtree() {
    let catalog = seeded().await;

    // Seed a lookalike under a different connection.
    let other = Table::creator("orders", "default/snowflake/1700000000/sales/public")
        .into_any()
        .unwrap();
    catalog.save(other).await.unwrap();

    let all_orders = FluentSearch::new()
        .where_(Query::term(fields::NAME, "orders"))
        .count(&catalog)
        .await
        .unwrap();
    assert_eq!(all_orders, 2);

    let postgres_only = FluentSearch::new()
        .where_(Query::term(fields::NAME, "orders"))
        .where_(Query::prefix(fields::QUALIFIED_NAME, "default/postgres/"))
        .count(&catalog)
        .await
        .unwrap();
    assert_eq!(postgres_only, 1);
}

#[tokio::test]
async fn paging_walks_the_full_result_set() {
    let catalog = seeded().await;

    let mut search = FluentSearch::new().of_type("Table").page_size(1);
    let mut seen = Vec::new();

    loop {
        let page = search.execute(&catalog).await.unwrap();
        if page.entities.is_empty() {
            break;
        }
        for entity in &page.entities {
            seen.push(entity.attr_str("name").unwrap().to_string());
        }
        search = search.next_page();
    }

    seen.sort_unstable();
    assert_eq!(seen, vec!["customers", "orders", "payments"]);
}

#[tokio::test]
async fn soft_deleted_assets_drop_out_of_active_searches() {
    let catalog = seeded().await;

    let guid = catalog
        .get_by_qualified_name("Table", &format!("{}/orders", SAMPLE_SCHEMA_QN))
        .await
        .unwrap()
        .guid
        .unwrap();
    catalog.delete_by_guid(&guid).await.unwrap();

    let active = FluentSearch::new()
        .of_type("Table")
        .active_only()
        .count(&catalog)
        .await
        .unwrap();
    assert_eq!(active, 2);

    // Without the state filter the soft-deleted row is still indexed.
    let all = FluentSearch::new()
        .of_type("Table")
        .count(&catalog)
        .await
        .unwrap();
    assert_eq!(all, 3);
}

//! End-to-end production tests against a real SQLite database.

use std::collections::HashMap;

use stockplan_core::{CoreError, ErrorKind, NewProduct, NewRawMaterial, Product, RawMaterial};
use stockplan_db::{Database, DbConfig, DbError};

// =============================================================================
// Fixtures
// =============================================================================

async fn memory_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

async fn add_product(db: &Database, name: &str, price_cents: i64) -> Product {
    db.products()
        .insert(&NewProduct {
            name: name.to_string(),
            description: None,
            price_cents,
            stock_quantity: 0,
        })
        .await
        .unwrap()
}

async fn add_material(db: &Database, name: &str, stock: i64) -> RawMaterial {
    db.raw_materials()
        .insert(&NewRawMaterial {
            name: name.to_string(),
            description: None,
            price_cents: 100,
            stock_quantity: stock,
            unit: None,
        })
        .await
        .unwrap()
}

async fn link(db: &Database, product: &Product, material: &RawMaterial, needed: i64) {
    db.products()
        .add_raw_material(&product.id, &material.id, needed)
        .await
        .unwrap();
}

async fn material_stock(db: &Database, id: &str) -> i64 {
    db.raw_materials()
        .get_by_id(id)
        .await
        .unwrap()
        .unwrap()
        .stock_quantity
}

async fn product_stock(db: &Database, id: &str) -> i64 {
    db.products()
        .get_by_id(id)
        .await
        .unwrap()
        .unwrap()
        .stock_quantity
}

/// Product P (price 100.00) needing 5 of R (stock 100).
async fn scenario_a() -> (Database, Product, RawMaterial) {
    let db = memory_db().await;
    let p = add_product(&db, "Table", 10_000).await;
    let r = add_material(&db, "Plank", 100).await;
    link(&db, &p, &r, 5).await;
    (db, p, r)
}

// =============================================================================
// Suggestions
// =============================================================================

#[tokio::test]
async fn test_scenario_a_single_product_suggestion() {
    let (db, p, _) = scenario_a().await;

    let list = db.production().suggestions().await.unwrap();

    assert_eq!(list.products.len(), 1);
    let suggestion = &list.products[0];
    assert_eq!(suggestion.product_id, p.id);
    assert_eq!(suggestion.product_name, "Table");
    assert_eq!(suggestion.quantity_possible, 20);
    assert_eq!(suggestion.unit_price.cents(), 10_000);
    assert_eq!(suggestion.total_value.cents(), 200_000);
    assert_eq!(list.grand_total_value.cents(), 200_000);
}

#[tokio::test]
async fn test_scenario_c_unlinked_product_excluded_and_unsettleable() {
    let (db, p, _) = scenario_a().await;
    let lonely = add_product(&db, "Lamp", 99_000).await;

    let list = db.production().suggestions().await.unwrap();
    assert!(list.get(&lonely.id).is_none());
    assert!(list.get(&p.id).is_some());

    let err = db.production().settle(&lonely.id, 1).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert!(matches!(
        err,
        DbError::Core(CoreError::NoRawMaterialsLinked { .. })
    ));
}

#[tokio::test]
async fn test_scenario_d_shared_material_goes_to_higher_price() {
    let db = memory_db().await;
    let cheap = add_product(&db, "Stool", 5_000).await;
    let pricey = add_product(&db, "Cabinet", 30_000).await;
    let wood = add_material(&db, "Wood", 10).await;
    link(&db, &cheap, &wood, 2).await;
    link(&db, &pricey, &wood, 3).await;

    let list = db.production().suggestions().await.unwrap();

    // 10 / 3 = 3 cabinets, leaving 1 wood: no stool fits
    assert_eq!(list.products.len(), 1);
    assert_eq!(list.products[0].product_id, pricey.id);
    assert_eq!(list.products[0].quantity_possible, 3);
    assert_eq!(list.grand_total_value.cents(), 90_000);
}

#[tokio::test]
async fn test_scenario_d_partial_leftover_for_lower_priority() {
    let db = memory_db().await;
    let cheap = add_product(&db, "Stool", 5_000).await;
    let pricey = add_product(&db, "Cabinet", 30_000).await;
    let wood = add_material(&db, "Wood", 11).await;
    link(&db, &cheap, &wood, 2).await;
    link(&db, &pricey, &wood, 3).await;

    let list = db.production().suggestions().await.unwrap();

    // 3 cabinets use 9, the remaining 2 make one stool
    assert_eq!(list.products.len(), 2);
    assert_eq!(list.products[0].product_id, pricey.id);
    assert_eq!(list.products[1].product_id, cheap.id);
    assert_eq!(list.products[1].quantity_possible, 1);
    assert_eq!(list.grand_total_value.cents(), 95_000);
}

#[tokio::test]
async fn test_equal_prices_break_ties_by_id() {
    let db = memory_db().await;
    let a = add_product(&db, "Chair A", 7_000).await;
    let b = add_product(&db, "Chair B", 7_000).await;
    let seat = add_material(&db, "Seat", 1).await;
    link(&db, &a, &seat, 1).await;
    link(&db, &b, &seat, 1).await;

    let list = db.production().suggestions().await.unwrap();

    let expected = if a.id < b.id { &a.id } else { &b.id };
    assert_eq!(list.products.len(), 1);
    assert_eq!(&list.products[0].product_id, expected);
}

#[tokio::test]
async fn test_suggestions_are_read_only_and_repeatable() {
    let (db, p, r) = scenario_a().await;

    let first = db.production().suggestions().await.unwrap();
    let second = db.production().suggestions().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(material_stock(&db, &r.id).await, 100);
    assert_eq!(product_stock(&db, &p.id).await, 0);
}

#[tokio::test]
async fn test_suggestions_on_empty_database() {
    let db = memory_db().await;

    let list = db.production().suggestions().await.unwrap();

    assert!(list.is_empty());
    assert!(list.grand_total_value.is_zero());
}

#[tokio::test]
async fn test_invalid_line_skipped_by_suggestions_rejected_by_settle() {
    let (db, p, _) = scenario_a().await;
    let broken = add_product(&db, "Broken", 50_000).await;
    let glue = add_material(&db, "Glue", 10).await;

    // Bypasses entry-time validation, as a legacy import would
    sqlx::query(
        "INSERT INTO product_raw_materials (id, product_id, raw_material_id, quantity_needed) \
         VALUES ('bad-line', ?1, ?2, 0)",
    )
    .bind(&broken.id)
    .bind(&glue.id)
    .execute(db.pool())
    .await
    .unwrap();

    let list = db.production().suggestions().await.unwrap();
    assert!(list.get(&broken.id).is_none());
    assert_eq!(list.get(&p.id).unwrap().quantity_possible, 20);

    let err = db.production().settle(&broken.id, 1).await.unwrap_err();
    assert!(matches!(
        err,
        DbError::Core(CoreError::InvalidComposition { .. })
    ));
    assert_eq!(material_stock(&db, &glue.id).await, 10);
}

// =============================================================================
// Settlement
// =============================================================================

#[tokio::test]
async fn test_scenario_b_settle_one_unit() {
    let (db, p, r) = scenario_a().await;
    let before = product_stock(&db, &p.id).await;

    let result = db.production().settle(&p.id, 1).await.unwrap();

    assert_eq!(result.product_id, p.id);
    assert_eq!(result.quantity_requested, 1);
    assert_eq!(result.quantity_created, 1);
    assert_eq!(result.max_quantity_possible, 20);
    assert_eq!(result.new_product_stock_quantity, before + 1);
    assert_eq!(product_stock(&db, &p.id).await, before + 1);
    assert_eq!(material_stock(&db, &r.id).await, 95);
}

#[tokio::test]
async fn test_over_request_is_clamped() {
    let (db, p, r) = scenario_a().await;

    let result = db.production().settle(&p.id, 25).await.unwrap();

    assert_eq!(result.quantity_requested, 25);
    assert_eq!(result.quantity_created, 20);
    assert_eq!(result.max_quantity_possible, 20);
    assert!(result.quantity_created < result.quantity_requested);
    assert_eq!(material_stock(&db, &r.id).await, 0);

    // Exhausted: the next request is an InvalidState, and nothing moves
    let err = db.production().settle(&p.id, 1).await.unwrap_err();
    assert!(matches!(
        err,
        DbError::Core(CoreError::InsufficientRawMaterials { .. })
    ));
    assert_eq!(product_stock(&db, &p.id).await, 20);
}

#[tokio::test]
async fn test_settlement_deducts_every_line() {
    let db = memory_db().await;
    let desk = add_product(&db, "Desk", 40_000).await;
    let top = add_material(&db, "Top", 7).await;
    let leg = add_material(&db, "Leg", 30).await;
    let screw = add_material(&db, "Screw", 100).await;
    link(&db, &desk, &top, 1).await;
    link(&db, &desk, &leg, 4).await;
    link(&db, &desk, &screw, 16).await;

    // max = min(7/1, 30/4, 100/16) = min(7, 7, 6) = 6
    let result = db.production().settle(&desk.id, 10).await.unwrap();

    assert_eq!(result.max_quantity_possible, 6);
    assert_eq!(result.quantity_created, 6);
    assert_eq!(material_stock(&db, &top.id).await, 1);
    assert_eq!(material_stock(&db, &leg.id).await, 6);
    assert_eq!(material_stock(&db, &screw.id).await, 4);
}

#[tokio::test]
async fn test_settle_errors_change_nothing() {
    let (db, p, r) = scenario_a().await;

    let err = db.production().settle("does-not-exist", 1).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = db.production().settle("", 1).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    for bad in [0, -3] {
        let err = db.production().settle(&p.id, bad).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    assert_eq!(material_stock(&db, &r.id).await, 100);
    assert_eq!(product_stock(&db, &p.id).await, 0);
}

#[tokio::test]
async fn test_conservation_and_non_negativity_over_many_settlements() {
    let db = memory_db().await;
    let a = add_product(&db, "A", 9_000).await;
    let b = add_product(&db, "B", 3_000).await;
    let shared = add_material(&db, "Shared", 57).await;
    let only_b = add_material(&db, "Only B", 13).await;
    link(&db, &a, &shared, 4).await;
    link(&db, &b, &shared, 3).await;
    link(&db, &b, &only_b, 2).await;

    let requests = [(&a, 3), (&b, 5), (&a, 10), (&b, 2), (&b, 9), (&a, 1)];
    for (product, qty) in requests {
        let before: HashMap<String, i64> = [
            (shared.id.clone(), material_stock(&db, &shared.id).await),
            (only_b.id.clone(), material_stock(&db, &only_b.id).await),
        ]
        .into_iter()
        .collect();

        let Ok(result) = db.production().settle(&product.id, qty).await else {
            continue;
        };

        assert!(result.quantity_created <= qty);
        assert!(result.quantity_created <= result.max_quantity_possible);

        for line in db.products().materials(&product.id).await.unwrap() {
            let used = line.quantity_needed * result.quantity_created;
            assert!(used <= before[&line.raw_material_id]);
            assert_eq!(
                line.raw_material_stock,
                before[&line.raw_material_id] - used
            );
        }
    }

    for material in db.raw_materials().list(None).await.unwrap() {
        assert!(material.stock_quantity >= 0);
    }
    for product in db.products().list(None).await.unwrap() {
        assert!(product.stock_quantity >= 0);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_settlements_never_oversell() {
    let (db, p, r) = scenario_a().await;

    let mut handles = Vec::new();
    for _ in 0..30 {
        let db = db.clone();
        let id = p.id.clone();
        handles.push(tokio::spawn(
            async move { db.production().settle(&id, 1).await },
        ));
    }

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(result) => created += result.quantity_created,
            Err(err) => assert!(matches!(
                err,
                DbError::Core(CoreError::InsufficientRawMaterials { .. })
            )),
        }
    }

    assert_eq!(created, 20);
    assert_eq!(material_stock(&db, &r.id).await, 0);
    assert_eq!(product_stock(&db, &p.id).await, 20);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_two_handles_on_one_file_conserve_stock() {
    let path = std::env::temp_dir().join(format!("stockplan-{}.db", uuid::Uuid::new_v4()));

    // Separate Database values have separate gates, like two processes
    let first = Database::new(DbConfig::new(&path).settle_attempts(5))
        .await
        .unwrap();
    let second = Database::new(DbConfig::new(&path).settle_attempts(5))
        .await
        .unwrap();

    let p = add_product(&first, "Table", 10_000).await;
    let r = add_material(&first, "Plank", 100).await;
    link(&first, &p, &r, 5).await;

    let mut handles = Vec::new();
    for n in 0..16 {
        let db = if n % 2 == 0 { first.clone() } else { second.clone() };
        let id = p.id.clone();
        handles.push(tokio::spawn(
            async move { db.production().settle(&id, 2).await },
        ));
    }

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(result) => created += result.quantity_created,
            Err(err) => assert!(
                matches!(
                    err.kind(),
                    ErrorKind::ConcurrencyConflict | ErrorKind::InvalidState
                ),
                "unexpected error: {err}"
            ),
        }
    }

    let plank_left = material_stock(&first, &r.id).await;
    assert!(created <= 20);
    assert_eq!(plank_left, 100 - created * 5);
    assert_eq!(product_stock(&first, &p.id).await, created);

    first.close().await;
    second.close().await;
    let _ = std::fs::remove_file(&path);
    let _ = std::fs::remove_file(path.with_extension("db-wal"));
    let _ = std::fs::remove_file(path.with_extension("db-shm"));
}

// =============================================================================
// Plan Confirmation
// =============================================================================

#[tokio::test]
async fn test_confirm_commits_suggestion_list() {
    let db = memory_db().await;
    let cheap = add_product(&db, "Stool", 5_000).await;
    let pricey = add_product(&db, "Cabinet", 30_000).await;
    let wood = add_material(&db, "Wood", 11).await;
    let nails = add_material(&db, "Nails", 50).await;
    link(&db, &cheap, &wood, 2).await;
    link(&db, &pricey, &wood, 3).await;
    link(&db, &pricey, &nails, 4).await;

    let expected = db.production().suggestions().await.unwrap();
    let committed = db.production().confirm_suggestions().await.unwrap();

    assert_eq!(committed, expected);
    assert_eq!(product_stock(&db, &pricey.id).await, 3);
    assert_eq!(product_stock(&db, &cheap.id).await, 1);
    assert_eq!(material_stock(&db, &wood.id).await, 0);
    assert_eq!(material_stock(&db, &nails.id).await, 38);

    // Nothing left to allocate
    let again = db.production().confirm_suggestions().await.unwrap();
    assert!(again.is_empty());
    assert_eq!(product_stock(&db, &pricey.id).await, 3);
}

// =============================================================================
// Collaborators
// =============================================================================

#[tokio::test]
async fn test_duplicate_bom_line_rejected() {
    let (db, p, r) = scenario_a().await;

    let err = db
        .products()
        .add_raw_material(&p.id, &r.id, 2)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(db.products().materials(&p.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_deleting_product_cascades_bom_lines() {
    let (db, p, r) = scenario_a().await;

    db.products().delete(&p.id).await.unwrap();

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product_raw_materials")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(remaining, 0);

    // Now unreferenced, the raw material can go too
    db.raw_materials().delete(&r.id).await.unwrap();
}

#[tokio::test]
async fn test_raw_material_in_use_cannot_be_deleted() {
    let (db, _, r) = scenario_a().await;

    let err = db.raw_materials().delete(&r.id).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(material_stock(&db, &r.id).await, 100);
}

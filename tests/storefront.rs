//! Sequence allocation, pricing and settings against a scratch store.
//! Run: cargo test --test storefront

use printlab_server::DbService;
use printlab_server::db::models::{
    FileRef, NewOrder, NewOrderItem, OrderStatus, SettingUpsert,
};
use printlab_server::db::repository::{
    order as order_repo, pricing, sequence, setting as setting_repo,
};
use tempfile::TempDir;

async fn setup() -> (TempDir, DbService) {
    let tmp = tempfile::tempdir().unwrap();
    let db = DbService::new(&tmp.path().join("test.db").to_string_lossy())
        .await
        .unwrap();
    (tmp, db)
}

fn order_payload(files: Vec<FileRef>) -> NewOrder {
    NewOrder {
        customer_name: "Jane Customer".into(),
        customer_first_name: Some("Jane".into()),
        customer_last_name: Some("Customer".into()),
        customer_phone: "+100200300".into(),
        customer_email: "jane@example.com".into(),
        delivery_method: "PICKUP".into(),
        notes: None,
        items: vec![NewOrderItem {
            item_type: "PRINT".into(),
            name: "10x15 prints".into(),
            print_size_id: None,
            quantity: 2,
            price: 12.0,
            subtotal: 24.0,
            options: None,
            files,
        }],
    }
}

// ========== Sequence allocation ==========

#[tokio::test]
async fn allocations_are_unique_and_strictly_increasing() {
    let (_tmp, db) = setup().await;

    let mut previous = None;
    for _ in 0..50 {
        let number: i64 = sequence::next_order_number(&db.pool)
            .await
            .unwrap()
            .parse()
            .unwrap();
        if let Some(prev) = previous {
            assert!(number > prev, "{number} should exceed {prev}");
        }
        previous = Some(number);
    }
}

#[tokio::test]
async fn counter_bootstraps_at_the_starting_value() {
    let (_tmp, db) = setup().await;

    assert_eq!(sequence::next_order_number(&db.pool).await.unwrap(), "10001");
    assert_eq!(sequence::next_order_number(&db.pool).await.unwrap(), "10002");
}

#[tokio::test]
async fn allocate_degrades_to_timestamp_id_when_storage_is_gone() {
    let (_tmp, db) = setup().await;
    db.pool.close().await;

    let number = sequence::allocate(&db.pool).await;
    assert!(number.starts_with("REC-"), "got {number}");
}

// ========== Pricing ==========

#[tokio::test]
async fn unit_price_picks_the_highest_reached_tier() {
    let (_tmp, db) = setup().await;

    // Seeded 9x13 ladder: 1 -> 10.00, 100 -> 9.00, 200 -> 8.00
    assert_eq!(pricing::unit_price(&db.pool, 1, 50).await.unwrap(), 10.00);
    assert_eq!(pricing::unit_price(&db.pool, 1, 100).await.unwrap(), 9.00);
    assert_eq!(pricing::unit_price(&db.pool, 1, 150).await.unwrap(), 9.00);
    assert_eq!(pricing::unit_price(&db.pool, 1, 200).await.unwrap(), 8.00);
    assert_eq!(pricing::unit_price(&db.pool, 1, 5000).await.unwrap(), 8.00);
}

#[tokio::test]
async fn unit_price_for_unknown_size_is_not_found() {
    let (_tmp, db) = setup().await;
    assert!(pricing::unit_price(&db.pool, 999, 10).await.is_err());
}

#[tokio::test]
async fn catalog_lists_active_sizes_cheapest_first() {
    let (_tmp, db) = setup().await;

    let catalog = pricing::catalog(&db.pool).await.unwrap();
    assert_eq!(catalog.sizes.len(), 5);
    assert_eq!(catalog.sizes[0].size.slug, "9x13");
    assert_eq!(catalog.sizes[0].discounts.len(), 3);
    assert_eq!(catalog.papers.len(), 2);
    assert_eq!(catalog.options.len(), 2);
}

// ========== Orders ==========

#[tokio::test]
async fn create_with_items_persists_items_and_file_claims() {
    let (_tmp, db) = setup().await;

    let files = vec![FileRef {
        original: "holiday.jpg".into(),
        server: "10001/abc123.jpg".into(),
    }];
    let order = order_repo::create_with_items(
        &db.pool,
        "10001",
        OrderStatus::Pending,
        &order_payload(files),
        24.0,
    )
    .await
    .unwrap();

    let items = order_repo::items_for_order(&db.pool, order.id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert!(items[0].files.contains("abc123.jpg"));

    assert!(order_repo::any_item_references_file(&db.pool, "abc123.jpg")
        .await
        .unwrap());
    assert!(!order_repo::any_item_references_file(&db.pool, "zzz999.jpg")
        .await
        .unwrap());
}

#[tokio::test]
async fn bulk_status_touches_only_the_listed_orders() {
    let (_tmp, db) = setup().await;

    let first = order_repo::create_with_items(
        &db.pool,
        "10001",
        OrderStatus::Pending,
        &order_payload(vec![]),
        24.0,
    )
    .await
    .unwrap();
    let second = order_repo::create_with_items(
        &db.pool,
        "10002",
        OrderStatus::Pending,
        &order_payload(vec![]),
        24.0,
    )
    .await
    .unwrap();

    let updated = order_repo::set_status_bulk(&db.pool, &[first.id], OrderStatus::Completed)
        .await
        .unwrap();
    assert_eq!(updated, 1);

    let first = order_repo::find_by_id(&db.pool, first.id).await.unwrap().unwrap();
    let second = order_repo::find_by_id(&db.pool, second.id).await.unwrap().unwrap();
    assert_eq!(first.status, "COMPLETED");
    assert_eq!(second.status, "PENDING");
}

#[tokio::test]
async fn reused_order_number_is_a_duplicate_error() {
    let (_tmp, db) = setup().await;

    order_repo::create_with_items(&db.pool, "10001", OrderStatus::Pending, &order_payload(vec![]), 24.0)
        .await
        .unwrap();
    let err = order_repo::create_with_items(&db.pool, "10001", OrderStatus::Pending, &order_payload(vec![]), 24.0)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        printlab_server::db::repository::RepoError::Duplicate(_)
    ));
}

#[tokio::test]
async fn set_status_on_missing_order_is_not_found() {
    let (_tmp, db) = setup().await;
    let err = order_repo::set_status(&db.pool, 4242, OrderStatus::Completed)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        printlab_server::db::repository::RepoError::NotFound(_)
    ));
}

#[tokio::test]
async fn order_stats_counts_by_status_and_sums_revenue() {
    let (_tmp, db) = setup().await;

    order_repo::create_with_items(&db.pool, "10001", OrderStatus::Pending, &order_payload(vec![]), 24.0)
        .await
        .unwrap();
    order_repo::create_with_items(&db.pool, "10002", OrderStatus::Completed, &order_payload(vec![]), 36.0)
        .await
        .unwrap();
    order_repo::create_with_items(&db.pool, "10003", OrderStatus::Cancelled, &order_payload(vec![]), 99.0)
        .await
        .unwrap();

    let stats = order_repo::stats(&db.pool).await.unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.cancelled, 1);
    // Cancelled orders do not count toward revenue
    assert_eq!(stats.total_revenue, 60.0);
    assert_eq!(stats.recent_orders, 3);
}

// ========== Settings ==========

#[tokio::test]
async fn settings_upsert_creates_then_updates() {
    let (_tmp, db) = setup().await;

    let created = setting_repo::upsert(
        &db.pool,
        &SettingUpsert {
            key: "maintenance_mode".into(),
            value: "off".into(),
            description: Some("Blocks checkout when on".into()),
        },
    )
    .await
    .unwrap();
    assert_eq!(created.value, "off");

    let updated = setting_repo::upsert(
        &db.pool,
        &SettingUpsert {
            key: "maintenance_mode".into(),
            value: "on".into(),
            description: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.value, "on");

    assert_eq!(setting_repo::find_all(&db.pool).await.unwrap().len(), 1);
}

#[tokio::test]
async fn settings_require_a_key() {
    let (_tmp, db) = setup().await;
    let err = setting_repo::upsert(
        &db.pool,
        &SettingUpsert {
            key: "".into(),
            value: "x".into(),
            description: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        printlab_server::db::repository::RepoError::Validation(_)
    ));
}

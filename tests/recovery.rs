//! Recovery job behavior against a scratch store and upload directory.
//! Run: cargo test --test recovery

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use printlab_server::db::models::{FileRef, NewOrder, NewOrderItem, OrderStatus};
use printlab_server::db::repository::order as order_repo;
use printlab_server::{DbService, RecoveryJob};
use tempfile::TempDir;

const HOUR: Duration = Duration::from_secs(60 * 60);

async fn setup() -> (TempDir, DbService, PathBuf) {
    let tmp = tempfile::tempdir().unwrap();
    let db = DbService::new(&tmp.path().join("test.db").to_string_lossy())
        .await
        .unwrap();
    let uploads = tmp.path().join("uploads");
    std::fs::create_dir_all(&uploads).unwrap();
    (tmp, db, uploads)
}

/// Write a dummy upload and pin its mtime to `now - age`
fn write_aged(dir: &Path, name: &str, now: SystemTime, age: Duration) {
    let path = dir.join(name);
    std::fs::write(&path, b"not really a jpeg").unwrap();
    let file = std::fs::OpenOptions::new().write(true).open(&path).unwrap();
    file.set_modified(now - age).unwrap();
}

async fn seed_counter(db: &DbService, value: i64) {
    sqlx::query("INSERT INTO order_sequence (id, current_value) VALUES (1, ?1)")
        .bind(value)
        .execute(&db.pool)
        .await
        .unwrap();
}

/// Persist an order whose single item claims `filename`
async fn claim_file(db: &DbService, order_number: &str, filename: &str) {
    let data = NewOrder {
        customer_name: "Jane Customer".into(),
        customer_first_name: None,
        customer_last_name: None,
        customer_phone: "+100200300".into(),
        customer_email: "jane@example.com".into(),
        delivery_method: "PICKUP".into(),
        notes: None,
        items: vec![NewOrderItem {
            item_type: "PRINT".into(),
            name: "10x15 prints".into(),
            print_size_id: None,
            quantity: 3,
            price: 12.0,
            subtotal: 36.0,
            options: None,
            files: vec![FileRef {
                original: "holiday.jpg".into(),
                server: format!("{order_number}/{filename}"),
            }],
        }],
    };
    order_repo::create_with_items(&db.pool, order_number, OrderStatus::Pending, &data, 36.0)
        .await
        .unwrap();
}

async fn order_count(db: &DbService) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(&db.pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn stale_unclaimed_file_is_recovered_into_a_new_order() {
    let (_tmp, db, uploads) = setup().await;
    seed_counter(&db, 10001).await;
    claim_file(&db, "9001", "b.jpg").await;

    let now = SystemTime::now();
    write_aged(&uploads, "a.jpg", now, 30 * HOUR);
    write_aged(&uploads, "b.jpg", now, 30 * HOUR);
    write_aged(&uploads, "c.jpg", now, HOUR);

    let job = RecoveryJob::new(db.pool.clone(), &uploads);
    let report = job.run_at(now).await.unwrap();

    assert_eq!(report.recovered, 1);
    assert_eq!(report.order_number.as_deref(), Some("10002"));
    assert!(report.failed.is_empty());

    // a.jpg moved into the order folder, the others untouched
    assert!(uploads.join("10002/a.jpg").exists());
    assert!(uploads.join("b.jpg").exists());
    assert!(uploads.join("c.jpg").exists());

    let order = order_repo::find_by_number(&db.pool, "10002")
        .await
        .unwrap()
        .expect("recovery order persisted");
    assert_eq!(order.status, "ON_HOLD");
    assert_eq!(order.customer_name, "SYSTEM RECOVERY");
    assert_eq!(order.total_amount, 0.0);

    let items = order_repo::items_for_order(&db.pool, order.id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].item_type, "RECOVERED");
    assert!(items[0].files.contains("10002/a.jpg"));
    assert!(items[0].options.contains("isRecovered"));
}

#[tokio::test]
async fn second_run_finds_nothing_to_do() {
    let (_tmp, db, uploads) = setup().await;
    seed_counter(&db, 10001).await;

    let now = SystemTime::now();
    write_aged(&uploads, "a.jpg", now, 30 * HOUR);

    let job = RecoveryJob::new(db.pool.clone(), &uploads);
    let first = job.run_at(now).await.unwrap();
    assert_eq!(first.recovered, 1);
    let orders_after_first = order_count(&db).await;

    let second = job.run_at(now).await.unwrap();
    assert_eq!(second.recovered, 0);
    assert!(second.order_number.is_none());
    assert_eq!(order_count(&db).await, orders_after_first);
}

#[tokio::test]
async fn file_exactly_at_threshold_is_left_alone() {
    let (_tmp, db, uploads) = setup().await;
    seed_counter(&db, 10001).await;

    let now = SystemTime::now();
    write_aged(&uploads, "edge.jpg", now, 24 * HOUR);

    let job = RecoveryJob::new(db.pool.clone(), &uploads);
    let report = job.run_at(now).await.unwrap();
    assert_eq!(report.recovered, 0);
    assert!(uploads.join("edge.jpg").exists());

    // One microsecond past the threshold it becomes a candidate
    let report = job
        .run_at(now + Duration::from_micros(1))
        .await
        .unwrap();
    assert_eq!(report.recovered, 1);
    assert!(!uploads.join("edge.jpg").exists());
}

#[tokio::test]
async fn claimed_file_is_never_moved_regardless_of_age() {
    let (_tmp, db, uploads) = setup().await;
    seed_counter(&db, 10001).await;
    claim_file(&db, "9001", "keep.jpg").await;

    let now = SystemTime::now();
    write_aged(&uploads, "keep.jpg", now, 500 * HOUR);

    let job = RecoveryJob::new(db.pool.clone(), &uploads);
    let report = job.run_at(now).await.unwrap();

    assert_eq!(report.recovered, 0);
    assert!(report.order_number.is_none());
    assert!(uploads.join("keep.jpg").exists());
    // Only the claiming order exists
    assert_eq!(order_count(&db).await, 1);
}

#[tokio::test]
async fn failed_move_is_reported_and_excluded_from_the_order() {
    let (_tmp, db, uploads) = setup().await;
    seed_counter(&db, 10001).await;

    let now = SystemTime::now();
    write_aged(&uploads, "a.jpg", now, 30 * HOUR);
    write_aged(&uploads, "b.jpg", now, 30 * HOUR);
    write_aged(&uploads, "x.jpg", now, 30 * HOUR);

    // Occupy the rename target with a directory so moving x.jpg fails
    std::fs::create_dir_all(uploads.join("10002/x.jpg")).unwrap();

    let job = RecoveryJob::new(db.pool.clone(), &uploads);
    let report = job.run_at(now).await.unwrap();

    assert_eq!(report.recovered, 2);
    assert_eq!(report.order_number.as_deref(), Some("10002"));
    assert_eq!(report.failed, vec!["x.jpg".to_string()]);

    let order = order_repo::find_by_number(&db.pool, "10002")
        .await
        .unwrap()
        .unwrap();
    let items = order_repo::items_for_order(&db.pool, order.id).await.unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|i| !i.files.contains("x.jpg")));
    // The failed file stays loose in the upload root
    assert!(uploads.join("x.jpg").is_file());
}

#[tokio::test]
async fn no_order_is_created_when_every_move_fails() {
    let (_tmp, db, uploads) = setup().await;
    seed_counter(&db, 10001).await;

    let now = SystemTime::now();
    write_aged(&uploads, "x.jpg", now, 30 * HOUR);
    std::fs::create_dir_all(uploads.join("10002/x.jpg")).unwrap();

    let job = RecoveryJob::new(db.pool.clone(), &uploads);
    let report = job.run_at(now).await.unwrap();

    assert_eq!(report.recovered, 0);
    assert_eq!(report.failed, vec!["x.jpg".to_string()]);
    assert_eq!(order_count(&db).await, 0);
}

#[tokio::test]
async fn persist_failure_is_fatal_but_files_stay_moved() {
    let (_tmp, db, uploads) = setup().await;
    seed_counter(&db, 10001).await;

    let now = SystemTime::now();
    write_aged(&uploads, "a.jpg", now, 30 * HOUR);

    // Break order persistence while leaving order_item intact, so the
    // claim check still works and the run only dies at PERSIST
    sqlx::query("DROP TABLE orders").execute(&db.pool).await.unwrap();

    let job = RecoveryJob::new(db.pool.clone(), &uploads);
    assert!(job.run_at(now).await.is_err());

    // The move is not rolled back; the file sits in the order folder
    assert!(uploads.join("10002/a.jpg").exists());
    assert!(!uploads.join("a.jpg").exists());
}

#[tokio::test]
async fn missing_upload_root_means_nothing_to_do() {
    let (_tmp, db, uploads) = setup().await;

    let job = RecoveryJob::new(db.pool.clone(), uploads.join("does-not-exist"));
    let report = job.run().await.unwrap();

    assert_eq!(report.recovered, 0);
    assert!(report.order_number.is_none());
    assert!(report.failed.is_empty());
    assert_eq!(order_count(&db).await, 0);
}

#[tokio::test]
async fn hidden_entries_and_order_folders_are_skipped() {
    let (_tmp, db, uploads) = setup().await;
    seed_counter(&db, 10001).await;

    let now = SystemTime::now();
    write_aged(&uploads, ".DS_Store", now, 100 * HOUR);
    std::fs::create_dir_all(uploads.join("9001")).unwrap();
    write_aged(&uploads.join("9001"), "claimed.jpg", now, 100 * HOUR);

    let job = RecoveryJob::new(db.pool.clone(), &uploads);
    let report = job.run_at(now).await.unwrap();

    assert_eq!(report.recovered, 0);
    assert!(uploads.join(".DS_Store").exists());
    assert!(uploads.join("9001/claimed.jpg").exists());
}

#[tokio::test]
async fn shortened_retention_is_honored() {
    let (_tmp, db, uploads) = setup().await;
    seed_counter(&db, 10001).await;

    let now = SystemTime::now();
    write_aged(&uploads, "fresh.jpg", now, 2 * HOUR);

    let job = RecoveryJob::new(db.pool.clone(), &uploads).with_retention(HOUR);
    let report = job.run_at(now).await.unwrap();
    assert_eq!(report.recovered, 1);
}

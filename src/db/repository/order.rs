//! Order Repository

use super::{RepoError, RepoResult};
use crate::db::models::{NewOrder, Order, OrderItem, OrderStatus};
use crate::utils::now_millis;
use serde::Serialize;
use sqlx::SqlitePool;

/// Create an order together with its items in one transaction.
pub async fn create_with_items(
    pool: &SqlitePool,
    order_number: &str,
    status: OrderStatus,
    data: &NewOrder,
    total_amount: f64,
) -> RepoResult<Order> {
    let now = now_millis();
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        "INSERT INTO orders (order_number, status, customer_name, customer_first_name, customer_last_name, \
         customer_phone, customer_email, delivery_method, total_amount, notes, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
    )
    .bind(order_number)
    .bind(status.as_str())
    .bind(&data.customer_name)
    .bind(&data.customer_first_name)
    .bind(&data.customer_last_name)
    .bind(&data.customer_phone)
    .bind(&data.customer_email)
    .bind(&data.delivery_method)
    .bind(total_amount)
    .bind(&data.notes)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    let order_id = result.last_insert_rowid();

    for item in &data.items {
        let options = match &item.options {
            Some(value) => value.to_string(),
            None => "{}".to_string(),
        };
        let files = serde_json::to_string(&item.files)
            .map_err(|e| RepoError::Validation(format!("Unserializable file refs: {e}")))?;

        sqlx::query(
            "INSERT INTO order_item (order_id, item_type, name, quantity, price, subtotal, options, files) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(order_id)
        .bind(&item.item_type)
        .bind(&item.name)
        .bind(item.quantity)
        .bind(item.price)
        .bind(item.subtotal)
        .bind(options)
        .bind(files)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    find_by_id(pool, order_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to read order back after insert".into()))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(order)
}

pub async fn find_by_number(pool: &SqlitePool, order_number: &str) -> RepoResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE order_number = ?1")
        .bind(order_number)
        .fetch_optional(pool)
        .await?;
    Ok(order)
}

pub async fn items_for_order(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<OrderItem>> {
    let items = sqlx::query_as::<_, OrderItem>(
        "SELECT * FROM order_item WHERE order_id = ?1 ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(items)
}

/// Textual containment probe over `order_item.files`.
///
/// This is deliberately a substring match (`instr`), mirroring how the
/// claim check has always behaved: any item whose serialized `files`
/// column mentions the filename claims the stored file, regardless of
/// the owning order's status.
pub async fn any_item_references_file(pool: &SqlitePool, filename: &str) -> RepoResult<bool> {
    let exists = sqlx::query_scalar::<_, i64>(
        "SELECT EXISTS(SELECT 1 FROM order_item WHERE instr(files, ?1) > 0)",
    )
    .bind(filename)
    .fetch_one(pool)
    .await?;
    Ok(exists != 0)
}

/// Set one order's status
pub async fn set_status(pool: &SqlitePool, id: i64, status: OrderStatus) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE orders SET status = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(status.as_str())
        .bind(now_millis())
        .bind(id)
        .execute(pool)
        .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Order {} not found", id)));
    }
    Ok(())
}

/// Set many orders' status; returns the number of rows touched
pub async fn set_status_bulk(
    pool: &SqlitePool,
    ids: &[i64],
    status: OrderStatus,
) -> RepoResult<u64> {
    if ids.is_empty() {
        return Ok(0);
    }

    // Dynamic query: variable number of IN placeholders
    let placeholders = ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
    let sql = format!(
        "UPDATE orders SET status = ?, updated_at = ? WHERE id IN ({placeholders})"
    );
    let mut query = sqlx::query(&sql).bind(status.as_str()).bind(now_millis());
    for id in ids {
        query = query.bind(id);
    }
    let rows = query.execute(pool).await?;
    Ok(rows.rows_affected())
}

/// Per-status order counts plus revenue, for the operator dashboard
#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    pub draft: i64,
    pub pending: i64,
    pub processing: i64,
    pub completed: i64,
    pub cancelled: i64,
    pub on_hold: i64,
    pub total: i64,
    pub recent_orders: i64,
    pub total_revenue: f64,
}

pub async fn stats(pool: &SqlitePool) -> RepoResult<OrderStats> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        "SELECT status, COUNT(*) FROM orders GROUP BY status",
    )
    .fetch_all(pool)
    .await?;

    let mut out = OrderStats::default();
    for (status, count) in rows {
        out.total += count;
        match status.as_str() {
            "DRAFT" => out.draft = count,
            "PENDING" => out.pending = count,
            "PROCESSING" => out.processing = count,
            "COMPLETED" => out.completed = count,
            "CANCELLED" => out.cancelled = count,
            "ON_HOLD" => out.on_hold = count,
            _ => {}
        }
    }

    let week_ago = now_millis() - 7 * 24 * 60 * 60 * 1000;
    out.recent_orders = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM orders WHERE created_at >= ?1 AND status != 'DRAFT'",
    )
    .bind(week_ago)
    .fetch_one(pool)
    .await?;

    out.total_revenue = sqlx::query_scalar::<_, f64>(
        "SELECT COALESCE(SUM(total_amount), 0.0) FROM orders WHERE status IN ('PENDING', 'PROCESSING', 'COMPLETED')",
    )
    .fetch_one(pool)
    .await?;

    Ok(out)
}

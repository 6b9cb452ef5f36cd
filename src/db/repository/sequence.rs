//! Order Sequence Repository (Singleton)
//!
//! A single counter row hands out every order number. Incrementing is one
//! atomic `UPDATE ... RETURNING` statement — never a separate read + write —
//! so two concurrent allocations can never observe the same value.

use super::RepoResult;
use crate::utils::now_millis;
use sqlx::SqlitePool;

const SINGLETON_ID: i64 = 1;

/// Value the counter is created with on first use. The first allocation
/// ever returns this value; subsequent allocations increment from it.
pub const SEQUENCE_START: i64 = 10001;

async fn try_increment(pool: &SqlitePool) -> RepoResult<Option<i64>> {
    let value = sqlx::query_scalar::<_, i64>(
        "UPDATE order_sequence SET current_value = current_value + 1 WHERE id = ?1 RETURNING current_value",
    )
    .bind(SINGLETON_ID)
    .fetch_optional(pool)
    .await?;
    Ok(value)
}

/// Atomically increment the counter and return the new order number.
///
/// Creates the counter row at [`SEQUENCE_START`] if it does not exist yet.
pub async fn next_order_number(pool: &SqlitePool) -> RepoResult<String> {
    if let Some(value) = try_increment(pool).await? {
        return Ok(value.to_string());
    }

    // No counter row yet. INSERT OR IGNORE so a concurrent bootstrap
    // cannot create a second row; whoever loses the race increments
    // the winner's row instead.
    let inserted = sqlx::query("INSERT OR IGNORE INTO order_sequence (id, current_value) VALUES (?1, ?2)")
        .bind(SINGLETON_ID)
        .bind(SEQUENCE_START)
        .execute(pool)
        .await?;

    if inserted.rows_affected() == 1 {
        return Ok(SEQUENCE_START.to_string());
    }

    match try_increment(pool).await? {
        Some(value) => Ok(value.to_string()),
        None => Err(super::RepoError::Database(
            "order_sequence row vanished during bootstrap".into(),
        )),
    }
}

/// Allocate an order number, degrading to a timestamp-derived identifier
/// when the counter storage is unreachable.
///
/// The `REC-` prefix keeps fallback identifiers distinguishable from
/// normal sequence numbers. This path trades the uniqueness guarantee for
/// availability and is logged as degraded, not as a silent success.
pub async fn allocate(pool: &SqlitePool) -> String {
    match next_order_number(pool).await {
        Ok(number) => number,
        Err(e) => {
            let fallback = format!("REC-{}", now_millis());
            tracing::warn!(
                error = %e,
                fallback = %fallback,
                "Sequence counter unreachable, using timestamp-derived order number"
            );
            fallback
        }
    }
}

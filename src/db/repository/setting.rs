//! Settings Repository

use super::{RepoError, RepoResult};
use crate::db::models::{Setting, SettingUpsert};
use sqlx::SqlitePool;

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Setting>> {
    let settings = sqlx::query_as::<_, Setting>("SELECT * FROM setting ORDER BY key")
        .fetch_all(pool)
        .await?;
    Ok(settings)
}

pub async fn get(pool: &SqlitePool, key: &str) -> RepoResult<Option<Setting>> {
    let setting = sqlx::query_as::<_, Setting>("SELECT * FROM setting WHERE key = ?1")
        .bind(key)
        .fetch_optional(pool)
        .await?;
    Ok(setting)
}

pub async fn upsert(pool: &SqlitePool, data: &SettingUpsert) -> RepoResult<Setting> {
    if data.key.is_empty() {
        return Err(RepoError::Validation("Key is required".into()));
    }

    sqlx::query(
        "INSERT INTO setting (key, value, description) VALUES (?1, ?2, ?3) \
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, description = excluded.description",
    )
    .bind(&data.key)
    .bind(&data.value)
    .bind(&data.description)
    .execute(pool)
    .await?;

    get(pool, &data.key)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to read setting back after upsert".into()))
}

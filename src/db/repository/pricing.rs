//! Print Catalog Repository

use super::{RepoError, RepoResult};
use crate::db::models::{
    PaperType, PrintOption, PrintSize, PrintSizeWithDiscounts, ProductCatalog, VolumeDiscount,
};
use sqlx::SqlitePool;

/// Everything the storefront configurator needs: active sizes with their
/// discount ladders, papers and options.
pub async fn catalog(pool: &SqlitePool) -> RepoResult<ProductCatalog> {
    let sizes = sqlx::query_as::<_, PrintSize>(
        "SELECT * FROM print_size WHERE is_active = 1 ORDER BY base_price",
    )
    .fetch_all(pool)
    .await?;

    let mut with_discounts = Vec::with_capacity(sizes.len());
    for size in sizes {
        let discounts = discounts_for_size(pool, size.id).await?;
        with_discounts.push(PrintSizeWithDiscounts { size, discounts });
    }

    let papers = sqlx::query_as::<_, PaperType>(
        "SELECT * FROM paper_type WHERE is_active = 1 ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    let options = sqlx::query_as::<_, PrintOption>(
        "SELECT * FROM print_option WHERE is_active = 1 ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(ProductCatalog {
        sizes: with_discounts,
        papers,
        options,
    })
}

pub async fn discounts_for_size(
    pool: &SqlitePool,
    print_size_id: i64,
) -> RepoResult<Vec<VolumeDiscount>> {
    let discounts = sqlx::query_as::<_, VolumeDiscount>(
        "SELECT * FROM volume_discount WHERE print_size_id = ?1 ORDER BY min_quantity",
    )
    .bind(print_size_id)
    .fetch_all(pool)
    .await?;
    Ok(discounts)
}

/// Unit price for a (size, quantity) pair: the highest discount tier whose
/// `min_quantity` the quantity reaches, falling back to the base price.
pub async fn unit_price(pool: &SqlitePool, print_size_id: i64, quantity: i64) -> RepoResult<f64> {
    let tier = sqlx::query_scalar::<_, f64>(
        "SELECT price FROM volume_discount \
         WHERE print_size_id = ?1 AND min_quantity <= ?2 \
         ORDER BY min_quantity DESC LIMIT 1",
    )
    .bind(print_size_id)
    .bind(quantity)
    .fetch_optional(pool)
    .await?;

    if let Some(price) = tier {
        return Ok(price);
    }

    let base = sqlx::query_scalar::<_, f64>("SELECT base_price FROM print_size WHERE id = ?1")
        .bind(print_size_id)
        .fetch_optional(pool)
        .await?;

    base.ok_or_else(|| RepoError::NotFound(format!("Print size {} not found", print_size_id)))
}

//! Print catalog models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Print size row (a product, e.g. 10x15)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PrintSize {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub base_price: f64,
    pub sort_order: i64,
    pub is_active: bool,
}

/// Per-size volume price: applies when quantity >= min_quantity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct VolumeDiscount {
    pub id: i64,
    pub print_size_id: i64,
    pub min_quantity: i64,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PaperType {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PrintOption {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub price: f64,
    pub price_type: String,
    pub is_active: bool,
}

/// A print size with its discount ladder, as served to the storefront
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintSizeWithDiscounts {
    #[serde(flatten)]
    pub size: PrintSize,
    pub discounts: Vec<VolumeDiscount>,
}

/// Everything the configurator page needs in one response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCatalog {
    pub sizes: Vec<PrintSizeWithDiscounts>,
    pub papers: Vec<PaperType>,
    pub options: Vec<PrintOption>,
}

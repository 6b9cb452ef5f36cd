//! Product Catalog Route

use axum::{Json, Router, extract::State, routing::get};

use crate::core::ServerState;
use crate::db::models::ProductCatalog;
use crate::db::repository::pricing;
use crate::utils::AppResult;

/// Active print sizes (with volume prices), papers and options
async fn list_products(State(state): State<ServerState>) -> AppResult<Json<ProductCatalog>> {
    let catalog = pricing::catalog(&state.db.pool).await?;
    Ok(Json(catalog))
}

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/products", get(list_products))
}

//! Order Routes
//!
//! Customer-facing: checkout and status lookup. Operator mutations live
//! under the admin module.

mod handler;

use axum::{
    Router,
    routing::post,
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/orders", post(handler::create))
        .route("/api/orders/status", post(handler::status_lookup))
}

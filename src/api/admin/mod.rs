//! Operator Panel Routes
//!
//! Cleanup trigger, order status management, settings and server
//! statistics. Authentication for this surface is handled upstream of the
//! application and is out of scope here.

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/admin", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/cleanup", post(handler::run_cleanup))
        .route("/orders/{id}/status", put(handler::set_order_status))
        .route("/orders/bulk-status", put(handler::bulk_order_status))
        .route("/orders/stats", get(handler::order_stats))
        .route("/settings", get(handler::list_settings).post(handler::save_setting))
        .route("/stats", get(handler::server_stats))
}

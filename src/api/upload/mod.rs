//! Upload Routes
//!
//! Photo upload plus serving of stored files, loose or inside an order
//! folder.

mod handler;

use axum::{
    Router,
    body::Bytes,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
};
use http::header;

use crate::core::ServerState;

/// Stored file response
enum StoredFileResponse {
    Ok(Bytes),
    NotFound,
    BadRequest(&'static str),
}

impl IntoResponse for StoredFileResponse {
    fn into_response(self) -> axum::response::Response {
        match self {
            StoredFileResponse::Ok(content) => (
                http::StatusCode::OK,
                [(header::CONTENT_TYPE, "image/jpeg")],
                content,
            )
                .into_response(),
            StoredFileResponse::NotFound => {
                (http::StatusCode::NOT_FOUND, "File not found").into_response()
            }
            StoredFileResponse::BadRequest(msg) => {
                (http::StatusCode::BAD_REQUEST, msg).into_response()
            }
        }
    }
}

/// Serve a stored upload. The path is either `<file>` (loose upload) or
/// `<orderNumber>/<file>` (claimed); anything deeper or traversal-shaped
/// is rejected.
async fn serve_stored_file(
    State(state): State<ServerState>,
    Path(path): Path<String>,
) -> StoredFileResponse {
    if path.is_empty()
        || path.contains("..")
        || path.contains('\\')
        || path.starts_with('/')
        || path.matches('/').count() > 1
    {
        return StoredFileResponse::BadRequest("Invalid file path");
    }

    let file_path = state.upload_root().join(&path);
    match tokio::fs::read(&file_path).await {
        Ok(content) => StoredFileResponse::Ok(content.into()),
        Err(e) => {
            tracing::debug!(path = %path, error = %e, "Stored file not found");
            StoredFileResponse::NotFound
        }
    }
}

/// Build upload router
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/upload", post(handler::upload))
        .route("/api/uploads/{*path}", get(serve_stored_file))
}

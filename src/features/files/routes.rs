use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::files::handlers::{
    delete_file, download_file, get_file, get_file_metadata, list_files, update_file, upload_file,
};
use crate::features::files::services::FileService;

/// Create routes for the files feature
pub fn routes(file_service: Arc<FileService>, upload_body_limit: usize) -> Router {
    Router::new()
        .route(
            "/api/files/upload",
            // Allow body size up to the configured max plus multipart overhead
            post(upload_file).layer(DefaultBodyLimit::max(upload_body_limit)),
        )
        .route("/api/files", get(list_files))
        .route(
            "/api/files/{id}",
            get(get_file).patch(update_file).delete(delete_file),
        )
        .route("/api/files/{id}/metadata", get(get_file_metadata))
        .route("/api/files/{id}/download", get(download_file))
        .with_state(file_service)
}

use axum::{Router, extract::DefaultBodyLimit, routing::post};
use std::sync::Arc;

use crate::server::AppState;

mod chat;
mod upload;

const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/upload",
            post(upload::upload_file).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/chat", post(chat::chat))
}

/// 同时挂载在根路径与 `/api` 下，前端页面使用后者
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(api_routes())
        .nest("/api", api_routes())
}

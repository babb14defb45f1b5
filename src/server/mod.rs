pub mod chat_request;
pub mod handlers;
pub(crate) mod request_logging;
pub mod streaming;
pub(crate) mod util;

use crate::config::Settings;
use crate::error::Result as AppResult;
use crate::providers::CozeClient;
use axum::Router;
use std::sync::Arc;

/// 进程级只读状态：启动后不再修改
#[derive(Clone)]
pub struct AppState {
    pub config: Settings,
    pub coze: CozeClient,
}

pub async fn create_app(config: Settings) -> AppResult<Router> {
    let coze = CozeClient::new(&config.coze)?;

    tracing::info!(
        "Coze bot {} via {} (key {})",
        config.coze.bot_id,
        config.coze.base_url,
        util::mask_key(&config.coze.api_key)
    );

    let static_dir = config.server.static_dir.clone();
    let app_state = AppState { config, coze };

    let mut app = handlers::routes().with_state(Arc::new(app_state));

    // 其余路径交给静态页面（index.html 位于根目录）
    if let Some(dir) = static_dir {
        tracing::info!("Serving static files from {}", dir);
        app = app.fallback_service(tower_http::services::ServeDir::new(dir));
    }

    // CORS：浏览器页面可能来自任意来源
    use axum::http::{Method, header};
    use tower_http::cors::{Any, CorsLayer};
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(Any);
    app = app
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http());

    Ok(app)
}

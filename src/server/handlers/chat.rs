use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use chrono::Utc;
use std::sync::Arc;

use crate::error::RelayError;
use crate::server::AppState;
use crate::server::chat_request::ChatRequest;
use crate::server::request_logging::log_chat_request;
use crate::server::streaming::{ChatAnswer, assemble_answer};

pub async fn chat(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatAnswer>, RelayError> {
    let start_time = Utc::now();
    // 请求体不合法时同样以 400 + {error} 返回
    let Json(request) = payload.map_err(|e| RelayError::Validation(e.body_text()))?;
    let user_id = request.user_id(&app_state.config.coze.default_user_id);
    let has_image = request.file_id.is_some();
    tracing::info!(
        "Received chat request: query={:?} user={} file_id={:?}",
        request.query,
        user_id,
        request.file_id
    );

    let result = relay_chat(&app_state, &request, user_id).await;
    log_chat_request(start_time, user_id, has_image, &result);
    result.map(Json)
}

async fn relay_chat(
    app_state: &AppState,
    request: &ChatRequest,
    user_id: &str,
) -> Result<ChatAnswer, RelayError> {
    let prompt = request.prompt()?;
    let messages = request.to_messages()?;

    let raw = app_state
        .coze
        .send_chat(&app_state.config.coze.bot_id, user_id, &messages)
        .await?;
    tracing::debug!("Stream finished. Response length: {}", raw.len());

    Ok(assemble_answer(&raw, prompt))
}

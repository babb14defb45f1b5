use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("{0}")]
    Validation(String),

    #[error("Multipart error: {0}")]
    Multipart(String),

    /// 上游返回非 2xx：状态码与原始文本原样回传给调用方
    #[error("Coze API error ({status}): {body}")]
    Upstream { status: StatusCode, body: String },

    /// 上游 HTTP 200 但信封中 code 非零
    #[error("Coze Upload Failed: {msg} (code {code})")]
    UpstreamRejected { code: i64, msg: String },
}

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::Validation(_) | RelayError::Multipart(_) => StatusCode::BAD_REQUEST,
            RelayError::Upstream { status, .. } => *status,
            RelayError::Http(_)
            | RelayError::Json(_)
            | RelayError::Io(_)
            | RelayError::Config(_)
            | RelayError::UpstreamRejected { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            RelayError::Upstream { body, .. } => {
                tracing::error!("Coze API error: {} {}", status.as_u16(), body);
                (status, body).into_response()
            }
            other => {
                if status.is_server_error() {
                    tracing::error!("Request failed: {}", other);
                } else {
                    tracing::warn!("Rejected request: {}", other);
                }
                let body = serde_json::json!({ "error": other.to_string() });
                (status, Json(body)).into_response()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;

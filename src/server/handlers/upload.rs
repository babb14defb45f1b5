use axum::{
    Json,
    extract::{Multipart, State},
};
use chrono::Utc;
use std::sync::Arc;

use crate::error::RelayError;
use crate::providers::coze::UploadedFile;
use crate::server::AppState;
use crate::server::request_logging::log_upload_request;

struct IncomingFile {
    filename: String,
    content_type: String,
    bytes: Vec<u8>,
}

async fn read_file_field(mut multipart: Multipart) -> Result<Option<IncomingFile>, RelayError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| RelayError::Multipart(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| RelayError::Multipart(e.body_text()))?;
        return Ok(Some(IncomingFile {
            filename,
            content_type,
            bytes: bytes.to_vec(),
        }));
    }
    Ok(None)
}

pub async fn upload_file(
    State(app_state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<UploadedFile>, RelayError> {
    let start_time = Utc::now();
    let file = read_file_field(multipart)
        .await?
        .ok_or_else(|| RelayError::Validation("No file uploaded".to_string()))?;

    let size = file.bytes.len();
    tracing::info!("Received file upload: {} {} bytes", file.filename, size);

    let result = app_state
        .coze
        .upload_file(file.bytes, &file.filename, &file.content_type)
        .await
        .map_err(|e| match e {
            // 上传失败统一以 500 + {error} 返回，不透传上游状态
            RelayError::Upstream { status, body } => RelayError::UpstreamRejected {
                code: i64::from(status.as_u16()),
                msg: body,
            },
            other => other,
        });

    log_upload_request(start_time, &file.filename, size, &result);
    result.map(Json)
}

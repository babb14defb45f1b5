use chrono::{DateTime, Utc};

use crate::error::RelayError;
use crate::providers::coze::UploadedFile;
use crate::server::streaming::ChatAnswer;

// 记录一次聊天转发的结果（耗时、事件数、回答长度）
pub fn log_chat_request(
    start_time: DateTime<Utc>,
    user_id: &str,
    has_image: bool,
    result: &Result<ChatAnswer, RelayError>,
) {
    let response_time_ms = (Utc::now() - start_time).num_milliseconds();
    match result {
        Ok(answer) => tracing::info!(
            user_id,
            has_image,
            events = answer.events.len(),
            answer_len = answer.answer.chars().count(),
            response_time_ms,
            "chat relayed"
        ),
        Err(e) => tracing::error!(
            user_id,
            has_image,
            status = e.status_code().as_u16(),
            response_time_ms,
            "chat relay failed: {}",
            e
        ),
    }
}

pub fn log_upload_request(
    start_time: DateTime<Utc>,
    filename: &str,
    size: usize,
    result: &Result<UploadedFile, RelayError>,
) {
    let response_time_ms = (Utc::now() - start_time).num_milliseconds();
    match result {
        Ok(file) => tracing::info!(
            filename,
            size,
            file_id = file.file_id.as_str(),
            response_time_ms,
            "file uploaded"
        ),
        Err(e) => tracing::error!(
            filename,
            size,
            response_time_ms,
            "file upload failed: {}",
            e
        ),
    }
}

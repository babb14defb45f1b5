use reqwest::multipart::{Form, Part};

use crate::config::CozeConfig;
use crate::error::RelayError;
use crate::http_client::client_for_url;

use super::types::{ChatRequestBody, Envelope, FileObject, UploadedFile, UpstreamMessage};

/// Coze 开放平台客户端：文件上传 + 流式对话。
///
/// 只发起一次请求，不做重试；对话响应体整体读取后再交给解码器。
#[derive(Debug, Clone)]
pub struct CozeClient {
    http: reqwest::Client,
    api_key: String,
    upload_url: String,
    chat_url: String,
}

impl CozeClient {
    pub fn new(config: &CozeConfig) -> Result<Self, RelayError> {
        let upload_url = config.upload_url();
        let chat_url = config.chat_url();
        Ok(Self {
            http: client_for_url(&chat_url)?,
            api_key: config.api_key.clone(),
            upload_url,
            chat_url,
        })
    }

    pub async fn upload_file(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        mime_type: &str,
    ) -> Result<UploadedFile, RelayError> {
        let mime = if mime_type.trim().is_empty() {
            "application/octet-stream"
        } else {
            mime_type
        };
        let part = Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(mime)?;
        let form = Form::new().part("file", part);

        tracing::info!("Uploading to Coze... {}", self.upload_url);
        let resp = self
            .http
            .post(&self.upload_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(RelayError::Upstream { status, body });
        }
        tracing::debug!("Coze upload response: {}", body);

        let envelope: Envelope<FileObject> = serde_json::from_str(&body)?;
        if envelope.code != 0 {
            return Err(RelayError::UpstreamRejected {
                code: envelope.code,
                msg: envelope.msg,
            });
        }
        envelope
            .data
            .map(UploadedFile::from)
            .ok_or(RelayError::UpstreamRejected {
                code: envelope.code,
                msg: "response is missing file data".to_string(),
            })
    }

    /// 请求流式对话并返回完整的 SSE 文本
    pub async fn send_chat(
        &self,
        bot_id: &str,
        user_id: &str,
        messages: &[UpstreamMessage],
    ) -> Result<String, RelayError> {
        let body = ChatRequestBody {
            bot_id,
            user_id,
            additional_messages: messages,
            stream: true,
            auto_save_history: true,
        };

        let resp = self
            .http
            .post(&self.chat_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("Accept", "text/event-stream")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RelayError::Upstream { status, body });
        }

        Ok(resp.text().await?)
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Text,
    ObjectString,
}

/// `object_string` 消息内容中的单个片段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentPart {
    Text { text: String },
    Image { file_id: String },
}

/// 发往 Coze 的一轮用户消息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamMessage {
    pub role: String,
    pub content_type: ContentType,
    pub content: String,
}

impl UpstreamMessage {
    pub fn text(query: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content_type: ContentType::Text,
            content: query.into(),
        }
    }

    /// 图文混合消息：content 为 JSON 编码后的片段数组
    pub fn with_image(
        query: impl Into<String>,
        file_id: impl Into<String>,
    ) -> Result<Self, serde_json::Error> {
        let parts = [
            ContentPart::Text { text: query.into() },
            ContentPart::Image {
                file_id: file_id.into(),
            },
        ];
        Ok(Self {
            role: "user".to_string(),
            content_type: ContentType::ObjectString,
            content: serde_json::to_string(&parts)?,
        })
    }
}

/// `POST /v3/chat` 请求体
#[derive(Debug, Serialize)]
pub struct ChatRequestBody<'a> {
    pub bot_id: &'a str,
    pub user_id: &'a str,
    pub additional_messages: &'a [UpstreamMessage],
    pub stream: bool,
    pub auto_save_history: bool,
}

/// Coze 通用响应信封 `{code, msg, data}`
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    pub data: Option<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileObject {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// 返回给浏览器的上传结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub file_id: String,
    pub url: String,
}

impl From<FileObject> for UploadedFile {
    fn from(f: FileObject) -> Self {
        Self {
            file_id: f.id,
            url: f.url.unwrap_or_default(),
        }
    }
}

use serde::Deserialize;

use crate::error::RelayError;
use crate::providers::coze::UpstreamMessage;

const DEFAULT_IMAGE_PROMPT: &str = "Analyze this image";

/// 浏览器发来的聊天请求。
///
/// Notes:
/// - `query` 必填；仅当附带 `file_id` 时允许为空，此时使用默认的看图提示语。
/// - `user` 缺省时使用配置中的默认用户，会话历史由 Coze 按用户保存。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub file_id: Option<String>,
}

impl ChatRequest {
    fn file_id(&self) -> Option<&str> {
        self.file_id.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// 实际发送给上游的提问文本
    pub fn prompt(&self) -> Result<&str, RelayError> {
        match (self.query.as_deref(), self.file_id()) {
            (Some(q), _) if !q.trim().is_empty() => Ok(q),
            (_, Some(_)) => Ok(DEFAULT_IMAGE_PROMPT),
            _ => Err(RelayError::Validation("query is required".to_string())),
        }
    }

    pub fn user_id<'a>(&'a self, default_user: &'a str) -> &'a str {
        self.user
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(default_user)
    }

    /// 有图片时构造图文混合消息，否则为纯文本消息
    pub fn to_messages(&self) -> Result<Vec<UpstreamMessage>, RelayError> {
        let prompt = self.prompt()?;
        let message = match self.file_id() {
            Some(file_id) => UpstreamMessage::with_image(prompt, file_id)?,
            None => UpstreamMessage::text(prompt),
        };
        Ok(vec![message])
    }
}

pub(crate) mod common;
pub mod coze;

use serde::{Deserialize, Serialize};

use crate::providers::streaming::SseEvent;

pub use coze::{AnswerAssembler, NO_RESPONSE, assemble_answer, detect_error_envelope};

/// `/chat` 的响应：最终回答 + 解码出的事件（仅供调试）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatAnswer {
    pub answer: String,
    pub events: Vec<SseEvent>,
}

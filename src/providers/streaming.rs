use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 一条已解码的 SSE 记录：`event:` 行给出的类型 + `data:` 行解析出的 JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SseEvent {
    pub event: String,
    pub data: Value,
}

impl SseEvent {
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    /// `data.type`，缺失或非字符串时为 None
    pub fn payload_type(&self) -> Option<&str> {
        self.data.get("type").and_then(Value::as_str)
    }

    pub fn content(&self) -> Option<&str> {
        self.data.get("content").and_then(Value::as_str)
    }
}

/// 逐行 SSE 解码器。
///
/// 当前事件类型在遇到下一条 `event:` 之前一直有效，会附着到其后的每条 `data:` 上。
/// 无法解析为 JSON 的 `data:` 行（心跳、空行等）直接丢弃，不会中断解码。
#[derive(Debug, Default)]
pub struct SseDecoder {
    current_event: String,
    events: Vec<SseEvent>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed_line(&mut self, line: &str) {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("event:") {
            self.current_event = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix("data:") {
            let raw = rest.trim();
            match serde_json::from_str::<Value>(raw) {
                Ok(data) => self
                    .events
                    .push(SseEvent::new(self.current_event.clone(), data)),
                Err(e) => {
                    tracing::debug!("Skipping undecodable SSE data line ({}): {:?}", e, raw);
                }
            }
        }
    }

    pub fn finish(self) -> Vec<SseEvent> {
        self.events
    }
}

pub fn decode_events(text: &str) -> Vec<SseEvent> {
    let mut decoder = SseDecoder::new();
    for line in text.lines() {
        decoder.feed_line(line);
    }
    decoder.finish()
}

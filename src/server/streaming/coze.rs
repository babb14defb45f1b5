use serde_json::Value;

use crate::providers::streaming::{SseEvent, decode_events};

use super::ChatAnswer;
use super::common::{chat_failed_notice, demo_mode_notice};

pub const EVENT_MESSAGE_DELTA: &str = "conversation.message.delta";
pub const EVENT_MESSAGE_COMPLETED: &str = "conversation.message.completed";
pub const EVENT_CHAT_FAILED: &str = "conversation.chat.failed";

pub const NO_RESPONSE: &str = "No response generated";

const UNKNOWN_CODE: &str = "unknown";

/// 上游 code 字段：数值 0、`"0"`、空串、null、false 视为成功，其余一律按错误处理。
/// 返回用于展示的错误码文本。
fn error_code(v: &Value) -> Option<String> {
    match v {
        Value::Null | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if matches!(s.trim(), "" | "0") => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// `last_error` 存在即视为失败，除非其 code 明确为 0；缺失的 code 记为 unknown
fn failed_code(last_error: &Value) -> Option<String> {
    if last_error.is_null() {
        return None;
    }
    match last_error.get("code") {
        None | Some(Value::Null) => Some(UNKNOWN_CODE.to_string()),
        Some(code) => error_code(code),
    }
}

fn msg_text(v: Option<&Value>) -> String {
    match v {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// 响应体整体是 `{"code": 非零, "msg": ...}` 时返回 (code, msg)
pub fn detect_error_envelope(raw: &str) -> Option<(String, String)> {
    let trimmed = raw.trim();
    if !trimmed.starts_with('{') {
        return None;
    }
    let v: Value = serde_json::from_str(trimmed).ok()?;
    let code = v.get("code").and_then(error_code)?;
    Some((code, msg_text(v.get("msg"))))
}

#[derive(Debug)]
enum AnswerState {
    Accumulating(String),
    /// 失败事件优先于已累积的增量，之后的增量不再拼接
    Failed(String),
}

/// 按事件顺序把增量/完成/失败事件折叠成最终回答
#[derive(Debug)]
pub struct AnswerAssembler {
    state: AnswerState,
}

impl Default for AnswerAssembler {
    fn default() -> Self {
        Self {
            state: AnswerState::Accumulating(String::new()),
        }
    }
}

impl AnswerAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, ev: &SseEvent) {
        match ev.event.as_str() {
            EVENT_MESSAGE_DELTA => {
                if let AnswerState::Accumulating(acc) = &mut self.state
                    && ev.payload_type() == Some("answer")
                    && let Some(content) = ev.content()
                {
                    acc.push_str(content);
                }
            }
            EVENT_MESSAGE_COMPLETED => {
                // 完成事件会重述整条消息，仅在没有收到任何增量时兜底
                if let AnswerState::Accumulating(acc) = &mut self.state
                    && acc.is_empty()
                    && ev.payload_type() == Some("answer")
                {
                    *acc = ev.content().unwrap_or_default().to_string();
                }
            }
            EVENT_CHAT_FAILED => {
                if let Some(last_error) = ev.data.get("last_error")
                    && let Some(code) = failed_code(last_error)
                {
                    let msg = msg_text(last_error.get("msg"));
                    tracing::warn!("Coze chat failed: code={} msg={}", code, msg);
                    self.state = AnswerState::Failed(chat_failed_notice(&code, &msg));
                }
            }
            _ => {}
        }
    }

    pub fn finish(self) -> String {
        match self.state {
            AnswerState::Failed(notice) => notice,
            AnswerState::Accumulating(acc) if acc.is_empty() => NO_RESPONSE.to_string(),
            AnswerState::Accumulating(acc) => acc,
        }
    }
}

/// 原始响应体 -> 最终回答。
///
/// 整体 JSON 错误信封直接转成演示模式提示，不再解码 SSE。
pub fn assemble_answer(raw: &str, query: &str) -> ChatAnswer {
    if let Some((code, msg)) = detect_error_envelope(raw) {
        tracing::error!("Coze API error response: code={} msg={}", code, msg);
        return ChatAnswer {
            answer: demo_mode_notice(&code, &msg, query),
            events: Vec::new(),
        };
    }

    let events = decode_events(raw);
    let mut assembler = AnswerAssembler::new();
    for ev in &events {
        assembler.apply(ev);
    }
    ChatAnswer {
        answer: assembler.finish(),
        events,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta(content: &str) -> String {
        format!(
            "event: conversation.message.delta\ndata: {{\"role\":\"assistant\",\"type\":\"answer\",\"content\":\"{}\"}}\n\n",
            content
        )
    }

    fn completed(kind: &str, content: &str) -> String {
        format!(
            "event: conversation.message.completed\ndata: {{\"role\":\"assistant\",\"type\":\"{}\",\"content\":\"{}\"}}\n\n",
            kind, content
        )
    }

    const FAILED: &str = "event: conversation.chat.failed\ndata: {\"last_error\":{\"code\":4101,\"msg\":\"insufficient balance\"}}\n\n";

    #[test]
    fn deltas_concatenate_in_order() {
        let raw = "event: conversation.message.delta\ndata: {\"type\":\"answer\",\"content\":\"Hel\"}\nevent: conversation.message.delta\ndata: {\"type\":\"answer\",\"content\":\"lo\"}";
        let out = assemble_answer(raw, "q");
        assert_eq!(out.answer, "Hello");
        assert_eq!(out.events.len(), 2);
    }

    #[test]
    fn completed_after_deltas_is_not_duplicated() {
        let raw = [
            delta("你好"),
            delta("，世界"),
            completed("answer", "你好，世界"),
        ]
        .concat();
        assert_eq!(assemble_answer(&raw, "q").answer, "你好，世界");
    }

    #[test]
    fn completed_used_when_no_deltas() {
        let raw = [
            completed("verbose", "{\\\"msg_type\\\":\\\"generate_answer_finish\\\"}"),
            completed("answer", "full text"),
            completed("follow_up", "ask more?"),
        ]
        .concat();
        assert_eq!(assemble_answer(&raw, "q").answer, "full text");
    }

    #[test]
    fn non_answer_deltas_are_ignored() {
        let raw = concat!(
            "event: conversation.message.delta\n",
            "data: {\"type\":\"function_call\",\"content\":\"{}\"}\n\n",
            "event: conversation.message.delta\n",
            "data: {\"content\":\"untyped\"}\n\n",
            "event: conversation.message.delta\n",
            "data: {\"type\":\"answer\",\"content\":\"kept\"}\n\n",
        );
        assert_eq!(assemble_answer(raw, "q").answer, "kept");
    }

    #[test]
    fn failure_overrides_partial_deltas() {
        let raw = [delta("partial "), delta("answer"), FAILED.to_string()].concat();
        let answer = assemble_answer(&raw, "q").answer;
        assert!(answer.contains("4101"));
        assert!(answer.contains("insufficient balance"));
        assert!(!answer.contains("partial"));
    }

    #[test]
    fn failure_wins_over_later_deltas() {
        let raw = [FAILED.to_string(), delta("late"), completed("answer", "late")].concat();
        let answer = assemble_answer(&raw, "q").answer;
        assert!(answer.contains("4101"));
        assert!(!answer.contains("late"));
    }

    #[test]
    fn failure_with_zero_code_is_ignored() {
        let raw = [
            delta("fine"),
            "event: conversation.chat.failed\ndata: {\"last_error\":{\"code\":0,\"msg\":\"\"}}\n\n"
                .to_string(),
        ]
        .concat();
        assert_eq!(assemble_answer(&raw, "q").answer, "fine");
    }

    #[test]
    fn failed_event_only() {
        let raw = "event: conversation.chat.failed\ndata: {\"last_error\":{\"code\":4101,\"msg\":\"insufficient balance\"}}";
        let answer = assemble_answer(raw, "q").answer;
        assert!(answer.contains("4101"));
        assert!(answer.contains("insufficient balance"));
    }

    #[test]
    fn empty_stream_falls_back() {
        assert_eq!(assemble_answer("", "q").answer, NO_RESPONSE);
        let raw = "event: conversation.chat.created\ndata: {\"id\":\"1\"}\n\nevent: done\ndata: \"[DONE]\"\n";
        let out = assemble_answer(raw, "q");
        assert_eq!(out.answer, NO_RESPONSE);
        assert_eq!(out.events.len(), 2);
    }

    #[test]
    fn malformed_data_lines_do_not_affect_answer() {
        let raw = [
            delta("a"),
            "event: conversation.message.delta\ndata: {\"type\":\"answer\",\n\n".to_string(),
            "data: \n".to_string(),
            delta("b"),
        ]
        .concat();
        let out = assemble_answer(&raw, "q");
        assert_eq!(out.answer, "ab");
        assert_eq!(out.events.len(), 2);
    }

    #[test]
    fn json_error_body_bypasses_decoding() {
        let raw = "  {\"code\":4100,\"msg\":\"authentication is invalid\"}\n";
        let out = assemble_answer(raw, "如何选电容");
        assert!(out.answer.contains("4100"));
        assert!(out.answer.contains("authentication is invalid"));
        assert!(out.answer.contains("如何选电容"));
        assert!(out.events.is_empty());
    }

    #[test]
    fn json_body_with_zero_code_goes_to_sse_path() {
        assert_eq!(detect_error_envelope("{\"code\":0,\"msg\":\"\"}"), None);
        assert_eq!(
            assemble_answer("{\"code\":0,\"msg\":\"\"}", "q").answer,
            NO_RESPONSE
        );
    }

    #[test]
    fn envelope_detection_edge_cases() {
        assert_eq!(detect_error_envelope("event: x\ndata: {}"), None);
        assert_eq!(detect_error_envelope("{broken"), None);
        assert_eq!(detect_error_envelope("{\"msg\":\"no code\"}"), None);
        assert_eq!(
            detect_error_envelope("{\"code\":\"4000\",\"msg\":\"bad\"}"),
            Some(("4000".to_string(), "bad".to_string()))
        );
        assert_eq!(
            detect_error_envelope("{\"code\":4000}"),
            Some(("4000".to_string(), String::new()))
        );
        assert_eq!(detect_error_envelope("{\"code\":\"0\"}"), None);
        assert_eq!(detect_error_envelope("{\"code\":0.0}"), None);
        assert_eq!(detect_error_envelope("{\"code\":null}"), None);
    }

    #[test]
    fn non_integer_envelope_codes_are_errors() {
        for (raw, code) in [
            ("{\"code\":\"AUTH\",\"msg\":\"bad token\"}", "AUTH"),
            ("{\"code\":18446744073709551615,\"msg\":\"x\"}", "18446744073709551615"),
            ("{\"code\":4100.5,\"msg\":\"x\"}", "4100.5"),
        ] {
            let out = assemble_answer(raw, "q");
            assert!(out.answer.contains(code), "{} -> {}", raw, out.answer);
            assert!(out.events.is_empty());
        }
    }

    fn failed_with(last_error: &str) -> String {
        format!(
            "event: conversation.chat.failed\ndata: {{\"last_error\":{}}}\n\n",
            last_error
        )
    }

    #[test]
    fn string_failure_code_overrides_partial_deltas() {
        let raw = [
            delta("partial"),
            failed_with("{\"code\":\"INTERNAL\",\"msg\":\"boom\"}"),
        ]
        .concat();
        let answer = assemble_answer(&raw, "q").answer;
        assert!(answer.contains("INTERNAL"));
        assert!(answer.contains("boom"));
        assert!(!answer.contains("partial"));
    }

    #[test]
    fn float_and_huge_failure_codes_fire() {
        for code in ["4100.0", "18446744073709551615"] {
            let raw = failed_with(&format!("{{\"code\":{},\"msg\":\"boom\"}}", code));
            let answer = assemble_answer(&raw, "q").answer;
            assert_ne!(answer, NO_RESPONSE);
            assert!(answer.contains("boom"));
        }
    }

    #[test]
    fn failure_without_code_still_fires() {
        let raw = [delta("partial"), failed_with("{\"msg\":\"boom\"}")].concat();
        let answer = assemble_answer(&raw, "q").answer;
        assert!(answer.contains(UNKNOWN_CODE));
        assert!(answer.contains("boom"));
        assert!(!answer.contains("partial"));
    }

    #[test]
    fn failed_event_without_last_error_is_ignored() {
        let raw = [delta("fine"), failed_with("null")].concat();
        assert_eq!(assemble_answer(&raw, "q").answer, "fine");
        let raw = [
            delta("fine"),
            "event: conversation.chat.failed\ndata: {\"id\":\"c1\"}\n\n".to_string(),
        ]
        .concat();
        assert_eq!(assemble_answer(&raw, "q").answer, "fine");
    }
}

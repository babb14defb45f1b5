// 面向用户的诊断文案：上游出错时仍然给前端一段可渲染的 Markdown

/// 整个响应体是一个带非零 code 的 JSON 错误（如鉴权失败）时使用
pub fn demo_mode_notice(code: &str, msg: &str, query: &str) -> String {
    format!(
        "**[系统提示：演示模式]**\n\n\
         Coze API 调用失败（错误码: {code}，信息: {msg}）。\n\n\
         以下为占位回复：\n\n\
         关于您的问题 **\"{query}\"**，正常情况下智能体会给出完整解答。\
         请检查服务端 `.env` 中的 `COZE_API_KEY` 与 `COZE_BOT_ID` 是否配置正确。"
    )
}

/// 流中出现 `conversation.chat.failed` 时使用
pub fn chat_failed_notice(code: &str, msg: &str) -> String {
    format!(
        "**[系统提示：服务受限]**\n\n\
         Coze API 返回错误（代码: {code}）：{msg}\n\n\
         通常是账户余额不足或调用额度已用完，请到 Coze 平台确认账户状态。"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_notice_embeds_code_message_and_query() {
        let text = demo_mode_notice("4100", "authentication is invalid", "电阻怎么选");
        assert!(text.contains("4100"));
        assert!(text.contains("authentication is invalid"));
        assert!(text.contains("电阻怎么选"));
    }

    #[test]
    fn failed_notice_embeds_code_and_message() {
        let text = chat_failed_notice("4101", "insufficient balance");
        assert!(text.contains("4101"));
        assert!(text.contains("insufficient balance"));
    }
}

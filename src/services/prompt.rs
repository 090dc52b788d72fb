//! 提示词构建
//!
//! 固定的系统指令 + 截断到字符上限的合同文本

use crate::models::AnalysisRequest;

/// 默认发送给模型的最大字符数
pub const DEFAULT_MAX_INPUT_CHARS: usize = 16_000;

/// 系统指令：要求模型按四个二级标题输出 markdown
pub const SYSTEM_PROMPT: &str = r#"You are a legal assistant AI. Your job is to analyze a contract and extract:
1. Key obligations for each party
2. Deadlines or time-sensitive clauses
3. Termination or payment clauses
4. Any vague, risky, or one-sided language

Return the output in structured markdown like this:

## 📄 Summary
...

## 📌 Obligations
- Party A must ...
- Party B agrees to ...

## ⏱️ Deadlines
- Deliverables must be completed by ...

## ⚠️ Red Flags
- Clause X is vague because...
"#;

/// 构建分析请求
///
/// 用户消息是 `text` 的前 `max_chars` 个字符，按字符硬截断，可能截在句子中间
pub fn build(text: &str, max_chars: usize) -> AnalysisRequest {
    AnalysisRequest {
        system_message: SYSTEM_PROMPT.to_string(),
        user_message: truncate_chars(text, max_chars).to_string(),
    }
}

/// 按字符（而非字节）截断
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

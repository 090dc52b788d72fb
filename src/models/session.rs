//! 会话状态
//!
//! 每个浏览器会话一份，保存在 `SessionStore` 中，由处理函数按引用取用

use chrono::{DateTime, Utc};

/// 会话所处阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// 等待上传
    AwaitingUpload,
    /// 已提取文本，等待用户触发分析
    TextExtracted,
    /// 正在调用模型
    Analyzing,
    /// 已达到使用上限，本会话内不再接受上传与分析
    LimitReached,
}

/// 已提取文本、等待分析的文档
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDocument {
    pub filename: String,
    pub text: String,
}

/// 单个会话的全部状态
#[derive(Debug, Clone)]
pub struct SessionState {
    /// 已完成的分析次数，只增不减
    pub contracts_used: u32,
    pub phase: SessionPhase,
    pub pending: Option<PendingDocument>,
    pub last_seen: DateTime<Utc>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            contracts_used: 0,
            phase: SessionPhase::AwaitingUpload,
            pending: None,
            last_seen: Utc::now(),
        }
    }

    /// 是否已达到上限
    pub fn limit_reached(&self, limit: u32) -> bool {
        self.contracts_used >= limit
    }

    /// 剩余可用次数
    pub fn remaining(&self, limit: u32) -> u32 {
        limit.saturating_sub(self.contracts_used)
    }

    /// 记录一次完成的分析，回到等待上传或进入上限状态
    pub fn complete_analysis(&mut self, limit: u32) {
        self.contracts_used += 1;
        self.pending = None;
        self.phase = if self.limit_reached(limit) {
            SessionPhase::LimitReached
        } else {
            SessionPhase::AwaitingUpload
        };
    }

    pub fn touch(&mut self) {
        self.last_seen = Utc::now();
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_analysis_reaches_limit() {
        let mut state = SessionState::new();
        state.pending = Some(PendingDocument {
            filename: "a.pdf".to_string(),
            text: "text".to_string(),
        });

        state.complete_analysis(3);
        assert_eq!(state.contracts_used, 1);
        assert_eq!(state.phase, SessionPhase::AwaitingUpload);
        assert!(state.pending.is_none());
        assert_eq!(state.remaining(3), 2);

        state.complete_analysis(3);
        state.complete_analysis(3);
        assert_eq!(state.phase, SessionPhase::LimitReached);
        assert!(state.limit_reached(3));
        assert_eq!(state.remaining(3), 0);
    }
}

//! 会话处理上下文
//!
//! 封装"我正在处理哪个会话的哪份合同"这一信息，用于日志前缀

use std::fmt::Display;

use crate::services::SessionId;

/// 会话处理上下文
#[derive(Debug, Clone)]
pub struct SessionCtx {
    /// 会话ID
    pub session_id: SessionId,

    /// 上传的文件名（尚未上传时为空）
    pub filename: Option<String>,
}

impl SessionCtx {
    /// 只知道会话、还不知道文件时使用
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            filename: None,
        }
    }

    pub fn with_file(session_id: SessionId, filename: impl Into<String>) -> Self {
        Self {
            session_id,
            filename: Some(filename.into()),
        }
    }
}

impl Display for SessionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 只显示 ID 前 8 位
        let short: String = self.session_id.to_string().chars().take(8).collect();
        match &self.filename {
            Some(name) => write!(f, "[会话 #{} 文件 {}]", short, name),
            None => write!(f, "[会话 #{}]", short),
        }
    }
}

//! # Contract Explainer
//!
//! 上传法律合同（PDF / DOCX），提取文本后交给大模型分析，
//! 把模型返回的 markdown 按二级标题拆成标签页展示；每个会话限用 3 次。
//!
//! ## 架构设计
//!
//! ### ① 业务能力层（Services）
//! - `extractor` - 文档 → 纯文本
//! - `prompt` - 系统指令 + 截断后的合同文本
//! - `LlmService` - 一次 chat completion 调用
//! - `section_splitter` - 回复 → 有序章节
//! - `SessionStore` - 进程内会话状态
//!
//! ### ② 流程层（Workflow）
//! - `ExplainFlow` - 上传 → 提取 → 分析 → 展示 的状态流转与次数上限
//!
//! ### ③ 服务层（Server）
//! - `server` - axum 路由、Cookie 会话、页面渲染
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod models;
pub mod server;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{AnalysisRequest, Document, DocumentKind, Section, SectionMap};
pub use services::{split_sections, Analyzer, LlmService};
pub use workflow::{AnalysisOutcome, ExplainFlow};

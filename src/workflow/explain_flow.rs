//! 合同解读流程 - 流程层
//!
//! 核心职责：定义一个会话内"上传 → 提取 → 分析 → 展示"的状态流转
//!
//! 状态：
//! 1. AwaitingUpload --上传成功--> TextExtracted
//! 2. TextExtracted --用户点击分析--> Analyzing --> Displaying --> AwaitingUpload(count+1)
//! 3. count ≥ 上限 --> LimitReached，本会话内不再接受上传和分析
//!
//! 上限检查总在提取和请求之前进行

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, SessionError};
use crate::models::{Document, PendingDocument, SectionMap, SessionPhase, SessionState};
use crate::services::{extractor, prompt, split_sections, Analyzer, SessionId, SessionStore};
use crate::utils::logging::truncate_text;
use crate::workflow::session_ctx::SessionCtx;

/// 一次分析完成后的展示数据
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub filename: String,
    pub sections: SectionMap,
    /// 本次分析计数后的已用次数
    pub contracts_used: u32,
}

/// 合同解读流程
///
/// - 不持有会话状态，状态由 `SessionStore` 按引用传入
/// - 只依赖业务能力（services）
pub struct ExplainFlow<A> {
    analyzer: A,
    max_input_chars: usize,
    max_contracts: u32,
}

impl<A: Analyzer> ExplainFlow<A> {
    pub fn new(analyzer: A, config: &Config) -> Self {
        Self {
            analyzer,
            max_input_chars: config.max_input_chars,
            max_contracts: config.max_contracts_per_session,
        }
    }

    pub fn max_contracts(&self) -> u32 {
        self.max_contracts
    }

    /// 处理上传：检查上限 → 判断类型 → 提取文本 → 记为待分析文档
    ///
    /// 类型不支持或提取失败时会话状态不变，可以重新上传
    pub async fn upload(
        &self,
        store: &SessionStore,
        session_id: SessionId,
        filename: &str,
        bytes: Vec<u8>,
    ) -> AppResult<PendingDocument> {
        let ctx = SessionCtx::with_file(session_id, filename);
        let limit = self.max_contracts;

        store
            .with_session(session_id, |state| check_accepting(state, limit))
            .await
            .inspect_err(|e| debug!("{} 上传被拒绝: {}", ctx, e))?;

        let document = Document::new(filename, bytes).ok_or_else(|| {
            warn!("{} ⚠️ 不支持的文件类型", ctx);
            AppError::unsupported_file_type(filename)
        })?;

        info!("{} 📄 正在提取 {} 文本...", ctx, document.kind);
        let text = extractor::extract_blocking(document).await.map_err(|e| {
            warn!("{} ⚠️ 文本提取失败: {}", ctx, e);
            AppError::from(e)
        })?;

        debug!("{} 文本预览: {}", ctx, truncate_text(&text, 80));

        let pending = PendingDocument {
            filename: filename.to_string(),
            text,
        };
        self.store_pending(store, session_id, pending.clone())
            .await
            .inspect_err(|e| warn!("{} ⚠️ 提取期间会话状态已变化，丢弃本次上传: {}", ctx, e))?;

        info!("{} ✅ 文本提取成功，等待用户触发分析", ctx);
        Ok(pending)
    }

    /// 提取完成后写回待分析文档
    ///
    /// 提取期间不持有锁，写回前重新检查：会话若已进入分析或达到上限，
    /// 不改动 `pending` 和 `phase`
    async fn store_pending(
        &self,
        store: &SessionStore,
        session_id: SessionId,
        pending: PendingDocument,
    ) -> Result<(), SessionError> {
        let limit = self.max_contracts;
        store
            .with_session(session_id, |state| {
                check_accepting(state, limit)?;
                state.pending = Some(pending);
                state.phase = SessionPhase::TextExtracted;
                Ok(())
            })
            .await
    }

    /// 处理分析：检查上限 → 构建提示词 → 请求模型 → 拆分章节 → 计数
    ///
    /// 请求失败时不计数，待分析文档保留，可以再次点击分析
    pub async fn analyze(
        &self,
        store: &SessionStore,
        session_id: SessionId,
    ) -> AppResult<AnalysisOutcome> {
        let limit = self.max_contracts;

        let pending = store
            .with_session(session_id, |state| {
                check_accepting(state, limit)?;
                let pending = state
                    .pending
                    .clone()
                    .ok_or(SessionError::NoPendingDocument)?;
                state.phase = SessionPhase::Analyzing;
                Ok::<_, SessionError>(pending)
            })
            .await
            .inspect_err(|e| debug!("{} 分析被拒绝: {}", SessionCtx::new(session_id), e))?;

        let ctx = SessionCtx::with_file(session_id, &pending.filename);
        let request = prompt::build(&pending.text, self.max_input_chars);
        info!(
            "{} 🔍 开始分析 (发送 {} / {} 字符)",
            ctx,
            request.user_message.chars().count(),
            pending.text.chars().count()
        );

        let reply = match self.analyzer.analyze(&request).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("{} ⚠️ 分析请求失败: {}", ctx, e);
                store
                    .with_session(session_id, |state| {
                        state.phase = SessionPhase::TextExtracted;
                    })
                    .await;
                return Err(e);
            }
        };

        let sections = split_sections(&reply);
        if sections.len() < 2 {
            warn!(
                "{} ⚠️ 模型回复只拆出 {} 个章节，可能缺少二级标题",
                ctx,
                sections.len()
            );
        }

        let state = store
            .with_session(session_id, |state| {
                state.complete_analysis(limit);
                state.clone()
            })
            .await;

        info!(
            "{} ✅ 分析完成，{} 个章节，本会话已用 {}/{}",
            ctx,
            sections.len(),
            state.contracts_used,
            limit
        );

        Ok(AnalysisOutcome {
            filename: pending.filename,
            sections,
            contracts_used: state.contracts_used,
        })
    }
}

/// 会话是否还能接受上传 / 分析
fn check_accepting(state: &mut SessionState, limit: u32) -> Result<(), SessionError> {
    if state.limit_reached(limit) {
        state.phase = SessionPhase::LimitReached;
        return Err(SessionError::LimitReached {
            used: state.contracts_used,
            limit,
        });
    }
    if state.phase == SessionPhase::Analyzing {
        return Err(SessionError::AnalysisInProgress);
    }
    Ok(())
}

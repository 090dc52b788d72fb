//! HTTP 处理函数
//!
//! 每个用户动作一个处理函数：打开页面、上传、分析

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, error};

use crate::error::{AppError, AppResult, SessionError};
use crate::models::SessionPhase;
use crate::server::render::{render_page, Notice, PageView};
use crate::server::session::{session_cookie, session_id_from_headers};
use crate::server::AppState;
use crate::services::{Analyzer, SessionId};
use crate::workflow::AnalysisOutcome;

/// 上传表单中文件字段的名字
const UPLOAD_FIELD: &str = "contract";

/// 健康检查
pub async fn health() -> &'static str {
    "OK"
}

/// 使用情况
#[derive(Debug, Serialize)]
pub struct UsageResponse {
    pub contracts_used: u32,
    pub limit: u32,
    pub remaining: u32,
    pub limit_reached: bool,
}

/// 主页面
pub async fn index<A: Analyzer>(
    State(state): State<Arc<AppState<A>>>,
    headers: HeaderMap,
) -> Response {
    let id = resolve_session(&state, &headers).await;
    page_response(&state, id, StatusCode::OK, Vec::new(), None).await
}

/// 上传合同并提取文本
pub async fn upload<A: Analyzer>(
    State(state): State<Arc<AppState<A>>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let id = resolve_session(&state, &headers).await;

    let result = async {
        let (filename, bytes) = read_upload(multipart).await?;
        state.flow.upload(&state.store, id, &filename, bytes).await
    }
    .await;

    match result {
        Ok(_) => page_response(&state, id, StatusCode::OK, Vec::new(), None).await,
        Err(e) => error_response(&state, id, e).await,
    }
}

/// 对已提取的文本发起分析
pub async fn analyze<A: Analyzer>(
    State(state): State<Arc<AppState<A>>>,
    headers: HeaderMap,
) -> Response {
    let id = resolve_session(&state, &headers).await;

    match state.flow.analyze(&state.store, id).await {
        Ok(outcome) => page_response(&state, id, StatusCode::OK, Vec::new(), Some(&outcome)).await,
        Err(e) => error_response(&state, id, e).await,
    }
}

/// 当前会话的使用情况（JSON）
pub async fn usage<A: Analyzer>(
    State(state): State<Arc<AppState<A>>>,
    headers: HeaderMap,
) -> Response {
    let id = resolve_session(&state, &headers).await;
    let snapshot = state.store.snapshot(id).await;
    let limit = state.flow.max_contracts();

    let body = Json(UsageResponse {
        contracts_used: snapshot.contracts_used,
        limit,
        remaining: snapshot.remaining(limit),
        limit_reached: snapshot.limit_reached(limit),
    });

    (
        [(header::SET_COOKIE, session_cookie(id))],
        body,
    )
        .into_response()
}

// ========== 辅助函数 ==========

async fn resolve_session<A: Analyzer>(state: &AppState<A>, headers: &HeaderMap) -> SessionId {
    state.store.resolve(session_id_from_headers(headers)).await
}

/// 从 multipart 表单中读取上传文件
async fn read_upload(mut multipart: Multipart) -> AppResult<(String, Vec<u8>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Other(anyhow::Error::new(e)))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Other(anyhow::Error::new(e)))?;

        if filename.is_empty() || bytes.is_empty() {
            return Err(SessionError::MissingUpload.into());
        }
        debug!("收到上传: {} ({} 字节)", filename, bytes.len());
        return Ok((filename, bytes.to_vec()));
    }

    Err(SessionError::MissingUpload.into())
}

/// 按会话当前状态渲染页面
async fn page_response<A: Analyzer>(
    state: &AppState<A>,
    id: SessionId,
    status: StatusCode,
    notices: Vec<Notice>,
    outcome: Option<&AnalysisOutcome>,
) -> Response {
    let snapshot = state.store.snapshot(id).await;
    let extracted = match snapshot.phase {
        SessionPhase::TextExtracted => snapshot.pending.as_ref(),
        _ => None,
    };

    let view = PageView {
        notices,
        // 刚完成的分析以它计数后的次数为准
        contracts_used: outcome.map_or(snapshot.contracts_used, |o| o.contracts_used),
        limit: state.flow.max_contracts(),
        extracted,
        sections: outcome.map(|o| &o.sections),
    };

    (
        status,
        [(header::SET_COOKIE, session_cookie(id))],
        Html(render_page(&view)),
    )
        .into_response()
}

/// 错误页：保留会话当前视图，加上错误提示
async fn error_response<A: Analyzer>(state: &AppState<A>, id: SessionId, err: AppError) -> Response {
    let status = err.status_code();
    if status.is_server_error() {
        error!("请求失败: {}", err);
    } else {
        debug!("请求被拒绝: {}", err);
    }

    // 上限提示由页面自身渲染
    let notices = match err {
        AppError::Session(SessionError::LimitReached { .. }) => Vec::new(),
        ref other => vec![Notice::error(other.user_message())],
    };

    page_response(state, id, status, notices, None).await
}

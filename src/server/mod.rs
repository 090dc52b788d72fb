//! HTTP 服务层
//!
//! ## 路由
//! - `GET /` 页面
//! - `POST /upload` 上传合同（multipart 字段 `contract`）
//! - `POST /analyze` 分析已提取的文本
//! - `GET /api/usage` 当前会话使用情况
//! - `GET /health` 健康检查

pub mod handlers;
pub mod render;
pub mod session;

use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::services::{Analyzer, LlmService, SessionStore};
use crate::workflow::ExplainFlow;

/// 所有处理函数共享的状态
pub struct AppState<A> {
    pub flow: ExplainFlow<A>,
    pub store: SessionStore,
}

impl<A: Analyzer> AppState<A> {
    pub fn new(analyzer: A, config: &Config) -> Self {
        Self {
            flow: ExplainFlow::new(analyzer, config),
            store: SessionStore::new(config.session_ttl_minutes)
                .with_max_sessions(config.max_sessions),
        }
    }
}

/// 构建路由
pub fn router<A: Analyzer>(state: Arc<AppState<A>>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(handlers::index::<A>))
        .route("/upload", post(handlers::upload::<A>))
        .route("/analyze", post(handlers::analyze::<A>))
        .route("/api/usage", get(handlers::usage::<A>))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 启动服务，收到 Ctrl+C 后退出
pub async fn serve(config: Config) -> Result<()> {
    let analyzer = LlmService::new(&config);
    let state = Arc::new(AppState::new(analyzer, &config));
    let app = router(state, config.max_upload_bytes);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("🌐 服务已启动: http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 服务已停止");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("无法监听退出信号: {}", e);
        std::future::pending::<()>().await;
    }
}

/// 日志工具模块
///
/// 提供日志初始化和输出格式化的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// 初始化日志
///
/// 优先使用 `RUST_LOG`；未设置时按是否开启详细日志选择默认级别
pub fn init(verbose: bool) {
    let default_directive = if verbose {
        "contract_explainer=debug,tower_http=debug"
    } else {
        "contract_explainer=info,tower_http=info"
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    // 测试中可能被重复调用，忽略重复初始化
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 合同解读服务");
    info!(
        "启动时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🤖 模型: {} ({})", config.llm_model_name, config.llm_api_base_url);
    info!("🔑 API 密钥: {}", mask_secret(&config.llm_api_key));
    info!(
        "📏 单次最多发送 {} 字符，每个会话 {} 次",
        config.max_input_chars, config.max_contracts_per_session
    );
    info!(
        "🗂️ 会话空闲 {} 分钟回收，最多保留 {} 个",
        config.session_ttl_minutes, config.max_sessions
    );
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

/// 只保留密钥末 4 位
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("{}{}", "*".repeat(8), tail)
}

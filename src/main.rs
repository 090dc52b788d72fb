use anyhow::Result;
use contract_explainer::config::Config;
use contract_explainer::server;
use contract_explainer::utils::logging;
use tracing::error;

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load();

    // 初始化日志
    logging::init(config.as_ref().is_ok_and(|c| c.verbose_logging));

    let config = config.inspect_err(|e| error!("❌ {}", e))?;
    logging::log_startup(&config);

    // 启动服务
    server::serve(config).await
}

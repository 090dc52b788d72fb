//! LLM 服务 - 业务能力层
//!
//! 只负责"合同分析请求"能力：一次请求，一次回复，不重试
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务

use std::future::Future;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, LlmError};
use crate::models::AnalysisRequest;

/// 合同分析能力
///
/// 流程层只依赖这个 trait，测试中可以换成本地桩实现
pub trait Analyzer: Send + Sync + 'static {
    /// 发送分析请求，返回模型的 markdown 回复
    fn analyze(&self, request: &AnalysisRequest) -> impl Future<Output = AppResult<String>> + Send;
}

/// LLM 服务
///
/// 职责：
/// - 把 `AnalysisRequest` 转成一次 chat completion 调用
/// - 不截断、不拆分、不关心会话
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
            temperature: config.llm_temperature,
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// 通用的 LLM 调用函数
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（去掉首尾空白）
    pub async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: Option<&str>,
    ) -> AppResult<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.chars().count());

        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .map_err(LlmError::RequestBuild)?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(LlmError::RequestBuild)?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(LlmError::RequestBuild)?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            AppError::llm_api_failed(&self.model_name, e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| LlmError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        Ok(content.trim().to_string())
    }
}

impl Analyzer for LlmService {
    async fn analyze(&self, request: &AnalysisRequest) -> AppResult<String> {
        info!("🤖 正在请求模型分析合同 (模型: {})", self.model_name);
        let reply = self
            .send_to_llm(&request.user_message, Some(&request.system_message))
            .await?;
        info!("✓ 模型回复 {} 字符", reply.chars().count());
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::prompt;

    fn create_test_service() -> LlmService {
        let config = Config {
            llm_api_key: std::env::var("OPENAI_API_KEY").unwrap_or_else(|_| "sk-test".to_string()),
            ..Config::default()
        };
        LlmService::new(&config)
    }

    #[test]
    fn test_service_uses_configured_model() {
        let service = create_test_service();
        assert_eq!(service.model_name(), "gpt-4");
        assert!((service.temperature - 0.3).abs() < f32::EPSILON);
    }

    /// 测试真实 API 调用
    ///
    /// 运行方式：
    /// ```bash
    /// OPENAI_API_KEY=sk-... cargo test test_analyze_live -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_analyze_live() {
        let _ = tracing_subscriber::fmt::try_init();

        let service = create_test_service();
        let request = prompt::build(
            "Party A shall deliver the goods by 1 March. Party B shall pay within 90 days, \
             unless Party A decides otherwise at its sole discretion.",
            prompt::DEFAULT_MAX_INPUT_CHARS,
        );

        let reply = service.analyze(&request).await.expect("LLM 调用失败");
        println!("\n========== LLM 响应 ==========\n{}\n==============================", reply);
        assert!(reply.contains("## "));
    }
}

use axum::http::StatusCode;
use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 不支持的文件类型（唯一在界面上被显式处理的错误）
    #[error("不支持的文件类型: {filename}")]
    UnsupportedFileType { filename: String },
    /// 文本提取错误
    #[error("文本提取错误: {0}")]
    Extraction(#[from] ExtractionError),
    /// LLM 服务错误
    #[error("LLM错误: {0}")]
    Llm(#[from] LlmError),
    /// 会话状态错误
    #[error("会话错误: {0}")]
    Session(#[from] SessionError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 其他错误（用于包装第三方库错误）
    #[error("错误: {0}")]
    Other(#[from] anyhow::Error),
}

/// 文本提取错误
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// PDF 解析失败
    #[error("PDF解析失败 ({filename}): {message}")]
    Pdf { filename: String, message: String },
    /// DOCX 解析失败
    #[error("DOCX解析失败 ({filename}): {message}")]
    Docx { filename: String, message: String },
    /// 文档中没有可提取的文本
    #[error("文档中没有可提取的文本: {filename}")]
    EmptyText { filename: String },
    /// 后台解析任务异常退出
    #[error("解析任务异常退出: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        #[source]
        source: async_openai::error::OpenAIError,
    },
    /// 构建请求失败
    #[error("构建LLM请求失败: {0}")]
    RequestBuild(#[source] async_openai::error::OpenAIError),
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
}

/// 会话状态错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// 已达到免费次数上限
    #[error("已达到使用上限: {used}/{limit}")]
    LimitReached { used: u32, limit: u32 },
    /// 没有待分析的文档
    #[error("没有已提取文本的待分析文档")]
    NoPendingDocument,
    /// 同一会话已有分析在进行中
    #[error("当前会话已有分析在进行中")]
    AnalysisInProgress,
    /// 表单中没有上传文件
    #[error("请求中缺少上传文件字段")]
    MissingUpload,
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 缺少必需的密钥
    #[error("缺少必需的密钥 {key}（环境变量或 {secrets_file}）")]
    SecretNotFound { key: String, secrets_file: String },
    /// 密钥文件读取失败
    #[error("密钥文件 {path} 读取失败: {source}")]
    SecretsFileUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 密钥文件解析失败
    #[error("密钥文件 {path} 解析失败: {source}")]
    SecretsFileInvalid {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建不支持文件类型错误
    pub fn unsupported_file_type(filename: impl Into<String>) -> Self {
        AppError::UnsupportedFileType {
            filename: filename.into(),
        }
    }

    /// 创建LLM API调用错误
    pub fn llm_api_failed(
        model: impl Into<String>,
        source: async_openai::error::OpenAIError,
    ) -> Self {
        AppError::Llm(LlmError::ApiCallFailed {
            model: model.into(),
            source,
        })
    }

    /// 对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::UnsupportedFileType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::Extraction(ExtractionError::Join(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Llm(_) => StatusCode::BAD_GATEWAY,
            AppError::Session(SessionError::LimitReached { .. }) => StatusCode::FORBIDDEN,
            AppError::Session(SessionError::AnalysisInProgress) => StatusCode::CONFLICT,
            AppError::Session(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_) | AppError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 展示给页面用户的英文提示
    pub fn user_message(&self) -> String {
        match self {
            AppError::UnsupportedFileType { .. } => "Unsupported file type.".to_string(),
            AppError::Extraction(ExtractionError::EmptyText { .. }) => {
                "No text could be extracted from this document.".to_string()
            }
            AppError::Extraction(e) => format!("Could not read the document: {}", e),
            AppError::Llm(e) => format!("The analysis request failed: {}", e),
            AppError::Session(SessionError::LimitReached { .. }) => {
                "🚫 You’ve reached your free contract limit. Upgrade to continue.".to_string()
            }
            AppError::Session(SessionError::NoPendingDocument) => {
                "Upload a contract before asking for an explanation.".to_string()
            }
            AppError::Session(SessionError::AnalysisInProgress) => {
                "An analysis is already running for this session.".to_string()
            }
            AppError::Session(SessionError::MissingUpload) => {
                "Choose a PDF or DOCX file to upload.".to_string()
            }
            AppError::Config(_) | AppError::Other(_) => "Internal error.".to_string(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::unsupported_file_type("a.txt").status_code(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            AppError::from(SessionError::LimitReached { used: 3, limit: 3 }).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::from(LlmError::EmptyContent {
                model: "gpt-4".to_string()
            })
            .status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_user_message_hides_internal_details() {
        let err = AppError::Other(anyhow::anyhow!("secret path /etc/x"));
        assert_eq!(err.user_message(), "Internal error.");
    }
}

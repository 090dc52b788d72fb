use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;
use crate::services::session_store::DEFAULT_MAX_SESSIONS;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 监听地址
    pub bind_addr: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 密钥文件路径
    pub secrets_file: String,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_temperature: f32,
    /// 发送给模型的合同文本最大字符数
    pub max_input_chars: usize,
    // --- 会话配置 ---
    /// 每个会话允许的分析次数
    pub max_contracts_per_session: u32,
    /// 会话空闲多久后回收（分钟）
    pub session_ttl_minutes: i64,
    /// 同时保留的会话数上限
    pub max_sessions: usize,
    /// 上传请求体大小上限（字节）
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8501".to_string(),
            verbose_logging: false,
            secrets_file: "secrets.toml".to_string(),
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4".to_string(),
            llm_temperature: 0.3,
            max_input_chars: 16_000,
            max_contracts_per_session: 3,
            session_ttl_minutes: 120,
            max_sessions: DEFAULT_MAX_SESSIONS,
            max_upload_bytes: 200 * 1024 * 1024,
        }
    }
}

/// 密钥文件内容，键名沿用托管平台的写法
#[derive(Debug, Default, Deserialize)]
struct Secrets {
    #[serde(rename = "OPENAI_API_KEY")]
    openai_api_key: Option<String>,
    #[serde(rename = "OPENAI_API_BASE")]
    openai_api_base: Option<String>,
    #[serde(rename = "OPENAI_MODEL")]
    openai_model: Option<String>,
}

impl Config {
    /// 加载配置：默认值 → 密钥文件 → 环境变量
    ///
    /// 缺少 API 密钥时直接返回错误，服务不会启动
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|name: &str| std::env::var(name).ok())
    }

    fn load_with(env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = env("SECRETS_FILE") {
            config.secrets_file = path;
        }

        let secrets = read_secrets(&config.secrets_file)?;
        if let Some(key) = secrets.openai_api_key {
            config.llm_api_key = key;
        }
        if let Some(base) = secrets.openai_api_base {
            config.llm_api_base_url = base;
        }
        if let Some(model) = secrets.openai_model {
            config.llm_model_name = model;
        }

        if let Some(v) = env("OPENAI_API_KEY") {
            config.llm_api_key = v;
        }
        if let Some(v) = env("OPENAI_API_BASE") {
            config.llm_api_base_url = v;
        }
        if let Some(v) = env("OPENAI_MODEL") {
            config.llm_model_name = v;
        }
        if let Some(v) = env("BIND_ADDR") {
            config.bind_addr = v;
        }
        config.llm_temperature = parse_env(&env, "LLM_TEMPERATURE", "f32", config.llm_temperature)?;
        config.max_input_chars = parse_env(&env, "MAX_INPUT_CHARS", "usize", config.max_input_chars)?;
        config.max_contracts_per_session = parse_env(
            &env,
            "MAX_CONTRACTS_PER_SESSION",
            "u32",
            config.max_contracts_per_session,
        )?;
        config.session_ttl_minutes =
            parse_env(&env, "SESSION_TTL_MINUTES", "i64", config.session_ttl_minutes)?;
        config.max_sessions = parse_env(&env, "MAX_SESSIONS", "usize", config.max_sessions)?;
        config.max_upload_bytes =
            parse_env(&env, "MAX_UPLOAD_BYTES", "usize", config.max_upload_bytes)?;
        config.verbose_logging = parse_env(&env, "VERBOSE_LOGGING", "bool", config.verbose_logging)?;

        if config.llm_api_key.trim().is_empty() {
            return Err(ConfigError::SecretNotFound {
                key: "OPENAI_API_KEY".to_string(),
                secrets_file: config.secrets_file.clone(),
            });
        }

        Ok(config)
    }
}

/// 读取密钥文件，文件不存在时视为空
fn read_secrets(path: &str) -> Result<Secrets, ConfigError> {
    if !Path::new(path).exists() {
        debug!("密钥文件不存在，跳过: {}", path);
        return Ok(Secrets::default());
    }

    let content =
        std::fs::read_to_string(path).map_err(|source| ConfigError::SecretsFileUnreadable {
            path: path.to_string(),
            source,
        })?;
    toml::from_str(&content).map_err(|source| ConfigError::SecretsFileInvalid {
        path: path.to_string(),
        source,
    })
}

fn parse_env<T: std::str::FromStr>(
    env: &impl Fn(&str) -> Option<String>,
    var_name: &str,
    expected_type: &str,
    default: T,
) -> Result<T, ConfigError> {
    match env(var_name) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::EnvVarParseFailed {
            var_name: var_name.to_string(),
            value,
            expected_type: expected_type.to_string(),
        }),
        None => Ok(default),
    }
}

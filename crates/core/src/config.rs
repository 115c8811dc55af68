//! 配置管理模块
//!
//! 从 YAML 文件加载应用配置，缺省时使用内置默认值。
//! 模型 API 凭证只在启动时解析一次，显式传给客户端，不回写进程环境变量。

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// 标题提示词中的想法占位符
pub const IDEA_PLACEHOLDER: &str = "{idea}";
/// 正文提示词中的标题占位符
pub const TITLE_PLACEHOLDER: &str = "{title}";

/// 草稿保留时长上限（十年，分钟）
pub const MAX_DRAFT_TTL_MINUTES: u64 = 60 * 24 * 365 * 10;

pub const DEFAULT_TITLE_PROMPT: &str = "Generate an engaging blog title for this idea: {idea}";
pub const DEFAULT_CONTENT_PROMPT: &str =
    "Write a detailed and engaging blog post based on this title: {title}";

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub workflow: WorkflowConfig,
    pub logging: LoggingConfig,
}

/// Web 服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 请求体大小上限（字节）
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
            body_limit_bytes: 64 * 1024,
        }
    }
}

/// 模型服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// OpenAI 兼容 API 根地址
    pub base_url: String,
    /// 模型名称
    pub model: String,
    /// 采样温度
    pub temperature: f32,
    /// 最大输出 token 数，不设置则由服务端决定
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// 存放 API 密钥的环境变量名
    pub api_key_env: String,
    /// 配置文件中的 API 密钥（环境变量优先）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// 请求超时（秒），不设置则使用 HTTP 客户端默认值
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama3-70b-8192".to_string(),
            temperature: 0.7,
            max_tokens: None,
            api_key_env: "GROQ_API_KEY".to_string(),
            api_key: None,
            timeout_secs: None,
        }
    }
}

impl ModelConfig {
    /// 从进程环境解析 API 密钥
    pub fn resolve_api_key(&self) -> Result<ApiKey, ConfigError> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    /// 使用给定的环境查找函数解析 API 密钥
    pub fn resolve_api_key_with<F>(&self, lookup: F) -> Result<ApiKey, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let from_env = lookup(&self.api_key_env).filter(|v| !v.trim().is_empty());
        let from_file = self.api_key.clone().filter(|v| !v.trim().is_empty());

        from_env
            .or(from_file)
            .map(|v| ApiKey::new(v.trim()))
            .ok_or_else(|| ConfigError::MissingCredential {
                env_var: self.api_key_env.clone(),
            })
    }
}

/// 工作流配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// 单次图执行允许运行的最大节点数
    pub recursion_limit: usize,
    /// 草稿在内存中保留的时长（分钟），0 表示不过期
    pub draft_ttl_minutes: u64,
    /// 标题提示词模板，必须包含 `{idea}`
    pub title_prompt: String,
    /// 正文提示词模板，必须包含 `{title}`
    pub content_prompt: String,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            recursion_limit: 25,
            draft_ttl_minutes: 120,
            title_prompt: DEFAULT_TITLE_PROMPT.to_string(),
            content_prompt: DEFAULT_CONTENT_PROMPT.to_string(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 默认日志级别（RUST_LOG 优先）
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// 模型 API 密钥
///
/// Debug 输出时隐藏内容。
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

impl AppConfig {
    /// 默认配置文件路径
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("blogforge")
            .join("config.yaml")
    }

    /// 从指定文件加载配置
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_yaml(&content)?;
        tracing::debug!("[CONFIG] 已加载配置文件: {}", path.display());
        Ok(config)
    }

    /// 加载配置：显式路径必须存在；未指定时默认路径不存在则使用默认值
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = Self::default_path();
                if default_path.exists() {
                    Self::load(&default_path)
                } else {
                    tracing::debug!("[CONFIG] 未找到配置文件，使用默认配置");
                    Ok(Self::default())
                }
            }
        }
    }

    /// 从 YAML 文本解析并校验
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// 写入配置文件，自动创建父目录
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(path, self.to_yaml()?).map_err(io_err)
    }

    /// 校验配置项
    pub fn validate(&self) -> Result<(), ConfigError> {
        Url::parse(&self.model.base_url)
            .map_err(|e| ConfigError::invalid("model.base_url", e.to_string()))?;

        if self.model.model.trim().is_empty() {
            return Err(ConfigError::invalid("model.model", "不能为空"));
        }
        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(ConfigError::invalid("model.temperature", "必须在 0.0 到 2.0 之间"));
        }
        if self.workflow.recursion_limit == 0 {
            return Err(ConfigError::invalid("workflow.recursion_limit", "必须大于 0"));
        }
        if self.workflow.draft_ttl_minutes > MAX_DRAFT_TTL_MINUTES {
            return Err(ConfigError::invalid(
                "workflow.draft_ttl_minutes",
                format!("不能超过 {MAX_DRAFT_TTL_MINUTES}"),
            ));
        }
        if !self.workflow.title_prompt.contains(IDEA_PLACEHOLDER) {
            return Err(ConfigError::invalid(
                "workflow.title_prompt",
                format!("缺少占位符 {IDEA_PLACEHOLDER}"),
            ));
        }
        if !self.workflow.content_prompt.contains(TITLE_PLACEHOLDER) {
            return Err(ConfigError::invalid(
                "workflow.content_prompt",
                format!("缺少占位符 {TITLE_PLACEHOLDER}"),
            ));
        }
        Ok(())
    }
}

//! 配置错误类型

use thiserror::Error;

/// 配置加载错误
///
/// 启动阶段出现即视为致命错误。
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO 错误
    #[error("读取配置文件失败 {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// YAML 解析错误
    #[error("配置文件格式错误: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// 缺少模型 API 凭证
    #[error("缺少模型 API 凭证：请设置环境变量 {env_var} 或在配置文件中填写 model.api_key")]
    MissingCredential { env_var: String },

    /// 配置值无效
    #[error("配置项 {field} 无效: {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

//! 模型客户端抽象

use async_trait::async_trait;
use blogforge_core::Message;
use thiserror::Error;

/// 模型调用错误
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("创建 HTTP 客户端失败: {0}")]
    Client(String),
    #[error("请求模型服务失败: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("模型服务返回错误 ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("解析模型响应失败: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("模型响应为空")]
    EmptyResponse,
}

impl ProviderError {
    /// 用于推断对外错误码的 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            ProviderError::Client(_) => 500,
            ProviderError::Transport(e) if e.is_timeout() => 504,
            ProviderError::Transport(_) => 502,
            ProviderError::Api { status, .. } => *status,
            ProviderError::Decode(_) | ProviderError::EmptyResponse => 502,
        }
    }
}

/// 文本补全模型
///
/// 传入按顺序排列的消息，返回一条回复文本。
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn invoke(&self, messages: &[Message]) -> Result<String, ProviderError>;

    /// 模型名称（用于日志）
    fn model_name(&self) -> &str;
}

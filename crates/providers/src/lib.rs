//! Provider 系统模块
//!
//! 包含模型客户端抽象 `ChatModel` 以及 Groq（OpenAI 兼容）实现。

pub mod chat_model;
pub mod groq;
#[cfg(any(test, feature = "test-util"))]
pub mod scripted;

pub use chat_model::{ChatModel, ProviderError};
pub use groq::GroqClient;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

//! 数据模型
//!
//! - `message`: 工作流内部统一使用的消息类型
//! - `openai`: OpenAI 兼容的 Chat Completion 线上格式

pub mod message;
pub mod openai;

pub use message::{Message, Role};

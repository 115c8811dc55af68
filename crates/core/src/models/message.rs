//! 消息类型
//!
//! 工作流中所有消息都通过同一个带标签的枚举构造，
//! 序列化格式与 OpenAI Chat Completion 的 `{"role", "content"}` 保持一致。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 消息角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// 对话消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "content", rename_all = "lowercase")]
pub enum Message {
    /// 用户输入（想法、反馈）
    User(String),
    /// 模型回复
    Assistant(String),
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self::User(text.into())
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::Assistant(text.into())
    }

    pub fn role(&self) -> Role {
        match self {
            Self::User(_) => Role::User,
            Self::Assistant(_) => Role::Assistant,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::User(text) | Self::Assistant(text) => text,
        }
    }

    pub fn is_user(&self) -> bool {
        matches!(self, Self::User(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_wire_shape() {
        let json = serde_json::to_value(Message::user("a robot learns to paint")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"role": "user", "content": "a robot learns to paint"})
        );

        let json = serde_json::to_value(Message::assistant("Brushstrokes of Steel")).unwrap();
        assert_eq!(json["role"], "assistant");
    }

    #[test]
    fn test_message_from_wire() {
        let msg: Message =
            serde_json::from_str(r#"{"role":"assistant","content":"hello"}"#).unwrap();
        assert_eq!(msg, Message::assistant("hello"));
        assert_eq!(msg.role(), Role::Assistant);
        assert!(!msg.is_user());
    }

    #[test]
    fn test_unknown_role_rejected() {
        let result: Result<Message, _> =
            serde_json::from_str(r#"{"role":"system","content":"x"}"#);
        assert!(result.is_err());
    }
}

//! 脚本化模型（测试用）
//!
//! 按顺序返回预设回复并记录每次调用的消息，
//! 让工作流测试可以断言路由和状态形状而不依赖真实模型输出。

use crate::chat_model::{ChatModel, ProviderError};
use async_trait::async_trait;
use blogforge_core::Message;
use parking_lot::Mutex;
use std::collections::VecDeque;

enum ScriptedReply {
    Text(String),
    Failure { status: u16, message: String },
}

/// 预设回复的模型替身
#[derive(Default)]
pub struct ScriptedChatModel {
    replies: Mutex<VecDeque<ScriptedReply>>,
    calls: Mutex<Vec<Vec<Message>>>,
    echo_when_exhausted: bool,
}

impl ScriptedChatModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按顺序返回给定的文本回复
    pub fn with_replies<I, T>(replies: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let model = Self::new();
        for reply in replies {
            model.push_text(reply);
        }
        model
    }

    /// 预设回复用完后回显最后一条消息，而不是返回错误
    pub fn echoing() -> Self {
        Self {
            echo_when_exhausted: true,
            ..Self::default()
        }
    }

    pub fn push_text(&self, reply: impl Into<String>) {
        self.replies.lock().push_back(ScriptedReply::Text(reply.into()));
    }

    pub fn push_failure(&self, status: u16, message: impl Into<String>) {
        self.replies.lock().push_back(ScriptedReply::Failure {
            status,
            message: message.into(),
        });
    }

    /// 每次调用收到的完整消息列表
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().clone()
    }

    /// 每次调用最后一条消息的文本（即提示词）
    pub fn prompts(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|messages| messages.last().map(|m| m.text().to_string()))
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl ChatModel for ScriptedChatModel {
    async fn invoke(&self, messages: &[Message]) -> Result<String, ProviderError> {
        self.calls.lock().push(messages.to_vec());

        let next = self.replies.lock().pop_front();
        match next {
            Some(ScriptedReply::Text(text)) => Ok(text),
            Some(ScriptedReply::Failure { status, message }) => {
                Err(ProviderError::Api { status, message })
            }
            None if self.echo_when_exhausted => Ok(format!(
                "echo: {}",
                messages.last().map(Message::text).unwrap_or_default()
            )),
            None => Err(ProviderError::EmptyResponse),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replies_in_order_then_exhausted() {
        let model = ScriptedChatModel::with_replies(["first", "second"]);
        assert_eq!(model.invoke(&[Message::user("a")]).await.unwrap(), "first");
        assert_eq!(model.invoke(&[Message::user("b")]).await.unwrap(), "second");
        assert!(matches!(
            model.invoke(&[Message::user("c")]).await,
            Err(ProviderError::EmptyResponse)
        ));
        assert_eq!(model.prompts(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_failure_and_echo() {
        let model = ScriptedChatModel::echoing();
        model.push_failure(429, "Rate limit reached");

        let err = model.invoke(&[Message::user("x")]).await.unwrap_err();
        assert_eq!(err.status_code(), 429);
        assert_eq!(model.invoke(&[Message::user("x")]).await.unwrap(), "echo: x");
        assert_eq!(model.call_count(), 2);
    }
}

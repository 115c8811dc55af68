//! Groq 模型客户端
//!
//! Groq 提供 OpenAI 兼容的 `/chat/completions` 接口，
//! 模型名和温度在启动时配置一次，之后每次调用只传消息。

use crate::chat_model::{ChatModel, ProviderError};
use async_trait::async_trait;
use blogforge_core::config::ModelConfig;
use blogforge_core::logger::{sanitize_log_message, truncate_for_log};
use blogforge_core::models::openai::{
    ChatCompletionRequest, ChatCompletionResponse, UpstreamErrorResponse,
};
use blogforge_core::{ApiKey, Message};
use reqwest::Client;
use std::time::Duration;

/// Groq Chat Completion 客户端
pub struct GroqClient {
    client: Client,
    endpoint: String,
    api_key: ApiKey,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl GroqClient {
    /// 根据模型配置和已解析的凭证创建客户端
    pub fn new(config: &ModelConfig, api_key: ApiKey) -> Result<Self, ProviderError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| ProviderError::Client(e.to_string()))?;

        let endpoint = format!(
            "{}/chat/completions",
            config.base_url.trim_end_matches('/')
        );

        tracing::info!(
            "[GROQ] 初始化模型客户端: model={} temperature={} endpoint={}",
            config.model,
            config.temperature,
            endpoint
        );

        Ok(Self {
            client,
            endpoint,
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn upstream_message(body: &str) -> String {
        serde_json::from_str::<UpstreamErrorResponse>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| truncate_for_log(body, 500))
    }
}

#[async_trait]
impl ChatModel for GroqClient {
    async fn invoke(&self, messages: &[Message]) -> Result<String, ProviderError> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: messages.to_vec(),
            temperature: Some(self.temperature),
            max_tokens: self.max_tokens,
        };

        tracing::debug!(
            "[GROQ] 发送请求: model={} messages={}",
            self.model,
            messages.len()
        );

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose())
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let message = Self::upstream_message(&body);
            tracing::error!(
                "[GROQ] API 错误: {} - {}",
                status,
                sanitize_log_message(&message)
            );
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let response: ChatCompletionResponse = serde_json::from_str(&body)?;
        if let Some(usage) = &response.usage {
            tracing::debug!(
                "[GROQ] token 用量: prompt={} completion={}",
                usage.prompt_tokens,
                usage.completion_tokens
            );
        }

        response
            .first_text()
            .map(ToString::to_string)
            .ok_or(ProviderError::EmptyResponse)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

//! API 统一错误模型
//!
//! 为 Web 页面和 JSON API 提供稳定的错误语义，便于客户端统一处理。

use serde::{Deserialize, Serialize};

/// API 错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiErrorCode {
    InvalidRequest,
    NotFound,
    AuthenticationFailed,
    RateLimited,
    UpstreamTimeout,
    UpstreamUnavailable,
    UpstreamError,
    InternalError,
}

impl ApiErrorCode {
    /// 根据状态码和错误消息推断错误码
    pub fn infer(status_code: u16, message: &str) -> Self {
        let normalized = message.to_lowercase();

        if normalized.contains("timed out") || normalized.contains("timeout") {
            return Self::UpstreamTimeout;
        }

        if normalized.contains("rate limit") || normalized.contains("too many requests") {
            return Self::RateLimited;
        }

        match status_code {
            400 | 422 => Self::InvalidRequest,
            404 => Self::NotFound,
            401 | 403 => Self::AuthenticationFailed,
            429 => Self::RateLimited,
            408 | 504 => Self::UpstreamTimeout,
            503 => Self::UpstreamUnavailable,
            502 => Self::UpstreamError,
            500..=599 => Self::UpstreamError,
            _ => Self::InternalError,
        }
    }

    /// 对应的 HTTP 状态码
    pub fn http_status(self) -> u16 {
        match self {
            Self::InvalidRequest => 400,
            Self::NotFound => 404,
            // 凭证是服务端配置的，对调用方而言属于上游故障
            Self::AuthenticationFailed => 502,
            Self::RateLimited => 429,
            Self::UpstreamTimeout => 504,
            Self::UpstreamUnavailable => 503,
            Self::UpstreamError => 502,
            Self::InternalError => 500,
        }
    }

    /// 默认错误文案
    pub fn default_message(self) -> &'static str {
        match self {
            Self::InvalidRequest => "请求参数无效",
            Self::NotFound => "资源不存在",
            Self::AuthenticationFailed => "模型服务认证失败",
            Self::RateLimited => "请求过于频繁，请稍后重试",
            Self::UpstreamTimeout => "模型服务请求超时",
            Self::UpstreamUnavailable => "模型服务暂不可用",
            Self::UpstreamError => "模型服务返回错误",
            Self::InternalError => "服务内部错误",
        }
    }

    /// 是否可重试
    pub fn retryable(self) -> bool {
        matches!(
            self,
            Self::RateLimited
                | Self::UpstreamTimeout
                | Self::UpstreamUnavailable
                | Self::UpstreamError
        )
    }
}

/// 错误详情
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft_id: Option<String>,
}

impl ApiError {
    /// 创建错误详情，消息为空时使用默认文案
    pub fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        let final_message = if message.trim().is_empty() {
            code.default_message().to_string()
        } else {
            message
        };

        Self {
            code,
            message: final_message,
            retryable: code.retryable(),
            draft_id: None,
        }
    }

    /// 关联草稿 ID
    pub fn with_draft_id(mut self, draft_id: Option<&str>) -> Self {
        self.draft_id = draft_id.map(ToString::to_string);
        self
    }
}

/// 错误响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiError,
}

impl ApiErrorResponse {
    pub fn new(error: ApiError) -> Self {
        Self { error }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_from_status() {
        assert_eq!(ApiErrorCode::infer(401, ""), ApiErrorCode::AuthenticationFailed);
        assert_eq!(ApiErrorCode::infer(429, ""), ApiErrorCode::RateLimited);
        assert_eq!(ApiErrorCode::infer(503, ""), ApiErrorCode::UpstreamUnavailable);
        assert_eq!(ApiErrorCode::infer(404, ""), ApiErrorCode::NotFound);
        assert_eq!(ApiErrorCode::infer(0, "connection refused"), ApiErrorCode::InternalError);
    }

    #[test]
    fn test_infer_from_message() {
        assert_eq!(
            ApiErrorCode::infer(500, "Rate limit reached for model"),
            ApiErrorCode::RateLimited
        );
        assert_eq!(
            ApiErrorCode::infer(0, "operation timed out"),
            ApiErrorCode::UpstreamTimeout
        );
    }

    #[test]
    fn test_retryable_codes() {
        assert!(ApiErrorCode::RateLimited.retryable());
        assert!(ApiErrorCode::UpstreamTimeout.retryable());
        assert!(!ApiErrorCode::AuthenticationFailed.retryable());
        assert!(!ApiErrorCode::InvalidRequest.retryable());
    }

    #[test]
    fn test_empty_message_uses_default() {
        let err = ApiError::new(ApiErrorCode::NotFound, "  ").with_draft_id(Some("d-1"));
        assert_eq!(err.message, ApiErrorCode::NotFound.default_message());
        assert_eq!(err.draft_id.as_deref(), Some("d-1"));
        assert!(!err.retryable);
    }

    #[test]
    fn test_response_json_shape() {
        let body = ApiErrorResponse::new(ApiError::new(ApiErrorCode::RateLimited, "slow down"));
        let json = serde_json::to_value(body).unwrap();
        assert_eq!(json["error"]["code"], "RATE_LIMITED");
        assert_eq!(json["error"]["retryable"], true);
        assert!(json["error"].get("draftId").is_none());
    }
}

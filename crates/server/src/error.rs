//! 服务器错误类型

use axum::response::{IntoResponse, Response};
use blogforge_core::errors::ApiErrorCode;
use blogforge_core::logger::sanitize_log_message;
use blogforge_server_utils::build_error_response_with_meta;
use blogforge_services::content_creator::WorkflowError;
use thiserror::Error;

/// 服务启动与运行错误
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("绑定地址 {addr} 失败: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("服务运行失败: {0}")]
    Serve(#[source] std::io::Error),
}

/// 请求处理失败
///
/// JSON API 直接作为响应返回；页面处理器用它渲染错误面板。
#[derive(Debug, Clone)]
pub struct ApiFailure {
    pub code: ApiErrorCode,
    pub message: String,
    pub draft_id: Option<String>,
}

impl ApiFailure {
    pub fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            draft_id: None,
        }
    }

    pub fn status(&self) -> u16 {
        self.code.http_status()
    }
}

impl From<WorkflowError> for ApiFailure {
    fn from(err: WorkflowError) -> Self {
        let message = sanitize_log_message(&err.to_string());
        let (code, draft_id) = match &err {
            WorkflowError::EmptyIdea => (ApiErrorCode::InvalidRequest, None),
            WorkflowError::DraftNotFound(id) => (ApiErrorCode::NotFound, Some(id.clone())),
            WorkflowError::Model(e) => {
                // 上游的请求错误对调用方而言是模型服务故障
                let code = match ApiErrorCode::infer(e.status_code(), &message) {
                    ApiErrorCode::InvalidRequest | ApiErrorCode::NotFound => {
                        ApiErrorCode::UpstreamError
                    }
                    code => code,
                };
                (code, None)
            }
            _ => (ApiErrorCode::InternalError, None),
        };

        if code == ApiErrorCode::InternalError || code.retryable() {
            tracing::error!("[SERVER] 请求处理失败: {}", message);
        } else {
            tracing::warn!("[SERVER] 请求处理失败: {}", message);
        }

        Self {
            code,
            message,
            draft_id,
        }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        build_error_response_with_meta(
            self.status(),
            &self.message,
            self.draft_id.as_deref(),
            Some(self.code),
        )
    }
}

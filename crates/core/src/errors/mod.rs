//! 错误类型模块
//!
//! ## 模块结构
//! - `api_error`: 对外 API 的统一错误模型（错误码、可重试标记）
//! - `config_error`: 配置加载与凭证解析错误

pub mod api_error;
pub mod config_error;

pub use api_error::{ApiError, ApiErrorCode, ApiErrorResponse};
pub use config_error::ConfigError;

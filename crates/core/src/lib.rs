//! 核心类型和工具模块
//!
//! 包含 models, config, errors, logger 等基础功能

pub mod config;
pub mod errors;
pub mod logger;
pub mod models;

pub use config::{AppConfig, ApiKey};
pub use models::message::Message;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

//! 业务服务模块
//!
//! 包含博客创作工作流（状态、生成步骤、反馈路由、状态图）与草稿管理。

pub mod content_creator;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

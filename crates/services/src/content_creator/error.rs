//! 工作流错误类型

use super::graph::GraphError;
use blogforge_providers::ProviderError;
use thiserror::Error;

/// 工作流执行错误
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("博客想法不能为空")]
    EmptyIdea,
    #[error("状态中没有任何消息")]
    EmptyHistory,
    #[error("草稿不存在: {0}")]
    DraftNotFound(String),
    #[error("模型调用失败: {0}")]
    Model(#[from] ProviderError),
    #[error("节点 {from} 的路由返回了未声明的目标: {target}")]
    InvalidRoute { from: String, target: String },
    #[error("超过最大执行步数 {limit}")]
    RecursionLimit { limit: usize },
    #[error("工作流图无效: {0}")]
    Graph(#[from] GraphError),
}

impl WorkflowError {
    /// 对应的 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            WorkflowError::EmptyIdea => 400,
            WorkflowError::DraftNotFound(_) => 404,
            WorkflowError::Model(e) => e.status_code(),
            _ => 500,
        }
    }
}

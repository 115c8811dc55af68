//! 博客创作服务模块
//!
//! 提供 AI 辅助博客创作的核心后端服务，包括：
//! - 工作流状态与消息历史
//! - 标题/正文生成步骤
//! - 反馈路由
//! - 状态图的构建与执行
//! - 草稿管理

pub mod error;
pub mod feedback_router;
pub mod graph;
pub mod step_executor;
pub mod types;
pub mod workflow_service;

pub use error::WorkflowError;
pub use feedback_router::{feedback_router, route_feedback, FeedbackRoute};
pub use graph::{CompiledGraph, GraphError, GraphState, Node, StateGraph, END, START};
pub use step_executor::{generate_content, generate_title, ContentStep, PromptTemplates, TitleStep};
pub use types::*;
pub use workflow_service::{build_blog_graph, BlogWorkflowService, CONTENT_NODE, TITLE_NODE};

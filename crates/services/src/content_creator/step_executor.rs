//! 生成步骤
//!
//! 每个步骤读取状态、拼出一条提示词、调用一次模型，
//! 去除回复首尾空白后以状态增量的形式返回。模型错误直接向上传播。

use super::error::WorkflowError;
use super::graph::Node;
use super::types::{BlogState, StateUpdate};
use async_trait::async_trait;
use blogforge_core::config::{WorkflowConfig, IDEA_PLACEHOLDER, TITLE_PLACEHOLDER};
use blogforge_core::Message;
use blogforge_providers::ChatModel;
use std::sync::Arc;
use tracing::{debug, info};

/// 提示词模板
#[derive(Debug, Clone)]
pub struct PromptTemplates {
    title: String,
    content: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self::from_config(&WorkflowConfig::default())
    }
}

impl PromptTemplates {
    pub fn from_config(config: &WorkflowConfig) -> Self {
        Self {
            title: config.title_prompt.clone(),
            content: config.content_prompt.clone(),
        }
    }

    pub fn title_prompt(&self, idea: &str) -> String {
        self.title.replace(IDEA_PLACEHOLDER, idea)
    }

    pub fn content_prompt(&self, title: &str) -> String {
        self.content.replace(TITLE_PLACEHOLDER, title)
    }
}

/// 根据最近一条消息生成博客标题
///
/// 首次生成时最近一条消息是用户的想法；反馈之后则是反馈文本，
/// 此时提示词中的 `{idea}` 被反馈替换，最初的想法不会出现在提示词里。
pub async fn generate_title(
    model: &dyn ChatModel,
    prompts: &PromptTemplates,
    state: &BlogState,
) -> Result<StateUpdate, WorkflowError> {
    let idea = state
        .last_message()
        .ok_or(WorkflowError::EmptyHistory)?
        .text();
    let prompt = prompts.title_prompt(idea);
    debug!("[WORKFLOW] 生成标题，提示词长度: {}", prompt.len());

    let reply = model.invoke(&[Message::user(prompt)]).await?;
    let title = reply.trim().to_string();
    info!("[WORKFLOW] 标题已生成: {}", title);

    Ok(StateUpdate {
        title: Some(title.clone()),
        content: None,
        messages: vec![Message::assistant(title)],
    })
}

/// 根据当前标题生成博客正文
pub async fn generate_content(
    model: &dyn ChatModel,
    prompts: &PromptTemplates,
    state: &BlogState,
) -> Result<StateUpdate, WorkflowError> {
    if state.title().is_empty() {
        debug!("[WORKFLOW] 当前标题为空，仍按模板生成正文");
    }
    let prompt = prompts.content_prompt(state.title());

    let reply = model.invoke(&[Message::user(prompt)]).await?;
    let content = reply.trim().to_string();
    info!("[WORKFLOW] 正文已生成，长度: {} 字符", content.chars().count());

    Ok(StateUpdate {
        title: None,
        content: Some(content.clone()),
        messages: vec![Message::assistant(content)],
    })
}

/// 标题生成节点
pub struct TitleStep {
    model: Arc<dyn ChatModel>,
    prompts: Arc<PromptTemplates>,
}

impl TitleStep {
    pub fn new(model: Arc<dyn ChatModel>, prompts: Arc<PromptTemplates>) -> Self {
        Self { model, prompts }
    }
}

#[async_trait]
impl Node<BlogState> for TitleStep {
    async fn run(&self, state: &BlogState) -> Result<StateUpdate, WorkflowError> {
        generate_title(self.model.as_ref(), &self.prompts, state).await
    }
}

/// 正文生成节点
pub struct ContentStep {
    model: Arc<dyn ChatModel>,
    prompts: Arc<PromptTemplates>,
}

impl ContentStep {
    pub fn new(model: Arc<dyn ChatModel>, prompts: Arc<PromptTemplates>) -> Self {
        Self { model, prompts }
    }
}

#[async_trait]
impl Node<BlogState> for ContentStep {
    async fn run(&self, state: &BlogState) -> Result<StateUpdate, WorkflowError> {
        generate_content(self.model.as_ref(), &self.prompts, state).await
    }
}

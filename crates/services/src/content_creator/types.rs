//! 博客创作类型定义
//!
//! 定义工作流状态、状态增量和草稿等核心数据结构

use super::feedback_router::FeedbackRoute;
use super::graph::GraphState;
use blogforge_core::Message;
use serde::Serialize;

/// 博客工作流状态
///
/// `messages` 只追加不删除，至少包含种子用户消息；
/// `title` / `content` 在对应步骤运行前为空。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlogState {
    messages: Vec<Message>,
    title: String,
    content: String,
}

impl BlogState {
    /// 以用户想法作为种子消息创建状态
    pub fn seeded(idea: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(idea)],
            title: String::new(),
            content: String::new(),
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// 追加一条消息（用于写入用户反馈）
    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    #[cfg(test)]
    pub(crate) fn empty_for_test() -> Self {
        Self {
            messages: Vec::new(),
            title: String::new(),
            content: String::new(),
        }
    }
}

/// 生成步骤返回的状态增量
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    /// 追加到消息历史末尾
    pub messages: Vec<Message>,
}

impl GraphState for BlogState {
    type Update = StateUpdate;

    fn apply(&mut self, update: StateUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(content) = update.content {
            self.content = content;
        }
        self.messages.extend(update.messages);
    }
}

/// 博客草稿（进程内会话）
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogDraft {
    pub id: String,
    pub state: BlogState,
    /// 实际触发了重新生成的反馈轮数
    pub revisions: u32,
    pub created_at: i64,
    pub updated_at: i64,
}

/// 草稿列表项
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSummary {
    pub id: String,
    pub title: String,
    pub revisions: u32,
    pub updated_at: i64,
}

impl From<&BlogDraft> for DraftSummary {
    fn from(draft: &BlogDraft) -> Self {
        Self {
            id: draft.id.clone(),
            title: draft.state.title().to_string(),
            revisions: draft.revisions,
            updated_at: draft.updated_at,
        }
    }
}

/// 反馈处理结果
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackOutcome {
    pub route: FeedbackRoute,
    pub draft: BlogDraft,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_state() {
        let state = BlogState::seeded("a robot learns to paint");
        assert_eq!(state.messages().len(), 1);
        assert_eq!(state.last_message(), Some(&Message::user("a robot learns to paint")));
        assert!(state.title().is_empty());
        assert!(state.content().is_empty());
    }

    #[test]
    fn test_apply_appends_and_overwrites() {
        let mut state = BlogState::seeded("idea");
        state.apply(StateUpdate {
            title: Some("First".to_string()),
            content: None,
            messages: vec![Message::assistant("First")],
        });
        state.apply(StateUpdate {
            title: Some("Second".to_string()),
            content: None,
            messages: vec![Message::assistant("Second")],
        });

        assert_eq!(state.title(), "Second");
        assert!(state.content().is_empty());
        assert_eq!(
            state.messages(),
            &[
                Message::user("idea"),
                Message::assistant("First"),
                Message::assistant("Second"),
            ]
        );
    }

    #[test]
    fn test_state_serializes_messages_with_roles() {
        let json = serde_json::to_value(BlogState::seeded("idea")).unwrap();
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["title"], "");
    }
}

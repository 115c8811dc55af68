//! 反馈路由
//!
//! 根据用户反馈文本决定下一步：重新生成标题、重新生成正文或结束。
//! 匹配不区分大小写，按固定顺序检查关键词，先匹配者生效：
//!
//! 1. `change title`   → 标题
//! 2. `change content` → 正文
//! 3. `change both`    → 标题（随后正文也会重新生成）
//! 4. 其他             → 结束

use super::graph::END;
use super::types::BlogState;
use super::workflow_service::{CONTENT_NODE, TITLE_NODE};
use serde::Serialize;

/// 反馈路由目标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackRoute {
    Title,
    Content,
    End,
}

impl FeedbackRoute {
    /// 目标节点名
    pub fn node_name(self) -> &'static str {
        match self {
            FeedbackRoute::Title => TITLE_NODE,
            FeedbackRoute::Content => CONTENT_NODE,
            FeedbackRoute::End => END,
        }
    }

    /// 是否会触发重新生成
    pub fn regenerates(self) -> bool {
        !matches!(self, FeedbackRoute::End)
    }
}

const ROUTING_KEYWORDS: [(&str, FeedbackRoute); 3] = [
    ("change title", FeedbackRoute::Title),
    ("change content", FeedbackRoute::Content),
    ("change both", FeedbackRoute::Title),
];

/// 根据反馈文本选择路由
pub fn route_feedback(feedback: &str) -> FeedbackRoute {
    let normalized = feedback.to_lowercase();
    ROUTING_KEYWORDS
        .iter()
        .find(|(keyword, _)| normalized.contains(keyword))
        .map(|(_, route)| *route)
        .unwrap_or(FeedbackRoute::End)
}

/// 状态图的条件边函数
///
/// 只有最后一条消息来自用户时才按反馈路由；
/// 最后一条是模型回复（例如刚生成的正文）时直接结束。
pub fn feedback_router(state: &BlogState) -> String {
    let route = match state.last_message() {
        Some(message) if message.is_user() => route_feedback(message.text()),
        _ => FeedbackRoute::End,
    };
    tracing::debug!("[WORKFLOW] 反馈路由: {:?}", route);
    route.node_name().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content_creator::graph::GraphState;
    use crate::content_creator::types::StateUpdate;
    use blogforge_core::Message;
    use proptest::prelude::*;

    #[test]
    fn test_change_title_routes_to_title() {
        assert_eq!(route_feedback("change title"), FeedbackRoute::Title);
        assert_eq!(
            route_feedback("please change title to something catchier"),
            FeedbackRoute::Title
        );
    }

    #[test]
    fn test_change_content_routes_to_content() {
        assert_eq!(route_feedback("change content"), FeedbackRoute::Content);
    }

    #[test]
    fn test_change_both_routes_to_title() {
        assert_eq!(route_feedback("change both"), FeedbackRoute::Title);
    }

    #[test]
    fn test_no_keyword_routes_to_end() {
        assert_eq!(route_feedback("looks great"), FeedbackRoute::End);
        assert_eq!(route_feedback(""), FeedbackRoute::End);
        assert_eq!(route_feedback("change the title"), FeedbackRoute::End);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(route_feedback("CHANGE TITLE"), FeedbackRoute::Title);
        assert_eq!(route_feedback("Change Content"), FeedbackRoute::Content);
    }

    #[test]
    fn test_first_match_wins() {
        assert_eq!(
            route_feedback("change title and change content"),
            FeedbackRoute::Title
        );
        assert_eq!(
            route_feedback("change content and change title"),
            FeedbackRoute::Title
        );
        assert_eq!(
            route_feedback("change content, or change both"),
            FeedbackRoute::Content
        );
    }

    #[test]
    fn test_router_ends_after_model_reply() {
        let mut state = BlogState::seeded("idea");
        state.apply(StateUpdate {
            title: None,
            content: Some("change title".to_string()),
            messages: vec![Message::assistant("change title")],
        });
        assert_eq!(feedback_router(&state), END);
    }

    #[test]
    fn test_router_follows_user_feedback() {
        let mut state = BlogState::seeded("idea");
        state.push_message(Message::user("Change Content please"));
        assert_eq!(feedback_router(&state), CONTENT_NODE);
    }

    #[test]
    fn test_router_on_empty_history() {
        assert_eq!(feedback_router(&BlogState::empty_for_test()), END);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_routing_ignores_case(text in "[a-zA-Z ]{0,40}") {
            prop_assert_eq!(
                route_feedback(&text.to_uppercase()),
                route_feedback(&text.to_lowercase())
            );
        }

        #[test]
        fn prop_title_keyword_always_wins(
            prefix in "[a-z ]{0,20}",
            suffix in "[a-z ]{0,20}",
        ) {
            let text = format!("{prefix}change title{suffix}");
            prop_assert_eq!(route_feedback(&text), FeedbackRoute::Title);
        }

        #[test]
        fn prop_text_without_change_ends(text in "[a-bd-z ]{0,40}") {
            // 不含字母 c 的文本不可能包含任何关键词
            prop_assert_eq!(route_feedback(&text), FeedbackRoute::End);
        }
    }
}

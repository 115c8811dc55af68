//! 工作流服务
//!
//! 构建博客生成状态图，并管理进程内草稿的生命周期。
//! 反馈总是作用在草稿已有的状态上：写入一条用户消息后从正文节点的出边继续执行。

use super::error::WorkflowError;
use super::feedback_router::{feedback_router, route_feedback, FeedbackRoute};
use super::graph::{CompiledGraph, StateGraph, END, START};
use super::step_executor::{ContentStep, PromptTemplates, TitleStep};
use super::types::*;
use blogforge_core::config::WorkflowConfig;
use blogforge_core::Message;
use blogforge_providers::ChatModel;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// 标题生成节点名
pub const TITLE_NODE: &str = "title_generator";
/// 正文生成节点名
pub const CONTENT_NODE: &str = "content_generator";

/// 构建博客生成状态图
///
/// `START → title_generator → content_generator → {title_generator | content_generator | END}`
pub fn build_blog_graph(
    model: Arc<dyn ChatModel>,
    prompts: Arc<PromptTemplates>,
    recursion_limit: usize,
) -> Result<CompiledGraph<BlogState>, WorkflowError> {
    let mut graph: StateGraph<BlogState> = StateGraph::new();

    graph
        .add_node(TITLE_NODE, TitleStep::new(model.clone(), prompts.clone()))
        .add_node(CONTENT_NODE, ContentStep::new(model, prompts))
        .add_edge(START, TITLE_NODE)
        .add_edge(TITLE_NODE, CONTENT_NODE)
        .add_edge(CONTENT_NODE, END)
        .add_conditional_edges(
            CONTENT_NODE,
            feedback_router,
            [TITLE_NODE, CONTENT_NODE, END],
        );

    Ok(graph.compile_with_limit(recursion_limit)?)
}

/// 草稿及其反馈锁
struct DraftSlot {
    draft: BlogDraft,
    /// 同一草稿的反馈串行执行
    feedback_lock: Arc<Mutex<()>>,
}

impl DraftSlot {
    fn new(draft: BlogDraft) -> Self {
        Self {
            draft,
            feedback_lock: Arc::new(Mutex::new(())),
        }
    }
}

/// 博客工作流服务
pub struct BlogWorkflowService {
    graph: Arc<CompiledGraph<BlogState>>,
    /// 活跃的草稿（内存缓存）
    drafts: Arc<RwLock<HashMap<String, DraftSlot>>>,
    /// 草稿保留时长（毫秒），None 表示不过期
    draft_ttl_ms: Option<i64>,
}

impl BlogWorkflowService {
    /// 创建新的工作流服务
    pub fn new(model: Arc<dyn ChatModel>, config: &WorkflowConfig) -> Result<Self, WorkflowError> {
        let prompts = Arc::new(PromptTemplates::from_config(config));
        let graph = build_blog_graph(model, prompts, config.recursion_limit)?;
        let draft_ttl_ms = match config.draft_ttl_minutes {
            0 => None,
            minutes => {
                let ttl_ms = i64::try_from(minutes)
                    .ok()
                    .and_then(|m| m.checked_mul(60_000));
                if ttl_ms.is_none() {
                    warn!("[WORKFLOW] draft_ttl_minutes={} 超出范围，草稿不会过期", minutes);
                }
                ttl_ms
            }
        };

        info!(
            "[WORKFLOW] 博客工作流已就绪: recursion_limit={} draft_ttl_minutes={}",
            graph.recursion_limit(),
            config.draft_ttl_minutes
        );

        Ok(Self {
            graph: Arc::new(graph),
            drafts: Arc::new(RwLock::new(HashMap::new())),
            draft_ttl_ms,
        })
    }

    /// 根据想法生成标题和正文，并保存为新草稿
    pub async fn create_draft(&self, idea: &str) -> Result<BlogDraft, WorkflowError> {
        let idea = idea.trim();
        if idea.is_empty() {
            return Err(WorkflowError::EmptyIdea);
        }

        let state = self.graph.invoke(BlogState::seeded(idea)).await?;

        let now = chrono::Utc::now().timestamp_millis();
        let draft = BlogDraft {
            id: Uuid::new_v4().to_string(),
            state,
            revisions: 0,
            created_at: now,
            updated_at: now,
        };

        let mut drafts = self.drafts.write().await;
        drafts.insert(draft.id.clone(), DraftSlot::new(draft.clone()));

        info!("[WORKFLOW] 创建草稿: {}", draft.id);
        Ok(draft)
    }

    /// 根据反馈重新生成标题或正文
    ///
    /// 反馈作为一条用户消息追加到草稿的消息历史后，从正文节点继续执行。
    /// 标题节点读取最后一条消息，因此重新生成标题时反馈文本本身就是新的
    /// 提示内容，最初的想法只保留在消息历史里，不再进入提示词。
    ///
    /// 同一草稿的反馈按到达顺序串行执行，执行失败时草稿保持不变。
    pub async fn apply_feedback(
        &self,
        draft_id: &str,
        feedback: &str,
    ) -> Result<FeedbackOutcome, WorkflowError> {
        let feedback_lock = {
            let drafts = self.drafts.read().await;
            drafts.get(draft_id).map(|slot| slot.feedback_lock.clone())
        }
        .ok_or_else(|| WorkflowError::DraftNotFound(draft_id.to_string()))?;
        let _guard = feedback_lock.lock().await;

        // 持有反馈锁后再读取，草稿表的锁不跨模型调用持有
        let draft = self
            .get_draft(draft_id)
            .await
            .ok_or_else(|| WorkflowError::DraftNotFound(draft_id.to_string()))?;

        let feedback = feedback.trim();
        if feedback.is_empty() {
            debug!("[WORKFLOW] 反馈为空，草稿 {} 保持不变", draft_id);
            return Ok(FeedbackOutcome {
                route: FeedbackRoute::End,
                draft,
            });
        }

        let route = route_feedback(feedback);
        info!("[WORKFLOW] 草稿 {} 收到反馈，路由: {:?}", draft_id, route);

        let mut state = draft.state.clone();
        state.push_message(Message::user(feedback));
        let state = self.graph.resume(state, CONTENT_NODE).await?;

        let mut drafts = self.drafts.write().await;
        let stored = drafts
            .get_mut(draft_id)
            .map(|slot| &mut slot.draft)
            .ok_or_else(|| WorkflowError::DraftNotFound(draft_id.to_string()))?;
        stored.state = state;
        if route.regenerates() {
            stored.revisions += 1;
        }
        stored.updated_at = chrono::Utc::now().timestamp_millis();

        Ok(FeedbackOutcome {
            route,
            draft: stored.clone(),
        })
    }

    /// 获取草稿
    pub async fn get_draft(&self, draft_id: &str) -> Option<BlogDraft> {
        let drafts = self.drafts.read().await;
        drafts.get(draft_id).map(|slot| slot.draft.clone())
    }

    /// 最近更新的草稿列表
    pub async fn list_drafts(&self, limit: usize) -> Vec<DraftSummary> {
        let drafts = self.drafts.read().await;
        let mut summaries: Vec<DraftSummary> = drafts
            .values()
            .map(|slot| DraftSummary::from(&slot.draft))
            .collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        summaries.truncate(limit);
        summaries
    }

    /// 删除草稿，返回是否存在
    pub async fn delete_draft(&self, draft_id: &str) -> bool {
        let mut drafts = self.drafts.write().await;
        let removed = drafts.remove(draft_id).is_some();
        if removed {
            info!("[WORKFLOW] 删除草稿: {}", draft_id);
        }
        removed
    }

    /// 清理过期草稿
    pub async fn evict_expired(&self) -> usize {
        let Some(ttl_ms) = self.draft_ttl_ms else {
            return 0;
        };
        let cutoff_ms = chrono::Utc::now().timestamp_millis().saturating_sub(ttl_ms);
        self.evict_older_than(cutoff_ms).await
    }

    async fn evict_older_than(&self, cutoff_ms: i64) -> usize {
        let mut drafts = self.drafts.write().await;
        let before = drafts.len();
        drafts.retain(|_, slot| slot.draft.updated_at >= cutoff_ms);
        let count = before - drafts.len();

        if count > 0 {
            warn!("[WORKFLOW] 清理了 {} 个过期草稿", count);
        }
        count
    }

    pub async fn draft_count(&self) -> usize {
        self.drafts.read().await.len()
    }
}

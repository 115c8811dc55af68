//! 状态图
//!
//! 一个小型的有向图执行器：注册节点和边，编译后以状态为输入执行。
//!
//! ```rust,ignore
//! let mut graph = StateGraph::new();
//! graph
//!     .add_node("title_generator", title_step)
//!     .add_node("content_generator", content_step)
//!     .add_edge(START, "title_generator")
//!     .add_edge("title_generator", "content_generator")
//!     .add_conditional_edges("content_generator", feedback_router, [TITLE_NODE, END]);
//!
//! let app = graph.compile()?;
//! let final_state = app.invoke(initial_state).await?;
//! ```
//!
//! 同一节点同时存在普通边和条件边时，条件边优先。

use super::error::WorkflowError;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;

/// 入口节点名
pub const START: &str = "__start__";
/// 终止节点名
pub const END: &str = "__end__";

/// 默认最大执行步数
pub const DEFAULT_RECURSION_LIMIT: usize = 25;

/// 图状态
///
/// 节点返回增量，由状态自己决定如何合并。
pub trait GraphState: Clone + Send + Sync + 'static {
    type Update: Send;

    fn apply(&mut self, update: Self::Update);
}

/// 图节点
#[async_trait]
pub trait Node<S: GraphState>: Send + Sync {
    async fn run(&self, state: &S) -> Result<S::Update, WorkflowError>;
}

/// 图结构错误（编译期）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("没有从 START 出发的边")]
    NoEntryPoint,
    #[error("节点不存在: {0}")]
    NodeNotFound(String),
    #[error("节点重复注册: {0}")]
    DuplicateNode(String),
    #[error("节点名为保留名: {0}")]
    ReservedName(String),
    #[error("节点 {0} 存在多条普通出边")]
    DuplicateEdge(String),
    #[error("节点 {0} 没有出边")]
    NoOutgoingEdge(String),
    #[error("节点 {0} 的条件边没有声明任何目标")]
    EmptyRoutes(String),
}

type RouterFn<S> = Arc<dyn Fn(&S) -> String + Send + Sync>;

struct ConditionalEdge<S> {
    router: RouterFn<S>,
    targets: HashSet<String>,
}

/// 状态图构建器
pub struct StateGraph<S: GraphState> {
    nodes: HashMap<String, Arc<dyn Node<S>>>,
    edges: HashMap<String, String>,
    conditional_edges: HashMap<String, ConditionalEdge<S>>,
    /// 构建阶段发现的问题，编译时统一报告
    pending_errors: Vec<GraphError>,
}

impl<S: GraphState> Default for StateGraph<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: GraphState> StateGraph<S> {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: HashMap::new(),
            conditional_edges: HashMap::new(),
            pending_errors: Vec::new(),
        }
    }

    /// 注册节点
    pub fn add_node<N>(&mut self, name: impl Into<String>, node: N) -> &mut Self
    where
        N: Node<S> + 'static,
    {
        let name = name.into();
        if name == START || name == END {
            self.pending_errors.push(GraphError::ReservedName(name));
            return self;
        }
        if self.nodes.insert(name.clone(), Arc::new(node)).is_some() {
            self.pending_errors.push(GraphError::DuplicateNode(name));
        }
        self
    }

    /// 添加普通边
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        let from = from.into();
        if self.edges.insert(from.clone(), to.into()).is_some() {
            self.pending_errors.push(GraphError::DuplicateEdge(from));
        }
        self
    }

    /// 添加条件边
    ///
    /// `router` 根据状态返回下一个节点名，`targets` 声明所有可能的目标用于校验。
    pub fn add_conditional_edges<F, I, T>(
        &mut self,
        from: impl Into<String>,
        router: F,
        targets: I,
    ) -> &mut Self
    where
        F: Fn(&S) -> String + Send + Sync + 'static,
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let edge = ConditionalEdge {
            router: Arc::new(router),
            targets: targets.into_iter().map(Into::into).collect(),
        };
        self.conditional_edges.insert(from.into(), edge);
        self
    }

    /// 使用默认步数上限编译
    pub fn compile(self) -> Result<CompiledGraph<S>, GraphError> {
        self.compile_with_limit(DEFAULT_RECURSION_LIMIT)
    }

    /// 校验图结构并编译
    pub fn compile_with_limit(self, recursion_limit: usize) -> Result<CompiledGraph<S>, GraphError> {
        if let Some(err) = self.pending_errors.into_iter().next() {
            return Err(err);
        }

        if !self.edges.contains_key(START) && !self.conditional_edges.contains_key(START) {
            return Err(GraphError::NoEntryPoint);
        }

        let is_known = |name: &str| name == END || self.nodes.contains_key(name);
        let is_source = |name: &str| name == START || self.nodes.contains_key(name);

        for (from, to) in &self.edges {
            if !is_source(from) {
                return Err(GraphError::NodeNotFound(from.clone()));
            }
            if !is_known(to) {
                return Err(GraphError::NodeNotFound(to.clone()));
            }
        }

        for (from, edge) in &self.conditional_edges {
            if !is_source(from) {
                return Err(GraphError::NodeNotFound(from.clone()));
            }
            if edge.targets.is_empty() {
                return Err(GraphError::EmptyRoutes(from.clone()));
            }
            if let Some(target) = edge.targets.iter().find(|t| !is_known(t)) {
                return Err(GraphError::NodeNotFound(target.clone()));
            }
            if self.edges.contains_key(from) {
                tracing::warn!("[WORKFLOW] 节点 {} 同时存在普通边和条件边，条件边优先", from);
            }
        }

        if let Some(name) = self
            .nodes
            .keys()
            .find(|name| !self.edges.contains_key(*name) && !self.conditional_edges.contains_key(*name))
        {
            return Err(GraphError::NoOutgoingEdge(name.clone()));
        }

        Ok(CompiledGraph {
            nodes: self.nodes,
            edges: self.edges,
            conditional_edges: self.conditional_edges,
            recursion_limit: recursion_limit.max(1),
        })
    }
}

/// 编译后的状态图
pub struct CompiledGraph<S: GraphState> {
    nodes: HashMap<String, Arc<dyn Node<S>>>,
    edges: HashMap<String, String>,
    conditional_edges: HashMap<String, ConditionalEdge<S>>,
    recursion_limit: usize,
}

impl<S: GraphState> CompiledGraph<S> {
    /// 从 START 开始执行，直到到达 END
    pub async fn invoke(&self, state: S) -> Result<S, WorkflowError> {
        self.run_from(state, START).await
    }

    /// 从指定节点的出边继续执行（该节点本身不会重新运行）
    pub async fn resume(&self, state: S, from: &str) -> Result<S, WorkflowError> {
        if from != START && !self.nodes.contains_key(from) {
            return Err(GraphError::NodeNotFound(from.to_string()).into());
        }
        self.run_from(state, from).await
    }

    pub fn recursion_limit(&self) -> usize {
        self.recursion_limit
    }

    pub fn contains_node(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    async fn run_from(&self, mut state: S, from: &str) -> Result<S, WorkflowError> {
        let mut current = self.next_node(&state, from)?;
        let mut steps = 0usize;

        while current != END {
            if steps >= self.recursion_limit {
                tracing::warn!(
                    "[WORKFLOW] 超过最大执行步数 {}，停止于节点 {}",
                    self.recursion_limit,
                    current
                );
                return Err(WorkflowError::RecursionLimit {
                    limit: self.recursion_limit,
                });
            }

            let node = self
                .nodes
                .get(&current)
                .ok_or_else(|| GraphError::NodeNotFound(current.clone()))?;

            tracing::debug!("[WORKFLOW] 执行节点: {}", current);
            let update = node.run(&state).await?;
            state.apply(update);
            steps += 1;

            current = self.next_node(&state, &current)?;
        }

        tracing::debug!("[WORKFLOW] 执行结束，共运行 {} 个节点", steps);
        Ok(state)
    }

    fn next_node(&self, state: &S, from: &str) -> Result<String, WorkflowError> {
        if let Some(edge) = self.conditional_edges.get(from) {
            let target = (edge.router)(state);
            if !edge.targets.contains(&target) {
                return Err(WorkflowError::InvalidRoute {
                    from: from.to_string(),
                    target,
                });
            }
            return Ok(target);
        }

        self.edges
            .get(from)
            .cloned()
            .ok_or_else(|| GraphError::NoOutgoingEdge(from.to_string()).into())
    }
}

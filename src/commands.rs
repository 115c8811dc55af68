//! 子命令实现

use anyhow::{bail, Context};
use blogforge_core::config::AppConfig;
use blogforge_core::errors::ConfigError;
use blogforge_core::ApiKey;
use blogforge_providers::{ChatModel, GroqClient};
use blogforge_server::AppState;
use blogforge_services::content_creator::{BlogDraft, BlogWorkflowService, FeedbackRoute};
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// `.env` 文件中的变量
///
/// 只读取，不写入进程环境变量。
pub type DotEnvVars = HashMap<String, String>;

/// 读取当前目录（或上级目录）中的 `.env`，不存在时返回空表
pub fn load_dotenv() -> DotEnvVars {
    collect_dotenv(dotenvy::dotenv_iter())
}

/// 读取指定的 `.env` 文件
pub fn load_dotenv_from(path: &Path) -> DotEnvVars {
    collect_dotenv(dotenvy::from_path_iter(path))
}

fn collect_dotenv(iter: dotenvy::Result<dotenvy::Iter<File>>) -> DotEnvVars {
    let Ok(iter) = iter else {
        return DotEnvVars::new();
    };
    let vars: DotEnvVars = iter
        .filter_map(|item| match item {
            Ok(pair) => Some(pair),
            Err(e) => {
                tracing::warn!("[CONFIG] 忽略无法解析的 .env 行: {}", e);
                None
            }
        })
        .collect();
    if !vars.is_empty() {
        tracing::debug!("[CONFIG] 已读取 .env，共 {} 个变量", vars.len());
    }
    vars
}

/// 解析 API 密钥：进程环境变量 > `.env` > 配置文件
pub fn resolve_api_key(config: &AppConfig, dotenv: &DotEnvVars) -> Result<ApiKey, ConfigError> {
    config.model.resolve_api_key_with(|name| {
        std::env::var(name)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| dotenv.get(name).cloned())
    })
}

/// 解析凭证并创建工作流服务
pub fn build_service(
    config: &AppConfig,
    dotenv: &DotEnvVars,
) -> anyhow::Result<Arc<BlogWorkflowService>> {
    let api_key = resolve_api_key(config, dotenv).context("无法获取模型 API 密钥")?;
    let client = GroqClient::new(&config.model, api_key)?;
    info!(
        "[CONFIG] 模型: {} ({})",
        client.model_name(),
        client.endpoint()
    );

    let service = BlogWorkflowService::new(Arc::new(client), &config.workflow)?;
    Ok(Arc::new(service))
}

/// 启动 Web 服务
pub async fn run_serve(
    mut config: AppConfig,
    host: Option<String>,
    port: Option<u16>,
    dotenv: &DotEnvVars,
) -> anyhow::Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let service = build_service(&config, dotenv)?;
    blogforge_server::serve(AppState::new(service), &config.server).await?;
    Ok(())
}

/// 生成草稿并依次应用反馈，结果写入 `out`
pub async fn run_draft<W: Write>(
    service: &BlogWorkflowService,
    idea: &str,
    feedback: &[String],
    out: &mut W,
) -> anyhow::Result<()> {
    let draft = service.create_draft(idea).await?;
    out.write_all(format_draft(&draft).as_bytes())?;

    for text in feedback {
        let outcome = service.apply_feedback(&draft.id, text).await?;
        writeln!(out, "\n---\n> {}  ({})\n", text.trim(), route_label(outcome.route))?;
        if outcome.route.regenerates() {
            out.write_all(format_draft(&outcome.draft).as_bytes())?;
        }
    }
    Ok(())
}

/// 写入默认配置文件
pub fn run_init_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!("配置文件已存在: {}（使用 --force 覆盖）", path.display());
    }
    AppConfig::default().save(path)?;
    info!("[CONFIG] 已写入默认配置: {}", path.display());
    Ok(())
}

pub fn format_draft(draft: &BlogDraft) -> String {
    format!("# {}\n\n{}\n", draft.state.title(), draft.state.content())
}

fn route_label(route: FeedbackRoute) -> &'static str {
    match route {
        FeedbackRoute::Title => "regenerated title and content",
        FeedbackRoute::Content => "regenerated content",
        FeedbackRoute::End => "no changes",
    }
}

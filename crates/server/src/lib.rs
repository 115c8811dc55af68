//! Web 服务器模块
//!
//! 包含表单页面、JSON API、健康检查和服务启动

pub mod error;
pub mod handlers;
pub mod templates;

pub use error::{ApiFailure, ServerError};

use axum::{
    routing::{get, post},
    Router,
};
use blogforge_core::config::ServerConfig;
use blogforge_services::content_creator::BlogWorkflowService;
use std::sync::Arc;
use std::time::Duration;
use tower_http::limit::RequestBodyLimitLayer;

/// 过期草稿清理间隔
const EVICTION_INTERVAL: Duration = Duration::from_secs(60);

/// 请求处理共享状态
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<BlogWorkflowService>,
}

impl AppState {
    pub fn new(service: Arc<BlogWorkflowService>) -> Self {
        Self { service }
    }
}

/// 构建路由
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let pages = Router::new()
        .route("/", get(handlers::pages::index))
        .route("/draft", post(handlers::pages::create_draft))
        .route("/feedback", post(handlers::pages::submit_feedback));

    let api = Router::new()
        .route(
            "/api/drafts",
            post(handlers::api::create_draft).get(handlers::api::list_drafts),
        )
        .route(
            "/api/drafts/:id",
            get(handlers::api::get_draft).delete(handlers::api::delete_draft),
        )
        .route("/api/drafts/:id/feedback", post(handlers::api::submit_feedback));

    Router::new()
        .merge(pages)
        .merge(api)
        .route("/health", get(handlers::health))
        .layer(RequestBodyLimitLayer::new(config.body_limit_bytes))
        .with_state(state)
}

/// 启动 Web 服务，直到收到 Ctrl+C
pub async fn serve(state: AppState, config: &ServerConfig) -> Result<(), ServerError> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;

    let eviction = spawn_eviction_task(state.service.clone());
    let app = build_router(state, config);

    tracing::info!("[SERVER] 服务已启动: http://{}", addr);
    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;
    eviction.abort();

    result.map_err(ServerError::Serve)?;
    tracing::info!("[SERVER] 服务已停止");
    Ok(())
}

fn spawn_eviction_task(service: Arc<BlogWorkflowService>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(EVICTION_INTERVAL);
        loop {
            interval.tick().await;
            service.evict_expired().await;
        }
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("[SERVER] 监听退出信号失败: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("[SERVER] 收到退出信号，正在关闭");
}

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use blogforge_core::config::WorkflowConfig;
    use blogforge_providers::scripted::ScriptedChatModel;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app_with(model: ScriptedChatModel) -> Router {
        let service =
            BlogWorkflowService::new(Arc::new(model), &WorkflowConfig::default()).unwrap();
        build_router(AppState::new(Arc::new(service)), &ServerConfig::default())
    }

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        let body = body.to_string();
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::CONTENT_LENGTH, body.len())
            .body(Body::from(body))
            .unwrap()
    }

    fn form_request(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        serde_json::from_str(&body_text(response).await).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = app_with(ScriptedChatModel::new());
        let response = send(&app, get("/health")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], version());
    }

    #[tokio::test]
    async fn test_index_page() {
        let app = app_with(ScriptedChatModel::new());
        let response = send(&app, get("/")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("AI Blog Generator"));
    }

    #[tokio::test]
    async fn test_blank_idea_form_shows_notice_without_model_call() {
        let model = ScriptedChatModel::new();
        let app = app_with(model);
        let response = send(&app, form_request("/draft", "idea=++")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response)
            .await
            .contains("Please enter a blog idea to get started."));
    }

    #[tokio::test]
    async fn test_form_draft_then_feedback() {
        let app = app_with(ScriptedChatModel::with_replies([
            "Brushstrokes of Steel",
            "A **robot** picked up a brush.",
            "Content v2",
        ]));

        let response = send(&app, form_request("/draft", "idea=a+robot+learns+to+paint")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Brushstrokes of Steel"));
        assert!(html.contains("<strong>robot</strong>"));

        let marker = r#"name="draft_id" value=""#;
        let start = html.find(marker).unwrap() + marker.len();
        let draft_id = &html[start..start + html[start..].find('"').unwrap()];

        let body = format!("draft_id={draft_id}&feedback=change+content");
        let response = send(&app, form_request("/feedback", &body)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Updated Blog Content:"));
        assert!(html.contains("Content v2"));
        assert!(html.contains("Brushstrokes of Steel"));
    }

    #[tokio::test]
    async fn test_form_feedback_unknown_draft_shows_error_panel() {
        let app = app_with(ScriptedChatModel::new());
        let response = send(&app, form_request("/feedback", "draft_id=nope&feedback=x")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains(r#"class="error""#));
    }

    #[tokio::test]
    async fn test_api_draft_lifecycle() {
        let app = app_with(ScriptedChatModel::with_replies([
            "Title 1", "Content 1", "Title 2", "Content 2",
        ]));

        let response = send(
            &app,
            json_request("POST", "/api/drafts", json!({"idea": "a robot learns to paint"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let draft = body_json(response).await;
        let id = draft["id"].as_str().unwrap().to_string();
        assert_eq!(draft["state"]["title"], "Title 1");
        assert_eq!(draft["state"]["messages"].as_array().unwrap().len(), 3);

        let response = send(
            &app,
            json_request(
                "POST",
                &format!("/api/drafts/{id}/feedback"),
                json!({"feedback": "Change Title please"}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let outcome = body_json(response).await;
        assert_eq!(outcome["route"], "title");
        assert_eq!(outcome["draft"]["state"]["title"], "Title 2");
        assert_eq!(outcome["draft"]["state"]["content"], "Content 2");
        assert_eq!(outcome["draft"]["revisions"], 1);

        let response = send(&app, get("/api/drafts")).await;
        let list = body_json(response).await;
        assert_eq!(list.as_array().unwrap().len(), 1);
        assert_eq!(list[0]["title"], "Title 2");

        let response = send(&app, get(&format!("/api/drafts/{id}"))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let delete = Request::builder()
            .method("DELETE")
            .uri(format!("/api/drafts/{id}"))
            .body(Body::empty())
            .unwrap();
        assert_eq!(send(&app, delete).await.status(), StatusCode::NO_CONTENT);

        let response = send(&app, get(&format!("/api/drafts/{id}"))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "NOT_FOUND");
        assert_eq!(json["error"]["draftId"], id.as_str());
    }

    #[tokio::test]
    async fn test_api_blank_idea_is_bad_request() {
        let app = app_with(ScriptedChatModel::new());
        let response = send(&app, json_request("POST", "/api/drafts", json!({"idea": " "}))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn test_api_model_failure_maps_to_upstream_code() {
        let model = ScriptedChatModel::new();
        model.push_failure(429, "Rate limit reached for model");
        let app = app_with(model);

        let response = send(&app, json_request("POST", "/api/drafts", json!({"idea": "x"}))).await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "RATE_LIMITED");
        assert_eq!(json["error"]["retryable"], true);

        let list = body_json(send(&app, get("/api/drafts")).await).await;
        assert!(list.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_body_limit() {
        let service = BlogWorkflowService::new(
            Arc::new(ScriptedChatModel::echoing()),
            &WorkflowConfig::default(),
        )
        .unwrap();
        let config = ServerConfig {
            body_limit_bytes: 16,
            ..ServerConfig::default()
        };
        let app = build_router(AppState::new(Arc::new(service)), &config);

        let idea = "x".repeat(64);
        let response = send(&app, json_request("POST", "/api/drafts", json!({ "idea": idea }))).await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}

//! 表单页面

use crate::error::ApiFailure;
use crate::templates;
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use blogforge_core::logger::truncate_for_log;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct IdeaForm {
    #[serde(default)]
    pub idea: String,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackForm {
    pub draft_id: String,
    #[serde(default)]
    pub feedback: String,
}

fn error_panel(failure: ApiFailure) -> Response {
    let status =
        StatusCode::from_u16(failure.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Html(templates::error_page(&failure))).into_response()
}

pub async fn index() -> Html<String> {
    Html(templates::index_page(None))
}

pub async fn create_draft(State(state): State<AppState>, Form(form): Form<IdeaForm>) -> Response {
    if form.idea.trim().is_empty() {
        return Html(templates::index_page(Some(templates::EMPTY_IDEA_NOTICE))).into_response();
    }

    tracing::info!("[SERVER] 生成博客: {}", truncate_for_log(form.idea.trim(), 80));
    match state.service.create_draft(&form.idea).await {
        Ok(draft) => Html(templates::draft_page(&draft, None)).into_response(),
        Err(e) => error_panel(e.into()),
    }
}

pub async fn submit_feedback(
    State(state): State<AppState>,
    Form(form): Form<FeedbackForm>,
) -> Response {
    match state
        .service
        .apply_feedback(&form.draft_id, &form.feedback)
        .await
    {
        Ok(outcome) => Html(templates::draft_page(&outcome.draft, Some(outcome.route))).into_response(),
        Err(e) => error_panel(e.into()),
    }
}

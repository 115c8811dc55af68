//! JSON API

use crate::error::ApiFailure;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use blogforge_core::errors::ApiErrorCode;
use blogforge_services::content_creator::{BlogDraft, DraftSummary, FeedbackOutcome};
use serde::Deserialize;

const DEFAULT_LIST_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct CreateDraftRequest {
    pub idea: String,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub feedback: String,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

fn draft_not_found(id: &str) -> ApiFailure {
    ApiFailure {
        draft_id: Some(id.to_string()),
        ..ApiFailure::new(ApiErrorCode::NotFound, format!("草稿不存在: {id}"))
    }
}

pub async fn create_draft(
    State(state): State<AppState>,
    Json(request): Json<CreateDraftRequest>,
) -> Result<(StatusCode, Json<BlogDraft>), ApiFailure> {
    let draft = state.service.create_draft(&request.idea).await?;
    Ok((StatusCode::CREATED, Json(draft)))
}

pub async fn list_drafts(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<DraftSummary>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    Json(state.service.list_drafts(limit).await)
}

pub async fn get_draft(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BlogDraft>, ApiFailure> {
    state
        .service
        .get_draft(&id)
        .await
        .map(Json)
        .ok_or_else(|| draft_not_found(&id))
}

pub async fn submit_feedback(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<FeedbackRequest>,
) -> Result<Json<FeedbackOutcome>, ApiFailure> {
    let outcome = state.service.apply_feedback(&id, &request.feedback).await?;
    Ok(Json(outcome))
}

pub async fn delete_draft(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    if state.service.delete_draft(&id).await {
        StatusCode::NO_CONTENT.into_response()
    } else {
        draft_not_found(&id).into_response()
    }
}

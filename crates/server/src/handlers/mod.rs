//! 请求处理器

pub mod api;
pub mod pages;

use axum::Json;
use serde_json::{json, Value};

/// 健康检查
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": crate::version(),
    }))
}

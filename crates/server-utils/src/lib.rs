//! 服务器工具函数 crate
//!
//! 包含错误响应构建、HTML 转义、Markdown 渲染等公共工具函数。

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use blogforge_core::errors::{ApiError, ApiErrorCode, ApiErrorResponse};
use pulldown_cmark::{html, Event, Options, Parser};

/// 从 HTTP 状态码构建错误响应
pub fn build_error_response_with_status(status_code: u16, error_message: &str) -> Response {
    build_error_response_with_meta(status_code, error_message, None, None)
}

/// 从错误码构建错误响应
pub fn build_error_response(code: ApiErrorCode, error_message: &str) -> Response {
    build_error_response_with_meta(code.http_status(), error_message, None, Some(code))
}

/// 构建错误响应（带元信息）
///
/// 未指定 `code_override` 时由状态码和消息推断错误码，
/// 响应状态码始终取自最终错误码。
pub fn build_error_response_with_meta(
    status_code: u16,
    error_message: &str,
    draft_id: Option<&str>,
    code_override: Option<ApiErrorCode>,
) -> Response {
    let code = code_override.unwrap_or_else(|| ApiErrorCode::infer(status_code, error_message));
    let status =
        StatusCode::from_u16(code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = build_api_error_json(code, error_message, draft_id);
    (status, Json(body)).into_response()
}

/// 构建统一错误 JSON
pub fn build_api_error_json(
    code: ApiErrorCode,
    error_message: &str,
    draft_id: Option<&str>,
) -> serde_json::Value {
    let error = ApiError::new(code, error_message).with_draft_id(draft_id);
    serde_json::to_value(ApiErrorResponse::new(error)).unwrap_or_else(|_| {
        serde_json::json!({
            "error": {
                "code": "INTERNAL_ERROR",
                "message": "序列化错误响应失败",
                "retryable": false
            }
        })
    })
}

/// 转义 HTML 特殊字符
pub fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// 将 Markdown 渲染为 HTML
///
/// 模型输出中的原始 HTML 按普通文本处理，不会原样输出。
pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, parser);
    output
}

/// 安全截断字符串到指定字符数，避免 UTF-8 边界问题
pub fn safe_truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

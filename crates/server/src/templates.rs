//! HTML 页面渲染
//!
//! 所有用户输入和模型输出都经过转义；正文按 Markdown 渲染。

use crate::error::ApiFailure;
use blogforge_server_utils::{escape_html, render_markdown, safe_truncate};
use blogforge_services::content_creator::{BlogDraft, FeedbackRoute};

pub const PAGE_TITLE: &str = "AI Blog Generator";
pub const EMPTY_IDEA_NOTICE: &str = "Please enter a blog idea to get started.";
const IDEA_LABEL: &str = "Enter your blog idea:";
const FEEDBACK_LABEL: &str =
    "Do you want to change the title, content, or both? (e.g., 'change title')";
const FOOTER: &str = r#"Developed by <a href="https://www.linkedin.com/in/azeem-adeyemi-b99291b3/">Azeem Adeyemi</a>"#;

const STYLE: &str = r#"
body { font-family: -apple-system, "Segoe UI", Roboto, sans-serif; max-width: 760px; margin: 2rem auto; padding: 0 1rem; color: #262730; }
h1 { font-size: 2.2rem; }
form { margin: 1.2rem 0; }
label { display: block; margin-bottom: .4rem; }
input[type=text] { width: 100%; padding: .5rem; font-size: 1rem; box-sizing: border-box; }
button { margin-top: .6rem; padding: .4rem 1rem; }
.notice { color: #555; }
.route { background: #eef6ff; padding: .5rem .8rem; border-radius: 4px; }
.error { background: #ffecec; border: 1px solid #f5b5b5; padding: .8rem; border-radius: 4px; }
footer { margin-top: 3rem; font-size: .9rem; color: #777; }
"#;

fn layout(heading: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{STYLE}</style>
</head>
<body>
<h1>{PAGE_TITLE}</h1>
{body}
<footer>{FOOTER}</footer>
</body>
</html>"#,
        title = escape_html(&safe_truncate(heading, 80)),
    )
}

fn idea_form(idea: &str) -> String {
    format!(
        r#"<form method="post" action="/draft">
<label for="idea">{IDEA_LABEL}</label>
<input type="text" id="idea" name="idea" value="{idea}">
<button type="submit">Generate</button>
</form>"#,
        idea = escape_html(idea),
    )
}

fn feedback_form(draft_id: &str) -> String {
    format!(
        r#"<form method="post" action="/feedback">
<input type="hidden" name="draft_id" value="{id}">
<label for="feedback">{FEEDBACK_LABEL}</label>
<input type="text" id="feedback" name="feedback" value="">
<button type="submit">Submit feedback</button>
</form>"#,
        id = escape_html(draft_id),
    )
}

fn route_notice(route: FeedbackRoute) -> &'static str {
    match route {
        FeedbackRoute::Title => "Updated blog: title and content were regenerated.",
        FeedbackRoute::Content => "Updated blog: content was regenerated.",
        FeedbackRoute::End => "No changes requested. Use 'change title', 'change content' or 'change both'.",
    }
}

/// 首页；`notice` 用于空想法提示
pub fn index_page(notice: Option<&str>) -> String {
    let notice = notice
        .map(|n| format!(r#"<p class="notice">{}</p>"#, escape_html(n)))
        .unwrap_or_default();
    layout(PAGE_TITLE, &format!("{}\n{}", idea_form(""), notice))
}

/// 草稿页：标题、正文和反馈表单
pub fn draft_page(draft: &BlogDraft, route: Option<FeedbackRoute>) -> String {
    let idea = draft
        .state
        .messages()
        .first()
        .map(|m| m.text())
        .unwrap_or_default();

    let (title_heading, content_heading) = match route {
        Some(route) if route.regenerates() => ("Updated Blog Title:", "Updated Blog Content:"),
        _ => ("Generated Blog Title:", "Generated Blog Content:"),
    };
    let banner = route
        .map(|route| {
            format!(
                r#"<p class="route">{}</p>"#,
                escape_html(route_notice(route))
            )
        })
        .unwrap_or_default();

    let body = format!(
        r#"{form}
{banner}
<h2>{title_heading}</h2>
<p class="blog-title">{title}</p>
<h2>{content_heading}</h2>
<article class="blog-content">
{content}
</article>
{feedback}"#,
        form = idea_form(idea),
        title = escape_html(draft.state.title()),
        content = render_markdown(draft.state.content()),
        feedback = feedback_form(&draft.id),
    );

    layout(draft.state.title(), &body)
}

/// 错误面板
pub fn error_page(failure: &ApiFailure) -> String {
    let retry = if failure.code.retryable() {
        "<p>This is usually temporary. Please try again in a moment.</p>"
    } else {
        ""
    };
    let body = format!(
        r#"{form}
<div class="error">
<strong>{heading}</strong>
<p>{message}</p>
{retry}
</div>"#,
        form = idea_form(""),
        heading = escape_html(failure.code.default_message()),
        message = escape_html(&failure.message),
    );
    layout(PAGE_TITLE, &body)
}

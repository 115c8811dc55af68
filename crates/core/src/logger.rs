//! 日志脱敏
//!
//! 上游错误响应、请求摘要等写入日志前都要经过 `sanitize_log_message`。

use regex::Regex;
use std::sync::OnceLock;

fn sanitize_patterns() -> &'static [(Regex, &'static str)] {
    static PATTERNS: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let patterns = [
            (r"Bearer\s+[A-Za-z0-9._-]+", "Bearer ***"),
            // Groq 密钥
            (r"gsk_[A-Za-z0-9]{8,}", "gsk_***"),
            // OpenAI 兼容密钥
            (r"sk-[A-Za-z0-9_-]{8,}", "sk-***"),
            (
                r#"api[_-]?key["']?\s*[:=]\s*["']?[A-Za-z0-9._-]+"#,
                "api_key: ***",
            ),
            (
                r#"[Aa]uthorization["']?\s*[:=]\s*["']?[A-Za-z0-9._\s-]+"#,
                "authorization: ***",
            ),
            (r#"token["']?\s*[:=]\s*["']?[A-Za-z0-9._-]+"#, "token: ***"),
            (
                r#"secret["']?\s*[:=]\s*["']?[A-Za-z0-9._-]+"#,
                "secret: ***",
            ),
        ];
        patterns
            .into_iter()
            .filter_map(|(pattern, replacement)| {
                Regex::new(pattern).ok().map(|re| (re, replacement))
            })
            .collect()
    })
}

/// 清理日志中的敏感字段
pub fn sanitize_log_message(message: &str) -> String {
    let mut sanitized = message.to_string();
    for (re, replacement) in sanitize_patterns() {
        sanitized = re.replace_all(&sanitized, *replacement).to_string();
    }
    sanitized
}

/// 按字符截断，避免切断 UTF-8 边界
pub fn truncate_for_log(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars).collect();
        format!("{head}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_bearer_token() {
        let output = sanitize_log_message("Authorization: Bearer abcDEF123._-XYZ");
        assert!(!output.contains("abcDEF123"));
        assert!(output.contains("***"));
    }

    #[test]
    fn test_sanitize_groq_key() {
        let output = sanitize_log_message("Invalid API Key provided: gsk_AbCdEf1234567890");
        assert!(!output.contains("AbCdEf1234567890"));
        assert!(output.contains("gsk_***"));
    }

    #[test]
    fn test_sanitize_api_key_field() {
        let output = sanitize_log_message(r#"request api_key="sk-test_123.456-ABC" end"#);
        assert!(output.contains("api_key: ***"));
        assert!(!output.contains("test_123"));
    }

    #[test]
    fn test_plain_text_unchanged() {
        let input = "Generate an engaging blog title for this idea: a robot learns to paint";
        assert_eq!(sanitize_log_message(input), input);
    }

    #[test]
    fn test_truncate_for_log() {
        assert_eq!(truncate_for_log("短文本", 10), "短文本");
        assert_eq!(truncate_for_log("机器人学画画", 3), "机器人…");
    }
}

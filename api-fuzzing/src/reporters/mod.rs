// api-fuzzing/src/reporters/mod.rs
//! Reporters for printing responses and run results

pub mod summary;

use crate::constants::PARSE_FAILURE_PLACEHOLDER;
use crate::harness::client::{ApiResponse, DispatchError};
use colored::Colorize;

const TITLE_OPEN: &str = "<title>";
const TITLE_CLOSE: &str = "</title>";

/// Render the status line, plus a body summary line for error statuses
pub fn render_response(method: &str, url: &str, response: &ApiResponse) -> String {
    let status = colorize_status(response.status);
    let mut report = format!("{} {} → {}", method, url, status);

    if response.is_error() {
        report.push_str("\n  ↳ ");
        report.push_str(&summarize_body(response));
    }

    report
}

/// Render a transport failure
pub fn render_failure(method: &str, url: &str, err: &DispatchError) -> String {
    format!("{} {} → {}\n  ↳ {}", method, url, "EXCEPTION".bright_red(), err)
}

/// Color a status code by class
pub fn colorize_status(status: u16) -> String {
    let text = status.to_string();
    match status {
        500..=u16::MAX => text.bright_red().to_string(),
        400..=499 => text.bright_yellow().to_string(),
        200..=399 => text.bright_green().to_string(),
        _ => text,
    }
}

/// Short human-readable summary of a response body
///
/// JSON bodies are pretty-printed, HTML pages reduced to their title, and
/// anything else trimmed. Bodies that fail to parse yield a placeholder.
pub fn summarize_body(response: &ApiResponse) -> String {
    if response.content_type.contains("application/json") {
        return match pretty_json(&response.body) {
            Ok(pretty) => pretty,
            Err(err) => {
                log::debug!("Response body is not valid JSON: {}", err);
                PARSE_FAILURE_PLACEHOLDER.to_string()
            }
        };
    }

    let text = response.text();
    if response.content_type.contains("text/html") {
        let title = html_title(&text).unwrap_or("HTML error page");
        return format!("[HTML] {}", title);
    }

    text.trim().to_string()
}

fn pretty_json(body: &[u8]) -> Result<String, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_slice(body)?;
    serde_json::to_string_pretty(&value)
}

/// Text between the first `<title>` and the following `</title>`
///
/// An unclosed title runs to the next `<title>` or the end of the page.
pub fn html_title(page: &str) -> Option<&str> {
    let start = page.find(TITLE_OPEN)? + TITLE_OPEN.len();
    let rest = &page[start..];
    let rest = rest.split(TITLE_OPEN).next().unwrap_or(rest);
    Some(rest.split(TITLE_CLOSE).next().unwrap_or(rest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn response(status: u16, content_type: &str, body: &str) -> ApiResponse {
        ApiResponse {
            status,
            content_type: content_type.to_string(),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_success_prints_single_line() {
        let report = render_response("GET", "http://x/api/projects", &response(200, "application/json", "[]"));
        assert!(!report.contains('\n'));
        assert!(report.starts_with("GET http://x/api/projects → "));
        assert!(report.contains("200"));
    }

    #[test]
    fn test_error_prints_summary_line() {
        let report = render_response(
            "POST",
            "http://x/api/projects",
            &response(400, "application/json; charset=utf-8", r#"{"error":"Invalid title"}"#),
        );
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("400"));
        assert_eq!(lines[1], "  ↳ {");
        assert_eq!(lines[2], r#"  "error": "Invalid title""#);
        assert_eq!(lines[3], "}");
    }

    #[test]
    fn test_json_keeps_non_ascii() {
        let summary = summarize_body(&response(500, "application/json", r#"{"msg":"тест"}"#));
        assert!(summary.contains("тест"));
    }

    #[test]
    fn test_invalid_json_yields_placeholder() {
        let summary = summarize_body(&response(500, "application/json", "<html>oops</html>"));
        assert_eq!(summary, PARSE_FAILURE_PLACEHOLDER);
    }

    #[test]
    fn test_html_title_extraction() {
        let page = "<html><head><title>404: This page could not be found</title></head></html>";
        assert_eq!(
            summarize_body(&response(404, "text/html; charset=utf-8", page)),
            "[HTML] 404: This page could not be found"
        );
        assert_eq!(
            summarize_body(&response(500, "text/html", "<h1>Internal</h1>")),
            "[HTML] HTML error page"
        );
        assert_eq!(html_title("<title>unclosed"), Some("unclosed"));
        assert_eq!(html_title("<title>a<title>b</title>"), Some("a"));
        assert_eq!(html_title("no title here"), None);
    }

    #[test]
    fn test_plain_text_is_trimmed() {
        assert_eq!(summarize_body(&response(401, "text/plain", "  Unauthorized \n")), "Unauthorized");
        assert_eq!(summarize_body(&response(401, "", "")), "");
    }

    #[test]
    fn test_status_colors_keep_the_code() {
        for status in [101, 204, 302, 404, 503] {
            assert!(colorize_status(status).contains(&status.to_string()));
        }
        assert_eq!(colorize_status(101), "101");
    }

    #[test]
    fn test_failure_report() {
        let report = render_failure("GET", "http://x/api/projects", &DispatchError::Timeout(Duration::from_secs(5)));
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("EXCEPTION"));
        assert_eq!(lines[1], "  ↳ Request timed out after 5s");
    }
}

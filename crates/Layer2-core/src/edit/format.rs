//! Content Formatter - 디스크에 쓰기 전 정리
//!
//! 모델이 만든 내용은 종종 한 줄로 뭉개진 JSON이나 헤더 앞 빈 줄이
//! 빠진 Markdown입니다. 확장자별로 최소한의 정리만 수행하고, 확신이
//! 없으면 원본을 그대로 돌려줍니다.

use regex::Regex;
use serde_json::Value;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

/// 내용 포매터 인터페이스
pub trait ContentFormatter: Send + Sync {
    /// `path`의 확장자를 보고 `content`를 정리
    fn format(&self, content: &str, path: &Path) -> String;
}

/// 기본 포매터
///
/// - `.json`: 2칸 들여쓰기 pretty print (키 순서 유지)
/// - `.md`: CRLF → LF, 헤더 앞 빈 줄 보장
/// - 코드 파일: 마지막 줄바꿈 보장
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFormatter;

/// 마지막 줄바꿈만 보장하는 확장자
const NEWLINE_TERMINATED: &[&str] = &["py", "swift", "js", "ts", "sh", "rs"];

impl DefaultFormatter {
    pub fn new() -> Self {
        Self
    }

    fn format_json(content: &str) -> String {
        // 실제 줄바꿈 없이 리터럴 `\n`만 있으면 파서가 이스케이프를 놓친 것
        let candidate = if content.contains("\\n") && !content.contains('\n') {
            unescape_whitespace(content)
        } else {
            content.to_string()
        };

        if let Some(pretty) = pretty_json(&candidate) {
            return pretty;
        }

        // `{\n "key": 1}` 처럼 리터럴 줄바꿈 때문에 깨진 경우
        match pretty_json(&unescape_whitespace(content)) {
            Some(pretty) => pretty,
            None => {
                debug!("JSON content is not parseable, leaving it unchanged");
                content.to_string()
            }
        }
    }

    fn format_markdown(content: &str) -> String {
        let mut text = if content.contains("\\n") && !content.contains('\n') {
            unescape_whitespace(content)
        } else {
            content.to_string()
        };

        text = text.replace("\r\n", "\n");

        if let Some(re) = header_gap() {
            text = re.replace_all(&text, "$1\n\n$2").into_owned();
        }

        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text
    }
}

impl ContentFormatter for DefaultFormatter {
    fn format(&self, content: &str, path: &Path) -> String {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "json" => Self::format_json(content),
            "md" => Self::format_markdown(content),
            e if NEWLINE_TERMINATED.contains(&e) => {
                let mut text = content.to_string();
                if !text.ends_with('\n') {
                    text.push('\n');
                }
                text
            }
            _ => content.to_string(),
        }
    }
}

/// 헤더 바로 앞 줄이 비어있지 않은 경우
fn header_gap() -> Option<&'static Regex> {
    static HEADER_GAP: OnceLock<Option<Regex>> = OnceLock::new();
    HEADER_GAP
        .get_or_init(|| Regex::new(r"([^\n])\n(#+ )").ok())
        .as_ref()
}

fn unescape_whitespace(content: &str) -> String {
    content.replace("\\n", "\n").replace("\\t", "\t")
}

fn pretty_json(content: &str) -> Option<String> {
    let value: Value = serde_json::from_str(content).ok()?;
    let mut pretty = serde_json::to_string_pretty(&value).ok()?;
    pretty.push('\n');
    Some(pretty)
}

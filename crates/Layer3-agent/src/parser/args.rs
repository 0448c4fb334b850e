//! Argument tokenization
//!
//! 인자 문자열을 순서대로 세 가지 tokenizer에 통과시킵니다:
//!
//! 1. `quote-aware` - 따옴표/대괄호 안의 쉼표는 분리하지 않음. 따옴표가 닫히지 않으면 실패
//! 2. `regex` - 따옴표 구간 또는 쉼표 없는 구간을 best-effort로 추출
//! 3. `naive-split` - 쉼표 기준 단순 분리 (항상 성공)
//!
//! 각 토큰은 escape 해제(`\n`, `\t`, `\"` ...) 후, 따옴표 없이 `[...]` 형태면
//! 리스트 리터럴로 한 번 더 파싱됩니다.

use localhost_foundation::ToolArg;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// tokenizer가 만든 원시 토큰
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawToken {
    pub text: String,
    /// 따옴표로 감싸져 있었는지 (리스트 리터럴 판별에 사용)
    pub quoted: bool,
}

impl RawToken {
    fn bare(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quoted: false,
        }
    }

    fn quoted(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quoted: true,
        }
    }
}

type Tokenizer = fn(&str) -> Option<Vec<RawToken>>;

/// 시도 순서가 곧 동작 규약입니다.
pub(crate) const TOKENIZERS: [(&str, Tokenizer); 3] = [
    ("quote-aware", quote_aware),
    ("regex", regex_runs),
    ("naive-split", naive_split),
];

/// 인자 문자열 → 도구 인자 목록
pub fn parse_arguments(raw: &str) -> Vec<ToolArg> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Vec::new();
    }

    for (name, tokenizer) in TOKENIZERS {
        match tokenizer(raw) {
            Some(tokens) => {
                debug!(tokenizer = name, count = tokens.len(), "arguments tokenized");
                return tokens.into_iter().map(into_arg).collect();
            }
            None => debug!(tokenizer = name, "tokenizer gave up, falling back"),
        }
    }

    Vec::new()
}

fn into_arg(token: RawToken) -> ToolArg {
    if !token.quoted {
        if let Some(items) = parse_list_literal(&token.text) {
            return ToolArg::List(items);
        }
    }
    ToolArg::Text(unescape(&token.text))
}

// ============================================================================
// Tokenizers
// ============================================================================

/// 따옴표/대괄호를 인식하는 tokenizer
///
/// - 따옴표는 토큰 시작 위치에서만 열립니다 (`it's` 같은 bare 텍스트 보호)
/// - 따옴표 안의 백슬래시 시퀀스는 그대로 남겨두고 `unescape`에 맡깁니다
/// - 대괄호 안에서는 따옴표를 포함한 원문을 보존합니다
/// - 닫는 따옴표 뒤에 쉼표 없이 다른 문자가 오면 실패합니다
pub(crate) fn quote_aware(raw: &str) -> Option<Vec<RawToken>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            if c == '\\' {
                current.push(c);
                current.push(chars.next()?);
            } else if c == q {
                quote = None;
                if depth > 0 {
                    current.push(c);
                }
            } else {
                current.push(c);
            }
            continue;
        }

        // 닫는 따옴표 뒤에는 공백이나 쉼표만 허용
        if quoted && depth == 0 && c != ',' {
            if c.is_whitespace() {
                continue;
            }
            return None;
        }

        match c {
            '"' | '\'' if depth > 0 => {
                current.push(c);
                quote = Some(c);
            }
            '"' | '\'' if !quoted && current.trim().is_empty() => {
                current.clear();
                quoted = true;
                quote = Some(c);
            }
            '[' => {
                depth += 1;
                current.push(c);
            }
            ']' => {
                depth = depth.checked_sub(1)?;
                current.push(c);
            }
            ',' if depth == 0 => {
                push_token(&mut tokens, &mut current, quoted);
                quoted = false;
            }
            c => current.push(c),
        }
    }

    if quote.is_some() || depth > 0 {
        return None;
    }
    push_token(&mut tokens, &mut current, quoted);
    Some(tokens)
}

fn push_token(tokens: &mut Vec<RawToken>, current: &mut String, quoted: bool) {
    let text = std::mem::take(current);
    if quoted {
        tokens.push(RawToken::quoted(text));
    } else {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            tokens.push(RawToken::bare(trimmed));
        }
    }
}

fn runs_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r#""((?:[^"\\]|\\.)*)"|'((?:[^'\\]|\\.)*)'|([^,"']+)"#).ok()
        })
        .as_ref()
}

/// 따옴표 구간 또는 bare 구간을 정규식으로 추출
pub(crate) fn regex_runs(raw: &str) -> Option<Vec<RawToken>> {
    let pattern = runs_pattern()?;
    let tokens: Vec<RawToken> = pattern
        .captures_iter(raw)
        .filter_map(|caps| {
            if let Some(m) = caps.get(1).or_else(|| caps.get(2)) {
                return Some(RawToken::quoted(m.as_str()));
            }
            let bare = caps.get(3)?.as_str().trim();
            (!bare.is_empty()).then(|| RawToken::bare(bare))
        })
        .collect();

    (!tokens.is_empty()).then_some(tokens)
}

/// 마지막 수단: 쉼표로 자르고 양끝 따옴표 제거
pub(crate) fn naive_split(raw: &str) -> Option<Vec<RawToken>> {
    Some(
        raw.split(',')
            .map(|part| {
                let part = part.trim();
                let stripped = part.trim_matches(|c| c == '"' || c == '\'');
                if stripped.len() != part.len() {
                    RawToken::quoted(stripped)
                } else {
                    RawToken::bare(stripped)
                }
            })
            .collect(),
    )
}

// ============================================================================
// Escapes & list literals
// ============================================================================

/// 모델이 이중 escape한 시퀀스를 실제 문자로 변환
///
/// 알 수 없는 시퀀스(`\d` 등)는 그대로 둡니다.
pub fn unescape(text: &str) -> String {
    if !text.contains('\\') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some('\\') => out.push('\\'),
            _ => {
                out.push('\\');
                continue;
            }
        }
        chars.next();
    }
    out
}

/// `[...]` 리터럴을 문자열 리스트로 파싱
///
/// JSON 배열을 먼저 시도하고, 실패하면 (`['a', 'b']` 같은 형태) 내부를
/// quote-aware tokenizer로 분리합니다.
pub fn parse_list_literal(text: &str) -> Option<Vec<String>> {
    let trimmed = text.trim();
    if !(trimmed.starts_with('[') && trimmed.ends_with(']')) || trimmed.len() < 2 {
        return None;
    }

    if let Ok(items) = serde_json::from_str::<Vec<String>>(trimmed) {
        return Some(items);
    }

    let inner = &trimmed[1..trimmed.len() - 1];
    let tokens = quote_aware(inner)?;
    Some(tokens.iter().map(|t| unescape(&t.text)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(args: &[ToolArg]) -> Vec<String> {
        args.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn test_comma_inside_quotes_is_kept() {
        let args = parse_arguments(r#""/tmp/a.txt", "hello, world""#);
        assert_eq!(
            args,
            vec![ToolArg::text("/tmp/a.txt"), ToolArg::text("hello, world")]
        );
    }

    #[test]
    fn test_single_quotes_and_bare_tokens() {
        let args = parse_arguments(r#"'*config*', /home/u"#);
        assert_eq!(args, vec![ToolArg::text("*config*"), ToolArg::text("/home/u")]);
    }

    #[test]
    fn test_apostrophe_inside_bare_token() {
        let args = parse_arguments("it's here, there");
        assert_eq!(args, vec![ToolArg::text("it's here"), ToolArg::text("there")]);
    }

    #[test]
    fn test_empty_quoted_argument_is_kept() {
        let args = parse_arguments(r#""/a.rs", "old", """#);
        assert_eq!(args.len(), 3);
        assert_eq!(args[2], ToolArg::text(""));
    }

    #[test]
    fn test_unescape_sequences() {
        let args = parse_arguments(r##""/a.md", "# Title\n\nbody \"quoted\"\tend""##);
        assert_eq!(args[1], ToolArg::text("# Title\n\nbody \"quoted\"\tend"));
        assert_eq!(unescape(r"C:\data\\x"), r"C:\data\x");
    }

    #[test]
    fn test_list_literal_json_and_python_style() {
        let args = parse_arguments(r#"["/a.rs", "/b.rs"]"#);
        assert_eq!(args, vec![ToolArg::list(["/a.rs", "/b.rs"])]);

        let args = parse_arguments(r#"['/a.rs', '/b, c.rs'], "/d.rs""#);
        assert_eq!(
            args,
            vec![ToolArg::list(["/a.rs", "/b, c.rs"]), ToolArg::text("/d.rs")]
        );
    }

    #[test]
    fn test_quoted_list_stays_text() {
        let args = parse_arguments(r#""/data.json", "[1, 2]""#);
        assert_eq!(args[1], ToolArg::text("[1, 2]"));
    }

    #[test]
    fn test_cascade_falls_back_on_unterminated_quote() {
        assert!(quote_aware(r#""/x", "hello"#).is_none());
        let args = parse_arguments(r#""/x", "hello"#);
        assert_eq!(texts(&args), vec!["\"/x\"", "\"hello\""]);
    }

    #[test]
    fn test_text_after_closing_quote_falls_back() {
        assert!(quote_aware(r#""/tmp/a.txt")Then more"#).is_none());
        assert!(quote_aware(r#""/a" "/b""#).is_none());

        let args = parse_arguments(r#""/tmp/a.txt" trailing"#);
        assert_eq!(args[0], ToolArg::text("/tmp/a.txt"));

        let tokens = quote_aware("\"/a\"  ,\n 'b' ").unwrap();
        assert_eq!(tokens, vec![RawToken::quoted("/a"), RawToken::quoted("b")]);
    }

    #[test]
    fn test_naive_split_is_last_resort() {
        assert!(regex_runs(",,").is_none());
        let tokens = naive_split(r#""a", b"#).unwrap();
        assert_eq!(tokens[0], RawToken::quoted("a"));
        assert_eq!(tokens[1], RawToken::bare("b"));
    }

    #[test]
    fn test_tokenizer_order() {
        let names: Vec<&str> = TOKENIZERS.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["quote-aware", "regex", "naive-split"]);
    }

    #[test]
    fn test_empty_arguments() {
        assert!(parse_arguments("   ").is_empty());
    }
}

//! Action dialects
//!
//! - `ColonForm`: `Action: tool: "a", "b"` (한 줄)
//! - `CallForm`: `Action: tool("a", "b")` (여러 줄 허용, 닫는 괄호는 따옴표와
//!   괄호 깊이를 추적해서 찾음)

use super::{ActionStrategy, Dialect, RawAction, StrategyOutcome};
use regex::Regex;
use std::sync::OnceLock;

fn colon_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)Action:\s*(\w+):\s*(.*)").ok())
        .as_ref()
}

fn call_head_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)Action:\s*(\w+)\(").ok())
        .as_ref()
}

/// 여는 괄호 다음부터 짝이 맞는 `)`의 위치
///
/// 따옴표 안(백슬래시 escape 포함)과 중첩된 `()`/`[]`는 건너뜁니다.
/// 짝을 찾지 못하면 `None`.
fn closing_paren(body: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut chars = body.char_indices();

    while let Some((i, c)) = chars.next() {
        if let Some(q) = quote {
            if c == '\\' {
                chars.next();
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            ')' if depth == 0 => return Some(i),
            ')' => depth -= 1,
            _ => {}
        }
    }
    None
}

fn capture_call(text: &str) -> StrategyOutcome {
    let Some(caps) = call_head_pattern().and_then(|p| p.captures(text)) else {
        return StrategyOutcome::NotMatched;
    };
    let (Some(head), Some(tool)) = (caps.get(0), caps.get(1)) else {
        return StrategyOutcome::NotMatched;
    };

    let body = &text[head.end()..];
    let raw_args = match closing_paren(body) {
        Some(end) => &body[..end],
        // 따옴표가 깨진 경우: 마지막 `)`까지
        None => match body.rfind(')') {
            Some(end) => &body[..end],
            None => return StrategyOutcome::NotMatched,
        },
    };

    StrategyOutcome::Matched(RawAction {
        tool: tool.as_str().to_string(),
        raw_args: raw_args.to_string(),
        dialect: Dialect::Call,
    })
}

fn capture(pattern: Option<&Regex>, text: &str, dialect: Dialect) -> StrategyOutcome {
    let Some(caps) = pattern.and_then(|p| p.captures(text)) else {
        return StrategyOutcome::NotMatched;
    };
    match (caps.get(1), caps.get(2)) {
        (Some(tool), Some(args)) => StrategyOutcome::Matched(RawAction {
            tool: tool.as_str().to_string(),
            raw_args: args.as_str().to_string(),
            dialect,
        }),
        _ => StrategyOutcome::NotMatched,
    }
}

/// `Action: <identifier>: <rest of line>`
#[derive(Debug, Default, Clone, Copy)]
pub struct ColonForm;

impl ActionStrategy for ColonForm {
    fn dialect(&self) -> Dialect {
        Dialect::Colon
    }

    fn try_match(&self, text: &str) -> StrategyOutcome {
        capture(colon_pattern(), text, Dialect::Colon)
    }
}

/// `Action: <identifier>(<args>)`
#[derive(Debug, Default, Clone, Copy)]
pub struct CallForm;

impl ActionStrategy for CallForm {
    fn dialect(&self) -> Dialect {
        Dialect::Call
    }

    fn try_match(&self, text: &str) -> StrategyOutcome {
        capture_call(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(outcome: StrategyOutcome) -> RawAction {
        match outcome {
            StrategyOutcome::Matched(raw) => raw,
            StrategyOutcome::NotMatched => panic!("expected a match"),
        }
    }

    #[test]
    fn test_colon_form_stops_at_line_end() {
        let out = raw(ColonForm.try_match(
            "Thought: look around\naction: list_directory: \"/tmp\"\nsomething else",
        ));
        assert_eq!(out.tool, "list_directory");
        assert_eq!(out.raw_args, "\"/tmp\"");
    }

    #[test]
    fn test_colon_form_ignores_call_form() {
        assert!(matches!(
            ColonForm.try_match("Action: read_file(\"/tmp/a:b\")"),
            StrategyOutcome::NotMatched
        ));
    }

    #[test]
    fn test_call_form_spans_lines() {
        let out = raw(CallForm.try_match(
            "Action: write_file(\"/p/a.py\",\n\"print(1)\n\")",
        ));
        assert_eq!(out.tool, "write_file");
        assert_eq!(out.raw_args, "\"/p/a.py\",\n\"print(1)\n\"");
        assert_eq!(out.dialect, Dialect::Call);
    }

    #[test]
    fn test_call_form_stops_at_matching_paren() {
        let out = raw(CallForm.try_match(
            "Action: read_file(\"/tmp/a.txt\")\nThen I will summarize (briefly).",
        ));
        assert_eq!(out.raw_args, "\"/tmp/a.txt\"");

        let out = raw(CallForm.try_match(
            "Action: replace_in_file(\"/a.py\", \"f(x)\", \"g(x, [1, 2])\") done (ok)",
        ));
        assert_eq!(out.raw_args, "\"/a.py\", \"f(x)\", \"g(x, [1, 2])\"");
    }

    #[test]
    fn test_call_form_unbalanced_quote_uses_last_paren() {
        let out = raw(CallForm.try_match("Action: find_files(it's here)"));
        assert_eq!(out.raw_args, "it's here");
    }

    #[test]
    fn test_call_form_requires_closing_paren() {
        assert!(matches!(
            CallForm.try_match("Action: read_file(\"/tmp/a.txt\""),
            StrategyOutcome::NotMatched
        ));
    }
}

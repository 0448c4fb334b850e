//! ActionParser - 모델 출력에서 도구 호출 추출
//!
//! 모델 출력은 자유 텍스트입니다. 생각(Thought) 뒤에 선택적으로 `Action:` 줄이
//! 붙습니다. 등록된 dialect를 순서대로 시도하고, 아무것도 맞지 않으면 `None`
//! (= 최종 답변)을 반환합니다.
//!
//! ```text
//! text ─▶ ColonForm ─▶ CallForm ─▶ None
//!            │            │
//!            └──── RawAction ──▶ stutter unwrap ──▶ args cascade ──▶ ParsedAction
//! ```
//!
//! `Action: Action: tool: ...` 같은 반복(stutter)은 재귀적으로 벗겨냅니다.

mod args;
mod dialect;

pub use args::{parse_arguments, parse_list_literal, unescape};
pub use dialect::{CallForm, ColonForm};

use localhost_foundation::ToolArg;
use std::fmt;
use tracing::debug;

/// stutter 재귀 한도
const MAX_STUTTER_DEPTH: usize = 8;

/// 도구 이름이 이 값이면 stutter로 간주
const STUTTER_NAME: &str = "action";

/// 매칭된 dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `Action: tool: args`
    Colon,
    /// `Action: tool(args)`
    Call,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Colon => f.write_str("colon"),
            Dialect::Call => f.write_str("call"),
        }
    }
}

/// dialect가 잘라낸 원시 호출 (인자는 아직 문자열)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAction {
    pub tool: String,
    pub raw_args: String,
    pub dialect: Dialect,
}

/// strategy 한 개의 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyOutcome {
    Matched(RawAction),
    NotMatched,
}

/// 파싱 strategy
pub trait ActionStrategy: Send + Sync {
    fn dialect(&self) -> Dialect;

    fn try_match(&self, text: &str) -> StrategyOutcome;
}

/// 최종 파싱 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAction {
    pub tool: String,
    pub args: Vec<ToolArg>,
    pub dialect: Dialect,
}

impl fmt::Display for ParsedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.args.iter().map(|a| a.to_string()).collect();
        write!(f, "{}({})", self.tool, rendered.join(", "))
    }
}

/// 순서 있는 strategy 목록
pub struct ActionParser {
    strategies: Vec<Box<dyn ActionStrategy>>,
}

impl Default for ActionParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionParser {
    /// 기본 순서: ColonForm → CallForm
    pub fn new() -> Self {
        Self::with_strategies(vec![Box::new(ColonForm), Box::new(CallForm)])
    }

    pub fn with_strategies(strategies: Vec<Box<dyn ActionStrategy>>) -> Self {
        Self { strategies }
    }

    /// 시도 순서대로 dialect 목록
    pub fn dialects(&self) -> Vec<Dialect> {
        self.strategies.iter().map(|s| s.dialect()).collect()
    }

    /// 모델 출력 파싱. `None`이면 최종 답변.
    pub fn parse(&self, text: &str) -> Option<ParsedAction> {
        self.parse_at_depth(text, 0)
    }

    fn parse_at_depth(&self, text: &str, depth: usize) -> Option<ParsedAction> {
        let raw = self.first_match(text)?;

        if raw.tool.eq_ignore_ascii_case(STUTTER_NAME) {
            if depth >= MAX_STUTTER_DEPTH {
                debug!(depth, "stutter depth exceeded, treating as final answer");
                return None;
            }
            debug!(depth, dialect = %raw.dialect, "unwrapping stuttered Action prefix");
            return self.parse_at_depth(&format!("Action: {}", raw.raw_args), depth + 1);
        }

        let args = parse_arguments(&raw.raw_args);
        Some(ParsedAction {
            tool: raw.tool,
            args,
            dialect: raw.dialect,
        })
    }

    fn first_match(&self, text: &str) -> Option<RawAction> {
        for strategy in &self.strategies {
            match strategy.try_match(text) {
                StrategyOutcome::Matched(raw) => {
                    debug!(dialect = %raw.dialect, tool = %raw.tool, "action dialect matched");
                    return Some(raw);
                }
                StrategyOutcome::NotMatched => {
                    debug!(dialect = %strategy.dialect(), "dialect not matched");
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Option<(String, Vec<ToolArg>)> {
        ActionParser::new().parse(text).map(|a| (a.tool, a.args))
    }

    fn texts(items: &[&str]) -> Vec<ToolArg> {
        items.iter().map(|s| ToolArg::text(*s)).collect()
    }

    #[test]
    fn test_colon_form() {
        assert_eq!(
            parse(r#"Action: find_files: "*config*", "/home/u""#),
            Some(("find_files".to_string(), texts(&["*config*", "/home/u"])))
        );
    }

    #[test]
    fn test_call_form() {
        assert_eq!(
            parse(r#"Action: read_file("/tmp/a.txt")"#),
            Some(("read_file".to_string(), texts(&["/tmp/a.txt"])))
        );
    }

    #[test]
    fn test_stutter_unwrapped() {
        assert_eq!(
            parse(r#"Action: Action: write_file: "/x", "y""#),
            Some(("write_file".to_string(), texts(&["/x", "y"])))
        );
        assert_eq!(
            parse(r#"ACTION: action: Action: read_file("/a")"#),
            Some(("read_file".to_string(), texts(&["/a"])))
        );
    }

    #[test]
    fn test_no_action_is_final_answer() {
        assert_eq!(parse("The file contains three functions."), None);
        assert_eq!(parse(""), None);
    }

    #[test]
    fn test_thought_before_action() {
        let text = "Thought: I should look at the project first.\nAction: list_directory: \"/Users/me/app\"";
        let action = ActionParser::new().parse(text).unwrap();
        assert_eq!(action.tool, "list_directory");
        assert_eq!(action.dialect, Dialect::Colon);
        assert_eq!(action.args, texts(&["/Users/me/app"]));
    }

    #[test]
    fn test_colon_form_wins_over_call_form() {
        let text = "Action: read_file: \"/a\"\nAction: list_directory(\"/b\")";
        let action = ActionParser::new().parse(text).unwrap();
        assert_eq!(action.tool, "read_file");
        assert_eq!(action.dialect, Dialect::Colon);
    }

    #[test]
    fn test_call_form_with_list_and_escapes() {
        let action = ActionParser::new()
            .parse(r#"Action: read_multiple_files(["/a.rs", "/b.rs"])"#)
            .unwrap();
        assert_eq!(action.args, vec![ToolArg::list(["/a.rs", "/b.rs"])]);

        let action = ActionParser::new()
            .parse("Action: write_file(\"/p/README.md\", \"# App\\n\\nHello, world\")")
            .unwrap();
        assert_eq!(action.args, texts(&["/p/README.md", "# App\n\nHello, world"]));
    }

    #[test]
    fn test_call_form_followed_by_prose() {
        let action = ActionParser::new()
            .parse("Action: read_file(\"/tmp/a.txt\")\nThen I will summarize (briefly).")
            .unwrap();
        assert_eq!(action.tool, "read_file");
        assert_eq!(action.args, texts(&["/tmp/a.txt"]));
    }

    #[test]
    fn test_call_form_without_arguments() {
        let action = ActionParser::new().parse("Action: list_tools()").unwrap();
        assert!(action.args.is_empty());
    }

    #[test]
    fn test_stutter_depth_is_bounded() {
        let text = format!("{}read_file: \"/a\"", "Action: ".repeat(MAX_STUTTER_DEPTH + 2));
        assert_eq!(parse(&text), None);
    }

    #[test]
    fn test_strategy_order_is_configurable() {
        assert_eq!(ActionParser::new().dialects(), vec![Dialect::Colon, Dialect::Call]);

        let call_only = ActionParser::with_strategies(vec![Box::new(CallForm)]);
        assert_eq!(call_only.parse(r#"Action: find_files: "*.rs""#), None);
    }
}

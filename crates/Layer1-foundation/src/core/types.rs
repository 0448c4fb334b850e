//! Core Types - 공용 타입 정의
//!
//! 모든 레이어에서 공통으로 사용하는 타입들

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Message - 대화 메시지
// ============================================================================

/// 메시지 역할
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 역할이 태그된 대화 메시지
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

// ============================================================================
// Tool Arguments - 도구 인자
// ============================================================================

/// 단일 도구 인자: 문자열 또는 문자열 리스트
///
/// 모델이 `["a.rs", "b.rs"]` 같은 리스트 리터럴을 넘기면 `List`가 됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolArg {
    Text(String),
    List(Vec<String>),
}

impl ToolArg {
    pub fn text(value: impl Into<String>) -> Self {
        ToolArg::Text(value.into())
    }

    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ToolArg::List(items.into_iter().map(Into::into).collect())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ToolArg::Text(s) => Some(s),
            ToolArg::List(_) => None,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, ToolArg::List(_))
    }

    fn shape(&self) -> &'static str {
        match self {
            ToolArg::Text(_) => "string",
            ToolArg::List(_) => "list",
        }
    }
}

impl fmt::Display for ToolArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolArg::Text(s) => write!(f, "{:?}", s),
            ToolArg::List(items) => write!(f, "{:?}", items),
        }
    }
}

impl From<&str> for ToolArg {
    fn from(s: &str) -> Self {
        ToolArg::Text(s.to_string())
    }
}

impl From<String> for ToolArg {
    fn from(s: String) -> Self {
        ToolArg::Text(s)
    }
}

impl From<Vec<String>> for ToolArg {
    fn from(items: Vec<String>) -> Self {
        ToolArg::List(items)
    }
}

/// 순서가 있는 인자 목록
///
/// 접근자는 위치별 형태(shape)를 검사하고, 불일치 시
/// `Error::InvalidArguments`를 반환합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolArgs {
    tool: String,
    args: Vec<ToolArg>,
}

impl ToolArgs {
    pub fn new(tool: impl Into<String>, args: Vec<ToolArg>) -> Self {
        Self {
            tool: tool.into(),
            args,
        }
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn as_slice(&self) -> &[ToolArg] {
        &self.args
    }

    /// 필수 문자열 인자
    pub fn text(&self, index: usize, name: &str) -> crate::Result<&str> {
        match self.args.get(index) {
            Some(ToolArg::Text(s)) => Ok(s),
            Some(other) => Err(crate::Error::invalid_arguments(
                &self.tool,
                format!(
                    "argument {} (`{}`) must be a string, got a {}",
                    index + 1,
                    name,
                    other.shape()
                ),
            )),
            None => Err(crate::Error::invalid_arguments(
                &self.tool,
                format!("missing argument {} (`{}`)", index + 1, name),
            )),
        }
    }

    /// 선택 문자열 인자 (비어있으면 None)
    pub fn optional_text(&self, index: usize, name: &str) -> crate::Result<Option<&str>> {
        match self.args.get(index) {
            None => Ok(None),
            Some(_) => {
                let value = self.text(index, name)?;
                Ok(if value.trim().is_empty() {
                    None
                } else {
                    Some(value)
                })
            }
        }
    }

    /// 모든 인자를 경로 목록으로 평탄화
    ///
    /// `(["a", "b"])`와 `("a", "b")` 두 호출 방식을 동일하게 취급합니다.
    pub fn flatten(&self) -> Vec<String> {
        self.args
            .iter()
            .flat_map(|arg| match arg {
                ToolArg::Text(s) => vec![s.clone()],
                ToolArg::List(items) => items.clone(),
            })
            .collect()
    }
}

impl fmt::Display for ToolArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.args.iter().map(|a| a.to_string()).collect();
        write!(f, "{}({})", self.tool, rendered.join(", "))
    }
}

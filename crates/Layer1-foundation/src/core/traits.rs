//! Core Traits - 핵심 인터페이스 정의
//!
//! Layer2 이상에서 구현해야 하는 핵심 trait들을 정의합니다.
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Layer4-CLI                                                 │
//! │  └── Host bridge (JSON lines, slash commands, REPL)         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Layer3-Agent                                               │
//! │  └── ReasoningLoop: think → act → observe                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Layer2-Core / Provider                                     │
//! │  ├── Tool trait 구현 (read_file, write_file 등)             │
//! │  ├── StagedEditStore (draft → approve)                      │
//! │  └── InferenceEngine 구현 (Ollama)                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Layer1-Foundation (이 레이어)                              │
//! │  ├── Trait 정의 (Tool)                                      │
//! │  ├── PathSandbox (READ/WRITE 경계)                          │
//! │  └── Config (settings.json)                                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use super::types::ToolArgs;
use crate::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

// ============================================================================
// Tool Trait - 도구 인터페이스
// ============================================================================

/// 도구 인자 개수 계약
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    pub min: usize,
    /// `None`이면 가변 인자
    pub max: Option<usize>,
}

impl Arity {
    pub const fn exactly(n: usize) -> Self {
        Self {
            min: n,
            max: Some(n),
        }
    }

    pub const fn range(min: usize, max: usize) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    pub const fn at_least(min: usize) -> Self {
        Self { min, max: None }
    }

    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min && self.max.map_or(true, |max| count <= max)
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "exactly {}", self.min),
            Some(max) => write!(f, "{} to {}", self.min, max),
            None => write!(f, "at least {}", self.min),
        }
    }
}

/// 도구 메타데이터
#[derive(Debug, Clone)]
pub struct ToolMeta {
    /// 도구 이름 (고유 식별자)
    pub name: String,
    /// 호출 시그니처 (예: `read_file(path)`)
    pub usage: String,
    /// 한 줄 설명 - 시스템 프롬프트에 그대로 들어갑니다
    pub description: String,
    /// 카테고리 (filesystem, staging, context)
    pub category: String,
    /// 인자 개수 계약
    pub arity: Arity,
}

impl ToolMeta {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            usage: format!("{}()", name),
            name,
            description: String::new(),
            category: "general".to_string(),
            arity: Arity::exactly(0),
        }
    }

    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn category(mut self, cat: impl Into<String>) -> Self {
        self.category = cat.into();
        self
    }

    pub fn arity(mut self, arity: Arity) -> Self {
        self.arity = arity;
        self
    }

    /// 프롬프트용 한 줄 문서
    pub fn docstring(&self) -> String {
        format!("{}: {}", self.usage, self.description)
    }
}

/// 도구 실행 결과
///
/// 문자열 또는 JSON으로 변환 가능한 구조화 결과.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    Text(String),
    Json(Value),
}

impl ToolOutput {
    pub fn text(output: impl Into<String>) -> Self {
        ToolOutput::Text(output.into())
    }

    pub fn json(value: Value) -> Self {
        ToolOutput::Json(value)
    }
}

impl fmt::Display for ToolOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolOutput::Text(s) => f.write_str(s),
            ToolOutput::Json(v) => match serde_json::to_string_pretty(v) {
                Ok(s) => f.write_str(&s),
                Err(_) => write!(f, "{}", v),
            },
        }
    }
}

/// 도구 인터페이스
///
/// Layer2-core에서 구현합니다. 도구는 생성 시점에 필요한 상태
/// (Workspace 등)를 주입받고, 실행 시에는 인자만 받습니다.
#[async_trait]
pub trait Tool: Send + Sync {
    /// 도구 이름 (고유 식별자)
    fn name(&self) -> &str;

    /// 도구 메타데이터 반환
    fn meta(&self) -> ToolMeta;

    /// 도구 실행
    ///
    /// 인자 개수는 registry에서 이미 검사됩니다. 위치별 형태는
    /// `ToolArgs` 접근자가 검사합니다.
    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput>;
}

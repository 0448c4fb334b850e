//! Tool Registry - 도구 등록 및 디스패치
//!
//! Agent가 사용하는 모든 도구를 관리합니다.
//!
//! ## 기능
//! - 도구 등록/조회 (등록 순서 유지, 시스템 프롬프트에 그대로 반영)
//! - Builtin 도구 자동 등록 (Workspace 주입)
//! - 디스패치 시 인자 개수 계약 검사
//!
//! 레지스트리는 시작 시 한 번 구성되고, 실행 중에는 읽기 전용입니다.

use super::builtin;
use crate::workspace::Workspace;
use localhost_foundation::{Error, Result, Tool, ToolArg, ToolArgs, ToolMeta, ToolOutput};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 도구 레지스트리
///
/// ## 사용법
/// ```ignore
/// let registry = ToolRegistry::with_builtins(workspace);
///
/// let output = registry
///     .execute("read_file", vec![ToolArg::text("/tmp/a.txt")])
///     .await?;
/// ```
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    by_name: HashMap<String, usize>,
}

impl ToolRegistry {
    /// 빈 레지스트리 생성
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Builtin 도구들을 포함한 레지스트리 생성
    ///
    /// Workspace에 인덱스가 있으면 context 도구도 등록됩니다.
    pub fn with_builtins(workspace: Arc<Workspace>) -> Self {
        let mut registry = Self::new();
        registry.register_all(builtin::all_tools(workspace));
        registry
    }

    /// 도구 등록 (같은 이름이면 교체, 위치는 유지)
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        match self.by_name.get(&name) {
            Some(&slot) => {
                debug!("Replacing tool '{}'", name);
                self.tools[slot] = tool;
            }
            None => {
                self.by_name.insert(name, self.tools.len());
                self.tools.push(tool);
            }
        }
    }

    /// 여러 도구 한번에 등록
    pub fn register_all(&mut self, tools: Vec<Arc<dyn Tool>>) {
        for tool in tools {
            self.register(tool);
        }
    }

    /// 도구 조회
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.by_name.get(name).map(|&i| Arc::clone(&self.tools[i]))
    }

    /// 도구 존재 여부
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// 등록 순서대로 도구 이름
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// 등록 순서대로 메타데이터
    pub fn metas(&self) -> Vec<ToolMeta> {
        self.tools.iter().map(|t| t.meta()).collect()
    }

    /// 시스템 프롬프트용 도구 설명 (`- usage: description` 줄 목록)
    pub fn descriptions(&self) -> String {
        self.tools
            .iter()
            .map(|t| format!("- {}", t.meta().docstring()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// 이름으로 도구 실행
    ///
    /// 없는 도구는 `ToolNotRegistered`, 인자 개수 불일치는
    /// `InvalidArguments`를 반환합니다.
    pub async fn execute(&self, name: &str, args: Vec<ToolArg>) -> Result<ToolOutput> {
        let tool = self
            .get(name)
            .ok_or_else(|| Error::ToolNotRegistered(name.to_string()))?;

        let meta = tool.meta();
        if !meta.arity.accepts(args.len()) {
            warn!(
                tool = name,
                got = args.len(),
                expected = %meta.arity,
                "Arity mismatch"
            );
            return Err(Error::invalid_arguments(
                name,
                format!(
                    "expected {} argument(s), got {}. Usage: {}",
                    meta.arity,
                    args.len(),
                    meta.usage
                ),
            ));
        }

        let args = ToolArgs::new(name, args);
        info!("Executing {}", args);
        tool.execute(args).await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

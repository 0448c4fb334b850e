//! Find Tool - 파일 이름 검색
//!
//! - 루트 생략 시 프로젝트 루트 사용
//! - `.gitignore` 존중, 잡음 디렉토리(node_modules 등) 제외
//! - 와일드카드가 있으면 glob, 없으면 부분 문자열 (대소문자 무시)

use crate::workspace::Workspace;
use async_trait::async_trait;
use glob::{MatchOptions, Pattern};
use ignore::WalkBuilder;
use localhost_foundation::{
    Arity, Error, Operation, Result, Tool, ToolArgs, ToolMeta, ToolOutput,
};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// 검색 결과 한 건
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundEntry {
    pub path: PathBuf,
    pub is_dir: bool,
}

/// 검색 결과
#[derive(Debug, Clone)]
pub struct FindReport {
    pub pattern: String,
    pub root: PathBuf,
    pub matches: Vec<FoundEntry>,
    pub truncated: bool,
}

impl fmt::Display for FindReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.matches.is_empty() {
            return write!(
                f,
                "No files matching '{}' found in {}",
                self.pattern,
                self.root.display()
            );
        }
        write!(
            f,
            "Found {} match(es) for '{}' in {}:",
            self.matches.len(),
            self.pattern,
            self.root.display()
        )?;
        for entry in &self.matches {
            let tag = if entry.is_dir { "[DIR]" } else { "[FILE]" };
            write!(f, "\n{} {}", tag, entry.path.display())?;
        }
        if self.truncated {
            write!(f, "\n(results truncated at {})", self.matches.len())?;
        }
        Ok(())
    }
}

/// 이름 매처
enum NameMatcher {
    Glob(Pattern),
    Substring(String),
}

impl NameMatcher {
    fn new(pattern: &str) -> Result<Self> {
        if pattern.contains(['*', '?', '[']) {
            Pattern::new(pattern)
                .map(NameMatcher::Glob)
                .map_err(|e| Error::InvalidInput(format!("Invalid glob pattern: {}", e)))
        } else {
            Ok(NameMatcher::Substring(pattern.to_lowercase()))
        }
    }

    fn matches(&self, name: &str) -> bool {
        match self {
            NameMatcher::Glob(p) => p.matches_with(
                name,
                MatchOptions {
                    case_sensitive: false,
                    require_literal_separator: false,
                    require_literal_leading_dot: false,
                },
            ),
            NameMatcher::Substring(s) => name.to_lowercase().contains(s),
        }
    }
}

/// 디렉토리 트리를 걸으며 이름 매칭
pub fn find_entries(
    root: &Path,
    pattern: &str,
    ignore_dirs: &[String],
    limit: usize,
) -> Result<FindReport> {
    let matcher = NameMatcher::new(pattern)?;
    let ignore_dirs: Vec<String> = ignore_dirs.to_vec();

    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            !(is_dir
                && entry.depth() > 0
                && ignore_dirs
                    .iter()
                    .any(|d| entry.file_name().to_string_lossy() == d.as_str()))
        })
        .build();

    let mut matches = Vec::new();
    let mut truncated = false;

    for entry in walker.filter_map(|e| e.ok()) {
        if entry.depth() == 0 {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if !matcher.matches(&name) {
            continue;
        }
        if matches.len() >= limit {
            truncated = true;
            break;
        }
        matches.push(FoundEntry {
            path: entry.path().to_path_buf(),
            is_dir: entry.file_type().map(|t| t.is_dir()).unwrap_or(false),
        });
    }

    debug!(
        root = %root.display(),
        pattern,
        found = matches.len(),
        truncated,
        "find_files walk finished"
    );

    Ok(FindReport {
        pattern: pattern.to_string(),
        root: root.to_path_buf(),
        matches,
        truncated,
    })
}

/// find_files 도구
pub struct FindFilesTool {
    workspace: Arc<Workspace>,
}

impl FindFilesTool {
    pub const NAME: &'static str = "find_files";

    pub fn new(workspace: Arc<Workspace>) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl Tool for FindFilesTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn meta(&self) -> ToolMeta {
        ToolMeta::new(Self::NAME)
            .usage("find_files(pattern, root_dir)")
            .description(
                "Find files or folders whose name matches a pattern (e.g. \"*config*\"); \
                 root_dir defaults to the active project",
            )
            .category("filesystem")
            .arity(Arity::range(1, 2))
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput> {
        let pattern = args.text(0, "pattern")?.trim().to_string();
        if pattern.is_empty() {
            return Err(Error::invalid_arguments(Self::NAME, "pattern must not be empty"));
        }

        let root = match args.optional_text(1, "root_dir")? {
            Some(raw) => PathBuf::from(raw),
            None => self.workspace.project_root().ok_or_else(|| {
                Error::InvalidInput(
                    "Missing root_dir and no project root set. Use /project <path> first."
                        .to_string(),
                )
            })?,
        };

        let root = self
            .workspace
            .sandbox()
            .validate_path(&root, Operation::Read)?;
        if !root.is_dir() {
            return Err(Error::NotFound(format!("Path not found: {}", root.display())));
        }

        let files = self.workspace.files();
        let ignore_dirs = files.ignore_dirs.clone();
        let limit = files.find_limit;

        let report = tokio::task::spawn_blocking(move || {
            find_entries(&root, &pattern, &ignore_dirs, limit)
        })
        .await
        .map_err(|e| Error::Internal(format!("find_files worker failed: {}", e)))??;

        Ok(ToolOutput::text(report.to_string()))
    }
}

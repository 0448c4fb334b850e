//! System prompt 생성
//!
//! 매 실행마다 새로 만듭니다. 도구 설명과 현재 sandbox 루트가 실행 사이에
//! 바뀔 수 있기 때문입니다.
//!
//! ## 구성
//! 1. 정체성 + 사용자/홈 디렉토리
//! 2. 활성 프로젝트 (없으면 읽기 전용 안내)
//! 3. 도구 목록 (`ToolRegistry::descriptions`)
//! 4. Action 형식 규칙 + 예시
//! 5. 파일 변경 규칙 (draft, replace_in_file 우선)
//! 6. 생성 내용 포맷 규칙

use localhost_core::{ToolRegistry, Workspace};
use std::path::{Path, PathBuf};

/// System prompt builder
#[derive(Debug, Clone)]
pub struct SystemPromptBuilder {
    user: String,
    home: PathBuf,
    project_root: Option<PathBuf>,
    tool_descriptions: String,
}

impl SystemPromptBuilder {
    pub fn new(tool_descriptions: impl Into<String>) -> Self {
        Self {
            user: std::env::var("USER")
                .or_else(|_| std::env::var("USERNAME"))
                .unwrap_or_else(|_| "unknown".to_string()),
            home: dirs::home_dir().unwrap_or_else(|| PathBuf::from("~")),
            project_root: None,
            tool_descriptions: tool_descriptions.into(),
        }
    }

    /// 레지스트리와 현재 workspace 상태로부터 생성
    pub fn from_registry(registry: &ToolRegistry, workspace: &Workspace) -> Self {
        Self::new(registry.descriptions()).with_project_root(workspace.project_root())
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn with_home(mut self, home: impl AsRef<Path>) -> Self {
        self.home = home.as_ref().to_path_buf();
        self
    }

    pub fn with_project_root(mut self, root: Option<PathBuf>) -> Self {
        self.project_root = root;
        self
    }

    /// 전체 프롬프트 생성
    pub fn build(&self) -> String {
        let home = self.home.display();
        let project = match &self.project_root {
            Some(root) => format!(
                "Active Project: {}\nYou may only propose file changes inside this directory.",
                root.display()
            ),
            None => "Active Project: none\n\
                     You are in read-only mode. Writes are denied until the user runs /project <path>."
                .to_string(),
        };

        format!(
            r#"You are Localhost, an autonomous developer agent running on the user's machine.
Current User: {user}
Home Directory: {home}
{project}

You have access to the following tools:
{tools}

To use a tool, write your reasoning and then exactly ONE action line in one of these formats:
1. Action: <tool_name>: "<arg1>", "<arg2>"
2. Action: <tool_name>("<arg1>", "<arg2>")

Example:
Thought: User wants to find a 'config' file. I'll search for *config* in home.
Action: find_files: "*config*", "{home}"

After each action you will receive an Observation with the result. Use it to decide the next step.
If you have valid results or enough information to answer, simply provide the final answer without an Action.

File changes:
- write_file and replace_in_file only create a DRAFT. Nothing is written until the user types /approve.
- Prefer replace_in_file for small edits. Copy the search block exactly as it appears in the file.
- Never overwrite a file with a shortened summary. write_file must contain the COMPLETE new content.
- Always use absolute paths.

Formatting rules for generated content:
- Inside quoted arguments write newlines as \n, tabs as \t and quotes as \".
- Markdown: put a blank line before every header.
- JSON: emit valid JSON only.
- Source files: keep the existing indentation style."#,
            user = self.user,
            home = home,
            project = project,
            tools = self.tool_descriptions,
        )
    }
}

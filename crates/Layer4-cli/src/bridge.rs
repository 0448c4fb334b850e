//! Host message bridge
//!
//! Host UI와 한 줄짜리 JSON 메시지를 주고받습니다.
//!
//! ```text
//! → {"type": "query", "payload": {"text": "/ls ~/code"}}
//! ← {"status": "success", "response": "Directory: ..."}
//! ← {"status": "error", "message": "Invalid JSON"}
//! ```
//!
//! `/`로 시작하는 알려진 명령은 추론 루프를 거치지 않고 바로 처리됩니다.
//! 나머지 query는 모두 Agent로 전달됩니다.

use localhost_agent::Agent;
use localhost_core::tool::builtin::{
    FindFilesTool, IndexDirectoryTool, ListDirectoryTool, ReadFileTool,
};
use localhost_core::{EditKind, ToolRegistry, Workspace};
use localhost_foundation::ToolArg;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info};

/// `/find` 루트 생략 시 기본값
const DEFAULT_FIND_ROOT: &str = "~";

// ============================================================================
// Wire types
// ============================================================================

/// Host → agent 요청
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostRequest {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub payload: Payload,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Payload {
    #[serde(default)]
    pub text: String,
}

impl HostRequest {
    pub fn query(text: impl Into<String>) -> Self {
        Self {
            kind: Some("query".to_string()),
            payload: Payload { text: text.into() },
        }
    }
}

/// Agent → host 응답
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum HostResponse {
    Success { response: String },
    Error { message: String },
}

impl HostResponse {
    pub fn success(response: impl Into<String>) -> Self {
        HostResponse::Success {
            response: response.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        HostResponse::Error {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, HostResponse::Success { .. })
    }

    /// 응답 본문 또는 에러 메시지
    pub fn text(&self) -> &str {
        match self {
            HostResponse::Success { response } => response,
            HostResponse::Error { message } => message,
        }
    }
}

// ============================================================================
// Slash commands
// ============================================================================

/// 추론 루프를 우회하는 명령
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    List(Option<String>),
    Read(Option<String>),
    Find {
        pattern: Option<String>,
        root: Option<String>,
    },
    /// 인자 없으면 루트 해제
    Project(Option<String>),
    Approve,
    Reset,
    Pending,
    Index(Option<String>),
    Help,
}

impl SlashCommand {
    /// 알려진 명령이 아니면 `None` (→ Agent로 전달)
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if !text.starts_with('/') {
            return None;
        }
        let (name, rest) = match text.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (text, ""),
        };
        let arg = (!rest.is_empty()).then(|| rest.to_string());

        let command = match name {
            "/ls" => SlashCommand::List(arg),
            "/read" => SlashCommand::Read(arg),
            "/find" => {
                let mut parts = split_args(rest).into_iter();
                let pattern = parts.next();
                let remaining: Vec<String> = parts.collect();
                let root = (!remaining.is_empty()).then(|| remaining.join(" "));
                SlashCommand::Find { pattern, root }
            }
            "/project" => SlashCommand::Project(arg),
            "/approve" => SlashCommand::Approve,
            "/reset" => SlashCommand::Reset,
            "/pending" => SlashCommand::Pending,
            "/index" => SlashCommand::Index(arg),
            "/help" => SlashCommand::Help,
            _ => return None,
        };
        Some(command)
    }
}

/// 따옴표 인식 분리, 실패 시 공백 분리
fn split_args(rest: &str) -> Vec<String> {
    shlex::split(rest)
        .unwrap_or_else(|| rest.split_whitespace().map(String::from).collect())
}

const HELP: &str = "\
Commands:
  /ls <path>               List a directory
  /read <path>             Read a file
  /find <pattern> [root]   Find files by name (root defaults to ~)
  /project [path]          Set the active project (no path clears it)
  /pending                 Show drafts waiting for approval
  /approve                 Apply all drafts
  /reset                   Discard drafts and clear the project
  /index <path>            Index a directory for search (when available)
Anything else is sent to the agent.";

// ============================================================================
// Bridge
// ============================================================================

/// 요청 처리기
pub struct Bridge {
    agent: Agent,
    workspace: Arc<Workspace>,
    registry: Arc<ToolRegistry>,
}

impl Bridge {
    pub fn new(agent: Agent) -> Self {
        Self {
            workspace: Arc::clone(agent.workspace()),
            registry: Arc::clone(agent.registry()),
            agent,
        }
    }

    pub fn workspace(&self) -> &Arc<Workspace> {
        &self.workspace
    }

    /// JSON 한 줄 처리
    pub async fn handle_line(&self, line: &str) -> HostResponse {
        let value: serde_json::Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                error!("Failed to decode JSON: {} ({})", line, e);
                return HostResponse::error("Invalid JSON");
            }
        };
        match serde_json::from_value::<HostRequest>(value) {
            Ok(request) => self.handle(request).await,
            Err(e) => {
                error!("Error processing message: {}", e);
                HostResponse::error(e.to_string())
            }
        }
    }

    pub async fn handle(&self, request: HostRequest) -> HostResponse {
        match request.kind.as_deref() {
            Some("query") => self.query(&request.payload.text).await,
            other => {
                debug!(kind = ?other, "unknown message type");
                HostResponse::error("Unknown message type")
            }
        }
    }

    /// slash 명령 또는 Agent 실행
    pub async fn query(&self, text: &str) -> HostResponse {
        if let Some(command) = SlashCommand::parse(text) {
            info!(?command, "slash command");
            return HostResponse::success(self.command(command).await);
        }

        match self.agent.run(text).await {
            Ok(outcome) => HostResponse::success(outcome.into_response()),
            Err(e) => {
                error!("Agent run failed: {}", e);
                HostResponse::error(format!("Agent error: {}", e))
            }
        }
    }

    async fn command(&self, command: SlashCommand) -> String {
        match command {
            SlashCommand::List(Some(path)) => self.tool(ListDirectoryTool::NAME, vec![path]).await,
            SlashCommand::List(None) => "Usage: /ls <path>".to_string(),
            SlashCommand::Read(Some(path)) => self.tool(ReadFileTool::NAME, vec![path]).await,
            SlashCommand::Read(None) => "Usage: /read <path>".to_string(),
            SlashCommand::Find {
                pattern: Some(pattern),
                root,
            } => {
                let root = root.unwrap_or_else(|| DEFAULT_FIND_ROOT.to_string());
                self.tool(FindFilesTool::NAME, vec![pattern, root]).await
            }
            SlashCommand::Find { pattern: None, .. } => {
                "Usage: /find <pattern> [root]".to_string()
            }
            SlashCommand::Project(path) => {
                let path = path.as_deref().map(Path::new);
                match self.workspace.set_project_root(path).await {
                    Ok(switch) => switch.to_string(),
                    Err(e) => format!("Error: {}", e),
                }
            }
            SlashCommand::Approve => self.workspace.approve().to_string(),
            SlashCommand::Reset => match self.workspace.reset().await {
                Ok(switch) => switch.to_string(),
                Err(e) => format!("Error: {}", e),
            },
            SlashCommand::Pending => self.pending(),
            SlashCommand::Index(Some(path)) if self.registry.contains(IndexDirectoryTool::NAME) => {
                self.tool(IndexDirectoryTool::NAME, vec![path]).await
            }
            SlashCommand::Index(Some(_)) => "Codebase index is not available.".to_string(),
            SlashCommand::Index(None) => "Usage: /index <path>".to_string(),
            SlashCommand::Help => HELP.to_string(),
        }
    }

    async fn tool(&self, name: &str, args: Vec<String>) -> String {
        let args = args.into_iter().map(ToolArg::Text).collect();
        match self.registry.execute(name, args).await {
            Ok(output) => output.to_string(),
            Err(e) => format!("Error: {}", e),
        }
    }

    fn pending(&self) -> String {
        let pending = self.workspace.staging().pending();
        if pending.is_empty() {
            return "No pending edits.".to_string();
        }

        let mut out = format!("{} pending draft(s):", pending.len());
        for edit in &pending {
            let kind = match edit.kind {
                EditKind::Write => "write",
                EditKind::PartialReplace => "partial",
            };
            out.push_str(&format!(
                "\n- {} ({}, +{} -{})",
                edit.path.display(),
                kind,
                edit.diff.added,
                edit.diff.removed
            ));
        }
        out.push_str("\nType /approve to apply.");
        out
    }
}

/// line-delimited JSON 루프
///
/// 입력이 끝날 때까지 한 줄씩 처리하고, 응답마다 flush합니다.
pub async fn serve<R, W>(bridge: &Bridge, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    info!("Host bridge started");
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        debug!("Received: {}", line.trim());

        let response = bridge.handle_line(&line).await;
        let encoded = serde_json::to_string(&response).map_err(std::io::Error::other)?;

        writer.write_all(encoded.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
        debug!("Sent: {}", encoded);
    }

    info!("Host bridge input closed");
    Ok(())
}

//! Read Tools - 파일 읽기 도구
//!
//! - `read_file`: 단일 파일 (크기 제한, 바이너리 감지, 긴 내용 자르기)
//! - `read_multiple_files`: 리스트 인자 또는 가변 인자 모두 허용

use crate::workspace::Workspace;
use async_trait::async_trait;
use localhost_foundation::{
    Arity, Error, Operation, Result, Tool, ToolArgs, ToolMeta, ToolOutput,
};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// 자르기 표시
pub const TRUNCATION_MARKER: &str = "\n...[truncated]";

const SECTION_SEPARATOR: &str = "========================================";

/// 읽은 파일
#[derive(Debug, Clone)]
pub struct FileContent {
    pub path: PathBuf,
    pub content: String,
    pub truncated: bool,
}

/// 샌드박스 검증 + 제한 적용 후 파일 읽기
pub fn read_text(workspace: &Workspace, raw: &str) -> Result<FileContent> {
    let path = workspace.sandbox().validate_path(raw, Operation::Read)?;
    let limits = workspace.files();

    if !path.exists() {
        return Err(Error::NotFound(format!("File not found: {}", raw)));
    }
    if !path.is_file() {
        return Err(Error::InvalidInput(format!("Not a file: {}", raw)));
    }

    let size = fs::metadata(&path)?.len();
    if size > limits.max_read_bytes {
        return Err(Error::InvalidInput(format!(
            "File too large (>{}MB)",
            limits.max_read_bytes / (1024 * 1024)
        )));
    }

    let bytes = fs::read(&path)?;
    let content = String::from_utf8(bytes).map_err(|_| {
        Error::InvalidInput("Binary file not supported (cannot decode as UTF-8)".to_string())
    })?;

    match content.char_indices().nth(limits.max_read_chars) {
        Some((cut, _)) => Ok(FileContent {
            path,
            content: format!("{}{}", &content[..cut], TRUNCATION_MARKER),
            truncated: true,
        }),
        None => Ok(FileContent {
            path,
            content,
            truncated: false,
        }),
    }
}

// ============================================================================
// read_file
// ============================================================================

pub struct ReadFileTool {
    workspace: Arc<Workspace>,
}

impl ReadFileTool {
    pub const NAME: &'static str = "read_file";

    pub fn new(workspace: Arc<Workspace>) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn meta(&self) -> ToolMeta {
        ToolMeta::new(Self::NAME)
            .usage("read_file(path)")
            .description("Read the text content of a file (long files are truncated)")
            .category("filesystem")
            .arity(Arity::exactly(1))
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput> {
        let file = read_text(&self.workspace, args.text(0, "path")?)?;
        Ok(ToolOutput::text(file.content))
    }
}

// ============================================================================
// read_multiple_files
// ============================================================================

pub struct ReadMultipleFilesTool {
    workspace: Arc<Workspace>,
}

impl ReadMultipleFilesTool {
    pub const NAME: &'static str = "read_multiple_files";

    pub fn new(workspace: Arc<Workspace>) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl Tool for ReadMultipleFilesTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn meta(&self) -> ToolMeta {
        ToolMeta::new(Self::NAME)
            .usage("read_multiple_files([path1, path2, ...])")
            .description("Read several files at once; per-file errors are reported inline")
            .category("filesystem")
            .arity(Arity::at_least(1))
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput> {
        let paths = args.flatten();
        if paths.is_empty() {
            return Err(Error::invalid_arguments(Self::NAME, "no paths given"));
        }

        let sections: Vec<String> = paths
            .iter()
            .map(|path| match read_text(&self.workspace, path) {
                Ok(file) => format!("## File: {}\n{}", path, file.content),
                Err(e) => format!("## File: {}\n[ERROR] {}", path, e),
            })
            .collect();

        let separator = format!("\n\n{}\n\n", SECTION_SEPARATOR);
        Ok(ToolOutput::text(sections.join(&separator)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use localhost_foundation::config::FileSettings;
    use localhost_foundation::{PathSandbox, ToolArg};

    fn workspace(files: FileSettings) -> Arc<Workspace> {
        Arc::new(Workspace::new(Arc::new(PathSandbox::new())).with_file_settings(files))
    }

    fn arg(path: &std::path::Path) -> ToolArg {
        ToolArg::text(path.display().to_string())
    }

    #[tokio::test]
    async fn test_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "hello").unwrap();

        let tool = ReadFileTool::new(workspace(FileSettings::default()));
        let out = tool
            .execute(ToolArgs::new("read_file", vec![arg(&path)]))
            .await
            .unwrap();
        assert_eq!(out.to_string(), "hello");
    }

    #[tokio::test]
    async fn test_read_truncates_by_chars() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("long.txt");
        fs::write(&path, "é".repeat(20)).unwrap();

        let files = FileSettings {
            max_read_chars: 5,
            ..FileSettings::default()
        };
        let file = read_text(&workspace(files), &path.display().to_string()).unwrap();
        assert!(file.truncated);
        assert_eq!(file.content, format!("ééééé{}", TRUNCATION_MARKER));
    }

    #[tokio::test]
    async fn test_read_rejects_large_binary_and_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let big = dir.path().join("big.txt");
        fs::write(&big, "x".repeat(64)).unwrap();
        let bin = dir.path().join("bin.dat");
        fs::write(&bin, [0xff, 0xfe, 0x00, 0x80]).unwrap();

        let files = FileSettings {
            max_read_bytes: 32,
            ..FileSettings::default()
        };
        let ws = workspace(files);
        let err = read_text(&ws, &big.display().to_string()).unwrap_err();
        assert!(err.to_string().contains("File too large"));

        let ws = workspace(FileSettings::default());
        let err = read_text(&ws, &bin.display().to_string()).unwrap_err();
        assert!(err.to_string().contains("Binary file not supported"));

        let err = read_text(&ws, &dir.path().display().to_string()).unwrap_err();
        assert!(err.to_string().contains("Not a file"));
    }

    #[tokio::test]
    async fn test_read_multiple_both_conventions() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, "AAA").unwrap();
        fs::write(&b, "BBB").unwrap();

        let tool = ReadMultipleFilesTool::new(workspace(FileSettings::default()));
        let listed = tool
            .execute(ToolArgs::new(
                "read_multiple_files",
                vec![ToolArg::list([a.display().to_string(), b.display().to_string()])],
            ))
            .await
            .unwrap()
            .to_string();
        let spread = tool
            .execute(ToolArgs::new("read_multiple_files", vec![arg(&a), arg(&b)]))
            .await
            .unwrap()
            .to_string();

        assert_eq!(listed, spread);
        assert!(listed.contains(&format!("## File: {}\nAAA", a.display())));
        assert!(listed.contains(SECTION_SEPARATOR));
    }

    #[tokio::test]
    async fn test_read_multiple_inline_errors() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        fs::write(&a, "AAA").unwrap();

        let tool = ReadMultipleFilesTool::new(workspace(FileSettings::default()));
        let out = tool
            .execute(ToolArgs::new(
                "read_multiple_files",
                vec![arg(&a), "/etc/passwd".into()],
            ))
            .await
            .unwrap()
            .to_string();
        assert!(out.contains("AAA"));
        assert!(out.contains("## File: /etc/passwd\n[ERROR] SecurityError"));
    }
}

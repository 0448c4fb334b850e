//! List Tool - 디렉토리 목록

use crate::workspace::Workspace;
use async_trait::async_trait;
use localhost_foundation::{
    Arity, Error, Operation, Result, Tool, ToolArgs, ToolMeta, ToolOutput,
};
use std::fs;
use std::sync::Arc;

/// list_directory 도구
pub struct ListDirectoryTool {
    workspace: Arc<Workspace>,
}

impl ListDirectoryTool {
    pub const NAME: &'static str = "list_directory";

    pub fn new(workspace: Arc<Workspace>) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl Tool for ListDirectoryTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn meta(&self) -> ToolMeta {
        ToolMeta::new(Self::NAME)
            .usage("list_directory(path)")
            .description("List files and folders in a directory")
            .category("filesystem")
            .arity(Arity::exactly(1))
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput> {
        let raw = args.text(0, "path")?;
        let path = self
            .workspace
            .sandbox()
            .validate_path(raw, Operation::Read)?;

        if !path.exists() {
            return Err(Error::NotFound(format!("Path not found: {}", raw)));
        }
        if !path.is_dir() {
            return Err(Error::InvalidInput(format!("Not a directory: {}", raw)));
        }

        let mut entries: Vec<(bool, String)> = fs::read_dir(&path)?
            .filter_map(|e| e.ok())
            .map(|e| {
                let is_dir = e.file_type().map(|t| t.is_dir()).unwrap_or(false);
                (is_dir, e.file_name().to_string_lossy().into_owned())
            })
            .collect();
        entries.sort_by(|a, b| a.1.cmp(&b.1));

        let mut output = format!("Directory: {}\n", path.display());
        if entries.is_empty() {
            output.push_str("(empty directory)");
        } else {
            let lines: Vec<String> = entries
                .iter()
                .map(|(is_dir, name)| {
                    let tag = if *is_dir { "[DIR]" } else { "[FILE]" };
                    format!("{} {}", tag, name)
                })
                .collect();
            output.push_str(&lines.join("\n"));
        }

        Ok(ToolOutput::text(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use localhost_foundation::PathSandbox;

    fn tool() -> ListDirectoryTool {
        ListDirectoryTool::new(Arc::new(Workspace::new(Arc::new(PathSandbox::new()))))
    }

    #[tokio::test]
    async fn test_list_sorted_with_tags() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        fs::create_dir(dir.path().join("a_dir")).unwrap();

        let args = ToolArgs::new("list_directory", vec![dir.path().display().to_string().into()]);
        let out = tool().execute(args).await.unwrap().to_string();
        let lines: Vec<&str> = out.lines().skip(1).collect();
        assert_eq!(lines, vec!["[DIR] a_dir", "[FILE] b.txt"]);
    }

    #[tokio::test]
    async fn test_list_missing_and_blocked() {
        let args = ToolArgs::new("list_directory", vec!["/no/such/dir/xyz".into()]);
        assert!(matches!(
            tool().execute(args).await,
            Err(Error::NotFound(_))
        ));

        let args = ToolArgs::new("list_directory", vec!["/etc".into()]);
        assert!(tool().execute(args).await.unwrap_err().is_security());
    }
}

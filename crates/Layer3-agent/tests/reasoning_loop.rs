//! Reasoning loop integration tests
//!
//! 미리 정해둔 응답을 돌려주는 엔진으로 전체 루프를 실제 임시 디렉토리 위에서 실행합니다.
//! 실행: cargo test -p localhost-agent --test reasoning_loop

use async_trait::async_trait;
use localhost_agent::{Agent, AgentOutcome, LoopState, DEFAULT_MAX_STEPS};
use localhost_core::{ToolRegistry, Workspace};
use localhost_foundation::{Error, Message, PathSandbox, Result};
use localhost_provider::InferenceEngine;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// 스크립트 응답 엔진. `None`은 추론 실패를 뜻합니다.
struct ScriptedEngine {
    replies: Mutex<Vec<Option<String>>>,
    transcripts: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedEngine {
    fn new(replies: Vec<Option<String>>) -> Arc<Self> {
        let mut replies = replies;
        replies.reverse();
        Arc::new(Self {
            replies: Mutex::new(replies),
            transcripts: Mutex::new(Vec::new()),
        })
    }

    fn replies<S: Into<String>>(replies: Vec<S>) -> Arc<Self> {
        Self::new(replies.into_iter().map(|r| Some(r.into())).collect())
    }

    fn calls(&self) -> usize {
        self.transcripts.lock().unwrap().len()
    }

    /// n번째 호출 시 마지막 메시지 (= 직전 observation)
    fn last_message_of_call(&self, n: usize) -> String {
        self.transcripts.lock().unwrap()[n]
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl InferenceEngine for ScriptedEngine {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, history: &[Message]) -> Result<String> {
        self.transcripts.lock().unwrap().push(history.to_vec());
        match self.replies.lock().unwrap().pop() {
            Some(Some(reply)) => Ok(reply),
            Some(None) => Err(Error::inference("model crashed")),
            None => Ok("Action: list_directory: \"/\"".to_string()),
        }
    }
}

struct Fixture {
    _dir: tempfile::TempDir,
    root: PathBuf,
    workspace: Arc<Workspace>,
    registry: Arc<ToolRegistry>,
}

async fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let workspace = Arc::new(Workspace::new(Arc::new(PathSandbox::new())));
    workspace.set_project_root(Some(dir.path())).await.unwrap();
    let root = workspace.project_root().unwrap();
    let registry = Arc::new(ToolRegistry::with_builtins(Arc::clone(&workspace)));
    Fixture {
        _dir: dir,
        root,
        workspace,
        registry,
    }
}

impl Fixture {
    fn agent(&self, engine: Arc<ScriptedEngine>) -> Agent {
        Agent::new(engine, Arc::clone(&self.registry), Arc::clone(&self.workspace))
    }

    fn path(&self, name: &str) -> String {
        self.root.join(name).display().to_string()
    }
}

#[tokio::test]
async fn test_never_ending_actions_stop_at_default_bound() {
    let fx = fixture().await;
    let engine = ScriptedEngine::replies(Vec::<String>::new());

    let outcome = fx.agent(Arc::clone(&engine)).run("keep going").await.unwrap();

    assert_eq!(outcome.state(), LoopState::Stopped);
    assert_eq!(outcome.steps(), DEFAULT_MAX_STEPS);
    assert_eq!(engine.calls(), DEFAULT_MAX_STEPS);
    assert!(outcome
        .to_string()
        .ends_with("\n(Agent stopped after 15 steps)"));
}

#[tokio::test]
async fn test_write_is_staged_until_approved() {
    let fx = fixture().await;
    let target = fx.path("notes.md");
    let engine = ScriptedEngine::replies(vec![
        format!(r##"Action: write_file: "{}", "# Notes\n- first""##, target),
        "I drafted notes.md. Type /approve to apply it.".to_string(),
    ]);

    let outcome = fx.agent(Arc::clone(&engine)).run("create notes").await.unwrap();

    assert_eq!(
        outcome,
        AgentOutcome::Done {
            answer: "I drafted notes.md. Type /approve to apply it.".to_string(),
            steps: 2
        }
    );
    let observation = engine.last_message_of_call(1);
    assert!(observation.starts_with("Observation: 📝 DRAFT CREATED for notes.md"));
    assert!(observation.contains("+# Notes"));
    assert!(!PathBuf::from(&target).exists());
    assert_eq!(fx.workspace.staging().len(), 1);

    let report = fx.workspace.approve();
    assert_eq!(report.applied(), 1);
    assert_eq!(fs::read_to_string(&target).unwrap(), "# Notes\n- first\n");
}

#[tokio::test]
async fn test_security_denial_is_fed_back() {
    let fx = fixture().await;
    let outside = tempfile::tempdir().unwrap();
    let target = outside.path().join("escape.txt");
    let engine = ScriptedEngine::replies(vec![
        format!(r#"Action: write_file("{}", "x")"#, target.display()),
        "I cannot write there.".to_string(),
    ]);

    let outcome = fx.agent(Arc::clone(&engine)).run("write outside").await.unwrap();

    assert_eq!(outcome.state(), LoopState::Done);
    let observation = engine.last_message_of_call(1);
    assert!(observation.starts_with("Observation: Error executing tool: SecurityError"));
    assert!(fx.workspace.staging().is_empty());
}

#[tokio::test]
async fn test_destructive_overwrite_is_refused() {
    let fx = fixture().await;
    let target = fx.path("long.txt");
    fs::write(&target, "x".repeat(100)).unwrap();
    let engine = ScriptedEngine::replies(vec![
        format!(r#"Action: write_file: "{}", "summary""#, target),
        "Understood, I will use replace_in_file.".to_string(),
    ]);

    fx.agent(Arc::clone(&engine)).run("shorten").await.unwrap();

    let observation = engine.last_message_of_call(1);
    assert!(observation.contains("SAFETY ALERT"));
    assert!(observation.contains("replace_in_file"));
    assert!(fx.workspace.staging().is_empty());
    assert_eq!(fs::read_to_string(&target).unwrap(), "x".repeat(100));
}

#[tokio::test]
async fn test_read_tools_with_both_dialects() {
    let fx = fixture().await;
    fs::write(fx.root.join("a.txt"), "alpha").unwrap();
    fs::write(fx.root.join("b.txt"), "beta").unwrap();
    let engine = ScriptedEngine::replies(vec![
        format!(r#"Action: find_files: "*.txt", "{}""#, fx.root.display()),
        format!(
            r#"Action: read_multiple_files(["{}", "{}"])"#,
            fx.path("a.txt"),
            fx.path("b.txt")
        ),
        "a.txt says alpha and b.txt says beta.".to_string(),
    ]);

    let outcome = fx.agent(Arc::clone(&engine)).run("read txt files").await.unwrap();

    assert_eq!(outcome.steps(), 3);
    assert!(engine
        .last_message_of_call(1)
        .starts_with("Observation: Found 2 match(es) for '*.txt'"));
    let read = engine.last_message_of_call(2);
    assert!(read.contains("alpha"));
    assert!(read.contains("beta"));
}

#[tokio::test]
async fn test_inference_failure_aborts_query() {
    let fx = fixture().await;
    let engine = ScriptedEngine::new(vec![
        Some(format!(r#"Action: list_directory: "{}""#, fx.root.display())),
        None,
    ]);

    let err = fx.agent(Arc::clone(&engine)).run("list").await.unwrap_err();

    assert!(matches!(err, Error::Inference(_)));
    assert_eq!(engine.calls(), 2);
}

#[tokio::test]
async fn test_each_query_starts_fresh() {
    let fx = fixture().await;
    let engine = ScriptedEngine::replies(vec!["first answer", "second answer"]);
    let agent = fx.agent(Arc::clone(&engine));

    agent.run("one").await.unwrap();
    agent.run("two").await.unwrap();

    let transcripts = engine.transcripts.lock().unwrap();
    assert_eq!(transcripts[1].len(), 2);
    assert_eq!(transcripts[1][1].content, "two");
}

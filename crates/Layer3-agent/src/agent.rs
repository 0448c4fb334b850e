//! Agent - think → act → observe 루프
//!
//! ```text
//! THINKING ──(action)──▶ ACTING ──▶ OBSERVING ──▶ THINKING
//!    │                                              │
//!    └──(no action)──▶ DONE        (step bound)──▶ STOPPED
//! ```
//!
//! - 추론 엔진 호출이 유일한 대기 지점이며, 실패하면 쿼리 전체가 중단됩니다.
//! - 도구 실패(보안 거부, 없는 도구 포함)는 observation 문자열로 바뀌어
//!   모델에게 다시 전달됩니다.
//! - 루프는 sandbox나 draft 큐를 직접 건드리지 않습니다. 모든 상태 변경은
//!   도구 실행 안에서 일어납니다.

use crate::history::ConversationHistory;
use crate::parser::{ActionParser, ParsedAction};
use crate::prompt::SystemPromptBuilder;
use localhost_core::{ToolRegistry, Workspace};
use localhost_foundation::{Error, Result};
use localhost_provider::InferenceEngine;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// 쿼리당 기본 최대 단계
pub const DEFAULT_MAX_STEPS: usize = 15;

/// 루프 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Thinking,
    Acting,
    Observing,
    Done,
    Stopped,
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoopState::Thinking => "THINKING",
            LoopState::Acting => "ACTING",
            LoopState::Observing => "OBSERVING",
            LoopState::Done => "DONE",
            LoopState::Stopped => "STOPPED",
        };
        f.write_str(name)
    }
}

/// UI용 이벤트
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentEvent {
    /// 추론 엔진 호출 시작
    Thinking { step: usize },

    /// 도구 호출 결정
    Action { step: usize, call: String },

    /// 도구 결과
    Observation { step: usize, text: String },

    /// 최종 답변
    Done { answer: String },

    /// 단계 한도 도달
    Stopped { steps: usize },
}

/// 실행 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentOutcome {
    /// 모델이 Action 없이 답변
    Done { answer: String, steps: usize },

    /// 단계 한도 도달
    Stopped { last: String, steps: usize },
}

impl AgentOutcome {
    pub fn state(&self) -> LoopState {
        match self {
            AgentOutcome::Done { .. } => LoopState::Done,
            AgentOutcome::Stopped { .. } => LoopState::Stopped,
        }
    }

    pub fn steps(&self) -> usize {
        match self {
            AgentOutcome::Done { steps, .. } | AgentOutcome::Stopped { steps, .. } => *steps,
        }
    }

    /// 사용자에게 보여줄 텍스트
    pub fn into_response(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AgentOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentOutcome::Done { answer, .. } => f.write_str(answer),
            AgentOutcome::Stopped { last, steps } => {
                write!(f, "{}\n(Agent stopped after {} steps)", last, steps)
            }
        }
    }
}

/// The reasoning loop
pub struct Agent {
    engine: Arc<dyn InferenceEngine>,
    registry: Arc<ToolRegistry>,
    workspace: Arc<Workspace>,
    parser: ActionParser,
    max_steps: usize,
    events: Option<mpsc::Sender<AgentEvent>>,
}

impl Agent {
    pub fn new(
        engine: Arc<dyn InferenceEngine>,
        registry: Arc<ToolRegistry>,
        workspace: Arc<Workspace>,
    ) -> Self {
        Self {
            engine,
            registry,
            workspace,
            parser: ActionParser::new(),
            max_steps: DEFAULT_MAX_STEPS,
            events: None,
        }
    }

    /// Set maximum steps (최소 1)
    pub fn with_max_steps(mut self, max: usize) -> Self {
        self.max_steps = max.max(1);
        self
    }

    pub fn with_parser(mut self, parser: ActionParser) -> Self {
        self.parser = parser;
        self
    }

    /// 이벤트 채널 연결
    pub fn with_events(mut self, tx: mpsc::Sender<AgentEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    pub fn workspace(&self) -> &Arc<Workspace> {
        &self.workspace
    }

    /// 쿼리 하나 실행
    ///
    /// 추론 엔진 실패만 `Err`로 반환됩니다.
    pub async fn run(&self, query: &str) -> Result<AgentOutcome> {
        let run_id = Uuid::new_v4();
        let span = info_span!("agent_run", run_id = %run_id, engine = self.engine.name());
        self.run_inner(query).instrument(span).await
    }

    async fn run_inner(&self, query: &str) -> Result<AgentOutcome> {
        let system_prompt =
            SystemPromptBuilder::from_registry(&self.registry, &self.workspace).build();
        let mut history = ConversationHistory::new(system_prompt, query);
        let mut last_response = String::new();

        info!(max_steps = self.max_steps, "agent run started");

        for step in 0..self.max_steps {
            // THINKING
            debug!(step, state = %LoopState::Thinking, "calling inference engine");
            self.emit(AgentEvent::Thinking { step }).await;

            let response = self
                .engine
                .generate(history.messages())
                .await
                .map_err(|e| match e {
                    Error::Inference(_) => e,
                    other => Error::Inference(other.to_string()),
                })?;
            debug!(step, output = %response, "model output");
            last_response = response.clone();

            let Some(action) = self.parser.parse(&response) else {
                info!(steps = step + 1, state = %LoopState::Done, "final answer");
                self.emit(AgentEvent::Done {
                    answer: response.clone(),
                })
                .await;
                return Ok(AgentOutcome::Done {
                    answer: response,
                    steps: step + 1,
                });
            };

            // ACTING
            debug!(step, state = %LoopState::Acting, call = %action, "dispatching action");
            self.emit(AgentEvent::Action {
                step,
                call: action.to_string(),
            })
            .await;
            let observation = self.dispatch(action).await;

            // OBSERVING
            debug!(step, state = %LoopState::Observing, "observation recorded");
            self.emit(AgentEvent::Observation {
                step,
                text: observation.clone(),
            })
            .await;
            history.push_assistant(response);
            history.push_observation(observation);
        }

        warn!(steps = self.max_steps, state = %LoopState::Stopped, "step bound reached");
        self.emit(AgentEvent::Stopped {
            steps: self.max_steps,
        })
        .await;
        Ok(AgentOutcome::Stopped {
            last: last_response,
            steps: self.max_steps,
        })
    }

    /// 도구 실행 → observation 본문 (접두사 제외)
    async fn dispatch(&self, action: ParsedAction) -> String {
        let ParsedAction { tool, args, .. } = action;
        match self.registry.execute(&tool, args).await {
            Ok(output) => output.to_string(),
            Err(Error::ToolNotRegistered(name)) => {
                warn!(tool = %name, "model asked for an unknown tool");
                format!("Tool '{}' not found.", name)
            }
            Err(e) => {
                if e.is_security() {
                    warn!(tool = %tool, error = %e, "tool denied by sandbox");
                } else {
                    debug!(tool = %tool, error = %e, "tool failed");
                }
                format!("Error executing tool: {}", e)
            }
        }
    }

    async fn emit(&self, event: AgentEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use localhost_foundation::{Message, PathSandbox};
    use std::sync::Mutex;

    /// 미리 정해둔 응답을 순서대로 돌려주는 엔진
    struct Script {
        replies: Mutex<Vec<String>>,
        seen: Mutex<Vec<Vec<Message>>>,
    }

    impl Script {
        fn new(replies: &[&str]) -> Self {
            let mut replies: Vec<String> = replies.iter().map(|s| s.to_string()).collect();
            replies.reverse();
            Self {
                replies: Mutex::new(replies),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl InferenceEngine for Script {
        fn name(&self) -> &str {
            "script"
        }

        async fn generate(&self, history: &[Message]) -> Result<String> {
            self.seen.lock().unwrap().push(history.to_vec());
            Ok(self
                .replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| "out of script".to_string()))
        }
    }

    fn agent(engine: Arc<Script>) -> Agent {
        let workspace = Arc::new(Workspace::new(Arc::new(PathSandbox::new())));
        let registry = Arc::new(ToolRegistry::with_builtins(Arc::clone(&workspace)));
        Agent::new(engine, registry, workspace)
    }

    #[tokio::test]
    async fn test_final_answer_without_action() {
        let engine = Arc::new(Script::new(&["Hello! How can I help?"]));
        let outcome = agent(Arc::clone(&engine)).run("hi").await.unwrap();
        assert_eq!(
            outcome,
            AgentOutcome::Done {
                answer: "Hello! How can I help?".to_string(),
                steps: 1
            }
        );
        assert_eq!(outcome.state(), LoopState::Done);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_observation() {
        let engine = Arc::new(Script::new(&["Action: launch_rocket: \"now\"", "ok"]));
        let outcome = agent(Arc::clone(&engine)).run("go").await.unwrap();
        assert_eq!(outcome.steps(), 2);

        let seen = engine.seen.lock().unwrap();
        let second = &seen[1];
        assert_eq!(
            second.last().unwrap().content,
            "Observation: Tool 'launch_rocket' not found."
        );
    }

    #[tokio::test]
    async fn test_stops_at_step_bound() {
        let engine = Arc::new(Script::new(&["Action: list_directory: \"/nope\""; 20]));
        let outcome = agent(Arc::clone(&engine))
            .with_max_steps(3)
            .run("loop forever")
            .await
            .unwrap();

        assert_eq!(outcome.state(), LoopState::Stopped);
        assert_eq!(engine.seen.lock().unwrap().len(), 3);
        assert_eq!(
            outcome.to_string(),
            "Action: list_directory: \"/nope\"\n(Agent stopped after 3 steps)"
        );
    }

    #[tokio::test]
    async fn test_events_follow_states() {
        let (tx, mut rx) = mpsc::channel(16);
        let engine = Arc::new(Script::new(&["Action: nothing_here()", "done"]));
        agent(engine).with_events(tx).run("q").await.unwrap();

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert_eq!(
            events,
            vec![
                AgentEvent::Thinking { step: 0 },
                AgentEvent::Action {
                    step: 0,
                    call: "nothing_here()".to_string()
                },
                AgentEvent::Observation {
                    step: 0,
                    text: "Tool 'nothing_here' not found.".to_string()
                },
                AgentEvent::Thinking { step: 1 },
                AgentEvent::Done {
                    answer: "done".to_string()
                },
            ]
        );
    }
}

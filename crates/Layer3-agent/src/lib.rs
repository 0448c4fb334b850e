//! # localhost-agent
//!
//! Reasoning loop for Localhost. 모델의 자유 텍스트 출력을 도구 호출로
//! 바꾸고, 결과를 다시 대화에 넣는 think → act → observe 루프입니다.
//!
//! ## 핵심 원칙
//!
//! 1. **Sequential** - 한 단계에 도구 하나, 결과를 본 뒤 다음 추론
//! 2. **Fresh History** - 쿼리마다 새 ConversationHistory
//! 3. **Recoverable Tools** - 도구 실패는 observation으로 모델에게 전달
//! 4. **Bounded** - 최대 단계(기본 15) 도달 시 STOPPED
//!
//! ## 핵심 컴포넌트
//!
//! - **ActionParser**: dialect strategy 목록 + 인자 tokenizer cascade
//! - **SystemPromptBuilder**: 도구 설명 + sandbox 상태 + 포맷 규칙
//! - **Agent**: 메인 루프
//!
//! ## 사용 예
//!
//! ```ignore
//! use localhost_agent::{Agent, AgentEvent};
//!
//! let workspace = Arc::new(Workspace::from_config(&config));
//! let registry = Arc::new(ToolRegistry::with_builtins(Arc::clone(&workspace)));
//! let engine = Arc::new(OllamaEngine::from_settings(&config.provider, &config.agent)?);
//!
//! let (tx, mut rx) = tokio::sync::mpsc::channel(100);
//! let agent = Agent::new(engine, registry, workspace).with_events(tx);
//!
//! let outcome = agent.run("find my nginx config").await?;
//! println!("{}", outcome);
//! ```

pub mod agent;
pub mod history;
pub mod parser;
pub mod prompt;

pub use agent::{Agent, AgentEvent, AgentOutcome, LoopState, DEFAULT_MAX_STEPS};
pub use history::{ConversationHistory, OBSERVATION_PREFIX};
pub use parser::{
    ActionParser, ActionStrategy, CallForm, ColonForm, Dialect, ParsedAction, RawAction,
    StrategyOutcome,
};
pub use prompt::SystemPromptBuilder;

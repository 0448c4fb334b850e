//! Localhost CLI - Main entry point

mod bridge;
mod cli;

use clap::{Parser, Subcommand};
use localhost_agent::{Agent, AgentEvent};
use localhost_core::{ToolRegistry, Workspace};
use localhost_foundation::{ConfigLoader, LocalhostConfig};
use localhost_provider::OllamaEngine;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// serve 모드 기본 로그 파일 이름
const LOG_FILE_NAME: &str = "localhost_agent.log";

/// Localhost - a local-model developer agent with a sandboxed filesystem
#[derive(Parser, Debug)]
#[command(name = "localhost")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Active project directory (write access is limited to it)
    #[arg(short, long)]
    project: Option<PathBuf>,

    /// Model to use
    #[arg(long)]
    model: Option<String>,

    /// Base URL of the local inference server
    #[arg(long)]
    base_url: Option<String>,

    /// Maximum reasoning steps per query
    #[arg(long)]
    max_steps: Option<usize>,

    /// Log file (serve mode only; defaults to the temp directory)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Speak line-delimited JSON on stdin/stdout for a host UI
    Serve,
    /// Run a single query and print the answer
    Ask {
        /// The query text
        #[arg(required = true)]
        query: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let serve = matches!(args.command, Some(Command::Serve));

    init_logging(&args, serve)?;

    let config = load_config(&args)?;
    tracing::info!(
        model = %config.provider.model,
        base_url = %config.provider.base_url,
        max_steps = config.agent.max_steps,
        "Configuration loaded"
    );

    match args.command {
        Some(Command::Serve) => {
            let bridge = bridge::Bridge::new(build_agent(&config, None)?);
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            bridge::serve(&bridge, stdin, tokio::io::stdout()).await?;
        }
        Some(Command::Ask { query }) => {
            cli::run_once(&config, &query.join(" ")).await?;
        }
        None => {
            cli::run_repl(&config).await?;
        }
    }

    Ok(())
}

/// Initialize logging
///
/// serve 모드에서 stdout은 프로토콜 전용이므로 로그는 파일로 보냅니다.
fn init_logging(args: &Args, serve: bool) -> anyhow::Result<()> {
    let log_level = if args.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    if serve {
        let path = args
            .log_file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(LOG_FILE_NAME));
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;

        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false),
            )
            .init();
        tracing::info!("Logging to {}", path.display());
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    Ok(())
}

/// 설정 파일 → 환경 변수 → CLI 플래그 순으로 덮어씀
fn load_config(args: &Args) -> anyhow::Result<LocalhostConfig> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let mut config = ConfigLoader::new(&cwd).load_all()?.apply_env();

    if let Some(project) = &args.project {
        config.sandbox.default_project = Some(project.display().to_string());
    }
    if let Some(model) = &args.model {
        config.provider.model = model.clone();
    }
    if let Some(base_url) = &args.base_url {
        config.provider.base_url = base_url.clone();
    }
    if let Some(max_steps) = args.max_steps {
        config.agent.max_steps = max_steps;
    }

    Ok(config)
}

/// Workspace, 도구, 추론 엔진을 묶어 Agent 생성
pub(crate) fn build_agent(
    config: &LocalhostConfig,
    events: Option<mpsc::Sender<AgentEvent>>,
) -> anyhow::Result<Agent> {
    let workspace = Arc::new(Workspace::from_config(config));
    let registry = Arc::new(ToolRegistry::with_builtins(Arc::clone(&workspace)));
    let engine = Arc::new(OllamaEngine::from_settings(&config.provider, &config.agent)?);

    tracing::info!(
        tools = registry.len(),
        project = ?workspace.project_root(),
        "Agent ready"
    );

    let agent = Agent::new(engine, registry, workspace).with_max_steps(config.agent.max_steps);
    Ok(match events {
        Some(tx) => agent.with_events(tx),
        None => agent,
    })
}

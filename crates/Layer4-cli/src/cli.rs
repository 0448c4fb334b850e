//! Terminal modes
//!
//! - `run_once`: 단일 쿼리 실행 후 종료
//! - `run_repl`: 한 줄씩 입력받아 bridge와 같은 경로로 처리
//!
//! 진행 상황(도구 호출, observation)은 stderr로, 답변은 stdout으로 출력합니다.

use crate::bridge::{Bridge, HostResponse};
use localhost_agent::AgentEvent;
use localhost_foundation::LocalhostConfig;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const PROMPT: &str = "localhost> ";

/// Run a single query in non-interactive mode
pub async fn run_once(config: &LocalhostConfig, query: &str) -> anyhow::Result<()> {
    let (tx, rx) = mpsc::channel(100);
    let bridge = Bridge::new(crate::build_agent(config, Some(tx))?);
    let event_handle = spawn_event_printer(rx);

    let response = bridge.query(query).await;
    let pending = bridge.workspace().staging().len();

    // sender를 닫아야 이벤트 출력 태스크가 끝남
    drop(bridge);
    let _ = event_handle.await;

    print_response(&response);
    if pending > 0 {
        eprintln!(
            "\n⚠️  {} draft(s) were not applied. Run `localhost` interactively and type /approve to write them.",
            pending
        );
    }

    match response {
        HostResponse::Success { .. } => Ok(()),
        HostResponse::Error { message } => Err(anyhow::anyhow!(message)),
    }
}

/// Interactive line mode
pub async fn run_repl(config: &LocalhostConfig) -> anyhow::Result<()> {
    let (tx, rx) = mpsc::channel(100);
    let bridge = Bridge::new(crate::build_agent(config, Some(tx))?);
    let event_handle = spawn_event_printer(rx);

    println!("Localhost - model {} at {}", config.provider.model, config.provider.base_url);
    match bridge.workspace().project_root() {
        Some(root) => println!("Active project: {}", root.display()),
        None => println!("No active project (read-only). Use /project <path> to enable drafts."),
    }
    println!("Type /help for commands, exit to quit.\n");

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        stdout.write_all(PROMPT.as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "exit" | "quit") {
            break;
        }

        let response = bridge.query(line).await;
        // 이벤트가 먼저 출력되도록 양보
        tokio::task::yield_now().await;
        print_response(&response);
        println!();
    }

    let pending = bridge.workspace().staging().len();
    if pending > 0 {
        eprintln!("⚠️  {} pending draft(s) discarded.", pending);
    }

    drop(bridge);
    let _ = event_handle.await;
    Ok(())
}

fn print_response(response: &HostResponse) {
    match response {
        HostResponse::Success { response } => println!("{}", response),
        HostResponse::Error { message } => eprintln!("Error: {}", message),
    }
}

fn spawn_event_printer(mut rx: mpsc::Receiver<AgentEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                AgentEvent::Thinking { step } if step > 0 => {
                    eprintln!("  … thinking (step {})", step + 1);
                }
                AgentEvent::Action { call, .. } => {
                    eprintln!("  → {}", truncate(&call, 100));
                }
                AgentEvent::Observation { text, .. } => {
                    eprintln!("  ← {}", truncate(&text, 100));
                }
                AgentEvent::Stopped { steps } => {
                    eprintln!("  ✗ stopped after {} steps", steps);
                }
                _ => {}
            }
        }
    })
}

/// Truncate a string for display
fn truncate(s: &str, max_chars: usize) -> String {
    let s = s.replace('\n', " ");
    if s.chars().count() <= max_chars {
        s
    } else {
        let head: String = s.chars().take(max_chars).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a\nb", 10), "a b");
        assert_eq!(truncate("가나다라마", 3), "가나다...");
    }
}

//! Conversation history for a single reasoning run
//!
//! 쿼리마다 새로 만들어지고, 실행이 끝나면 버려집니다 (턴 간 기억 없음).
//! 실행 중에는 추가만 가능합니다.

use localhost_foundation::{Message, MessageRole};

/// Observation 접두사
pub const OBSERVATION_PREFIX: &str = "Observation: ";

/// 역할이 태그된 메시지의 append-only 목록
#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    messages: Vec<Message>,
}

impl ConversationHistory {
    /// system prompt + 사용자 쿼리로 시작
    pub fn new(system_prompt: impl Into<String>, user_query: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system_prompt), Message::user(user_query)],
        }
    }

    /// Add an assistant completion
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    /// Add a tool observation
    ///
    /// 모델에게는 user 역할로 전달됩니다.
    pub fn push_observation(&mut self, observation: impl AsRef<str>) {
        self.messages.push(Message::user(format!(
            "{}{}",
            OBSERVATION_PREFIX,
            observation.as_ref()
        )));
    }

    /// Get all messages
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Get the last assistant message
    pub fn last_assistant(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::Assistant)
    }

    /// Estimate token count (rough approximation)
    pub fn estimate_tokens(&self) -> usize {
        self.messages.iter().map(|m| m.content.len() / 4).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_shape() {
        let mut history = ConversationHistory::new("system", "find my config");
        history.push_assistant("Action: find_files: \"*config*\"");
        history.push_observation("No files matching '*config*' found in /tmp");

        let roles: Vec<MessageRole> = history.messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                MessageRole::System,
                MessageRole::User,
                MessageRole::Assistant,
                MessageRole::User
            ]
        );
        assert!(history.messages()[3]
            .content
            .starts_with("Observation: No files matching"));
        assert_eq!(
            history.last_assistant().map(|m| m.content.as_str()),
            Some("Action: find_files: \"*config*\"")
        );
    }
}

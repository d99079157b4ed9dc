//! Mock LLM client for testing.
//!
//! Provides deterministic responses based on input patterns.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{Result, SqlChatError};
use crate::llm::prompt::SQL_REFUSAL;
use crate::llm::types::{Message, Role};
use crate::llm::LlmClient;

/// Mock LLM client that returns canned responses based on input patterns.
///
/// Resolution order: failure mode, scripted queue, custom patterns, then the
/// built-in behaviour. The built-in behaviour recognises the answer stage by
/// its `SQL Response:` line and summarises the rows; at the SQL stage it only
/// knows about artists and refuses everything else.
#[derive(Debug, Clone, Default)]
pub struct MockLlmClient {
    /// Custom response mappings (pattern -> response).
    custom_responses: Vec<(String, String)>,
    /// Responses returned in order before any pattern is consulted.
    scripted: Arc<Mutex<VecDeque<String>>>,
    /// Number of completion calls made.
    calls: Arc<AtomicUsize>,
    /// Messages of every completion call, oldest first.
    requests: Arc<Mutex<Vec<Vec<Message>>>>,
    /// When set, every call fails with this message.
    failure: Option<String>,
}

impl MockLlmClient {
    /// Creates a new mock client with default responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock whose every call fails with an LLM error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Adds a custom response mapping.
    ///
    /// When the input contains `pattern`, the mock will return `response`.
    pub fn with_response(
        mut self,
        pattern: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        self.custom_responses
            .push((pattern.into(), response.into()));
        self
    }

    /// Queues responses returned one per call, in order.
    pub fn with_script<I, S>(self, responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Ok(mut scripted) = self.scripted.lock() {
            scripted.extend(responses.into_iter().map(Into::into));
        }
        self
    }

    /// Returns a shared counter of completion calls.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    /// Returns a shared log of the messages sent with each call.
    pub fn request_log(&self) -> Arc<Mutex<Vec<Vec<Message>>>> {
        Arc::clone(&self.requests)
    }

    /// Returns the number of completion calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Generates a mock response based on the input.
    fn mock_response(&self, input: &str) -> String {
        let input_lower = input.to_lowercase();

        // Check custom responses first
        for (pattern, response) in &self.custom_responses {
            if input_lower.contains(&pattern.to_lowercase()) {
                return response.clone();
            }
        }

        if let Some((_, sql_response)) = input.split_once("SQL Response:") {
            return summarize(sql_response.trim());
        }

        let question = input
            .strip_prefix("Question:")
            .and_then(|rest| rest.split("SQL Query:").next())
            .unwrap_or(input)
            .trim()
            .to_lowercase();

        if question.contains("artist") {
            if question.contains("how many") || question.contains("count") {
                return "SELECT COUNT(*) AS artist_count FROM Artist;".to_string();
            }
            let limit = question
                .split(|c: char| !c.is_ascii_digit())
                .find(|s| !s.is_empty())
                .unwrap_or("10");
            return format!("SELECT Name FROM Artist LIMIT {limit};");
        }

        SQL_REFUSAL.to_string()
    }

    /// Extracts the last user message content from a message list.
    fn extract_user_input(messages: &[Message]) -> String {
        messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .unwrap_or_default()
    }
}

/// Builds a one-line answer from a serialized result set.
fn summarize(sql_response: &str) -> String {
    let values: Vec<&str> = sql_response
        .lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty() && *line != "(no rows)")
        .collect();

    if values.is_empty() {
        "I could not find any matching rows.".to_string()
    } else {
        format!("Here are the results: {}.", values.join(", "))
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(messages.to_vec());
        }

        if let Some(message) = &self.failure {
            return Err(SqlChatError::llm(message.clone()));
        }

        let next = self
            .scripted
            .lock()
            .ok()
            .and_then(|mut scripted| scripted.pop_front());
        if let Some(response) = next {
            return Ok(response);
        }

        let input = Self::extract_user_input(messages);
        Ok(self.mock_response(&input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_returns_artist_query() {
        let client = MockLlmClient::new();
        let messages = vec![Message::user("Question: Name 3 artists\nSQL Query:")];

        let response = client.complete(&messages).await.unwrap();

        assert_eq!(response, "SELECT Name FROM Artist LIMIT 3;");
    }

    #[tokio::test]
    async fn test_mock_counts_artists() {
        let client = MockLlmClient::new();
        let messages = vec![Message::user("Question: How many artists are there?\nSQL Query:")];

        let response = client.complete(&messages).await.unwrap();

        assert!(response.contains("COUNT(*)"));
    }

    #[tokio::test]
    async fn test_mock_refuses_unrelated_question() {
        let client = MockLlmClient::new();
        let messages = vec![Message::user("Question: What is the meaning of life?\nSQL Query:")];

        let response = client.complete(&messages).await.unwrap();

        assert_eq!(response, SQL_REFUSAL);
    }

    #[tokio::test]
    async fn test_mock_summarizes_answer_stage() {
        let client = MockLlmClient::new();
        let messages = vec![Message::user(
            "SQL Query: <SQL>SELECT Name FROM Artist LIMIT 2;</SQL>\nUser question: Name 2 artists\nSQL Response: Name\nAC/DC\nAccept",
        )];

        let response = client.complete(&messages).await.unwrap();

        assert_eq!(response, "Here are the results: AC/DC, Accept.");
    }

    #[tokio::test]
    async fn test_mock_custom_response() {
        let client = MockLlmClient::new().with_response("custom query", "SELECT custom FROM t;");

        let messages = vec![Message::user("Question: Run the CUSTOM query\nSQL Query:")];
        let response = client.complete(&messages).await.unwrap();

        assert_eq!(response, "SELECT custom FROM t;");
    }

    #[tokio::test]
    async fn test_mock_script_then_patterns() {
        let client = MockLlmClient::new().with_script(["first", "second"]);
        let messages = vec![Message::user("Question: Name 5 artists\nSQL Query:")];

        assert_eq!(client.complete(&messages).await.unwrap(), "first");
        assert_eq!(client.complete(&messages).await.unwrap(), "second");
        assert_eq!(
            client.complete(&messages).await.unwrap(),
            "SELECT Name FROM Artist LIMIT 5;"
        );
        assert_eq!(client.call_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_records_requests() {
        let client = MockLlmClient::new();
        let log = client.request_log();

        client.complete(&[Message::user("first")]).await.unwrap();
        client.complete(&[Message::user("second")]).await.unwrap();

        let requests = log.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1], vec![Message::user("second")]);
    }

    #[tokio::test]
    async fn test_mock_failure_counts_calls() {
        let client = MockLlmClient::failing("boom");
        let counter = client.call_counter();

        let err = client.complete(&[Message::user("hi")]).await.unwrap_err();

        assert!(matches!(err, SqlChatError::Llm(_)));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}

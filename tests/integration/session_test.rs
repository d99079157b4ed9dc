//! The question pipeline against a real SQLite database.

use super::common::{chinook_db, connected_session};
use pretty_assertions::assert_eq;
use sqlchat::conversation::{TurnRole, GREETING};
use sqlchat::llm::prompt::SQL_REFUSAL;
use sqlchat::llm::MockLlmClient;
use sqlchat::session::{AskOutcome, FALLBACK_REPLY};
use std::sync::atomic::Ordering;

#[tokio::test]
async fn test_name_three_artists() {
    let (_dir, config) = chinook_db().await;
    let mut session = connected_session(config, MockLlmClient::new()).await;

    let outcome = session.ask("Name 3 artists").await.unwrap();

    assert_eq!(
        outcome,
        AskOutcome::Answered("Here are the results: AC/DC, Accept, Aerosmith.".to_string())
    );
    assert_eq!(session.last_sql(), Some("SELECT Name FROM Artist LIMIT 3;"));
}

#[tokio::test]
async fn test_count_artists() {
    let (_dir, config) = chinook_db().await;
    let mut session = connected_session(config, MockLlmClient::new()).await;

    let outcome = session.ask("How many artists are there?").await.unwrap();

    assert_eq!(outcome.reply(), "Here are the results: 4.");
}

#[tokio::test]
async fn test_bad_sql_gives_single_fallback_turn() {
    let (_dir, config) = chinook_db().await;
    let llm = MockLlmClient::new().with_script(["SELECT Name FROM Artists LIMIT 3;"]);
    let calls = llm.call_counter();
    let mut session = connected_session(config, llm).await;

    let outcome = session.ask("Name 3 artists").await.unwrap();

    assert!(matches!(outcome, AskOutcome::ExecutionFailed(ref reason) if reason.contains("Artists")));
    // The answer chain never runs after a failed execution
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let turns = session.conversation().as_context();
    assert_eq!(turns.len(), 3);
    assert_eq!(turns[2].role, TurnRole::Ai);
    assert_eq!(turns[2].content, FALLBACK_REPLY);
}

#[tokio::test]
async fn test_refusal_is_out_of_scope() {
    let (_dir, config) = chinook_db().await;
    let llm = MockLlmClient::new().with_response("weather", SQL_REFUSAL);
    let calls = llm.call_counter();
    let mut session = connected_session(config, llm).await;

    let outcome = session.ask("What is the weather today?").await.unwrap();

    assert_eq!(outcome, AskOutcome::OutOfScope);
    assert_eq!(outcome.reply(), FALLBACK_REPLY);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(session.last_sql(), None);
}

#[tokio::test]
async fn test_llm_failure_is_generation_failed() {
    let (_dir, config) = chinook_db().await;
    let mut session = connected_session(config, MockLlmClient::failing("rate limited")).await;

    let outcome = session.ask("Name 3 artists").await.unwrap();

    assert!(matches!(outcome, AskOutcome::GenerationFailed(ref reason) if reason.contains("rate limited")));
    assert_eq!(session.conversation().last().unwrap().content, FALLBACK_REPLY);
}

#[tokio::test]
async fn test_blank_input_makes_no_calls() {
    let (_dir, config) = chinook_db().await;
    let llm = MockLlmClient::new();
    let calls = llm.call_counter();
    let mut session = connected_session(config, llm).await;

    assert_eq!(session.ask("").await, None);
    assert_eq!(session.ask("   \t").await, None);

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(session.conversation().len(), 1);
}

#[tokio::test]
async fn test_turns_alternate_in_order() {
    let (_dir, config) = chinook_db().await;
    let mut session = connected_session(config, MockLlmClient::new()).await;

    let questions = ["Name 2 artists", "What is the weather today?", "Name 1 artists"];
    for question in questions {
        session.ask(question).await;
    }

    let transcript: Vec<String> = session
        .conversation()
        .as_context()
        .iter()
        .map(ToString::to_string)
        .collect();

    assert_eq!(
        transcript,
        vec![
            format!("AI: {GREETING}"),
            "Human: Name 2 artists".to_string(),
            "AI: Here are the results: AC/DC, Accept.".to_string(),
            "Human: What is the weather today?".to_string(),
            format!("AI: {FALLBACK_REPLY}"),
            "Human: Name 1 artists".to_string(),
            "AI: Here are the results: AC/DC.".to_string(),
        ]
    );
}

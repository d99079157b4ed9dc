//! Connecting, failing to connect and reconnecting.

use super::common::{chinook_db, connected_session, create_sqlite_db, session_with, GENRE_SQL};
use sqlchat::commands::{execute, Command, CommandOutput, ConnectArgs};
use sqlchat::config::ConnectionConfig;
use sqlchat::llm::MockLlmClient;
use sqlchat::session::AskOutcome;

#[tokio::test]
async fn test_connect_opens_database() {
    let (_dir, config) = chinook_db().await;
    let session = connected_session(config.clone(), MockLlmClient::new()).await;

    assert!(session.is_connected());
    assert_eq!(session.connection_config(), Some(&config));
}

#[tokio::test]
async fn test_failed_connect_keeps_previous_connection() {
    let (dir, config) = chinook_db().await;
    let mut session = connected_session(config.clone(), MockLlmClient::new()).await;

    let missing = ConnectionConfig::sqlite(dir.path().join("missing.db").to_string_lossy());
    let result = session.connect_to(missing).await;

    assert!(result.is_err());
    assert!(session.is_connected());
    assert_eq!(session.connection_config(), Some(&config));
}

#[tokio::test]
async fn test_connect_command_reports_result() {
    let (dir, config) = chinook_db().await;
    let mut session = session_with(MockLlmClient::new());

    let ok = execute(
        &mut session,
        Command::Connect(ConnectArgs {
            url: Some(format!("sqlite://{}", config.database)),
            fields: Vec::new(),
        }),
    )
    .await;
    assert!(matches!(ok, CommandOutput::Info(ref msg) if msg.starts_with("Connected to database!")));

    let missing = dir.path().join("missing.db");
    let failed = execute(
        &mut session,
        Command::Connect(ConnectArgs {
            url: None,
            fields: vec![(
                "database".to_string(),
                missing.to_string_lossy().into_owned(),
            )],
        }),
    )
    .await;
    assert!(
        matches!(failed, CommandOutput::Error(ref msg) if msg.starts_with("Failed to connect to database:"))
    );
    assert!(session.is_connected());
}

#[tokio::test]
async fn test_reconnect_keeps_conversation_and_switches_schema() {
    let (dir, config) = chinook_db().await;
    let mut session = connected_session(config, MockLlmClient::new()).await;

    session.ask("Name 3 artists").await;
    assert_eq!(session.conversation().len(), 3);

    let genre_path = dir.path().join("genre.db");
    create_sqlite_db(&genre_path, GENRE_SQL).await;
    session
        .connect_to(ConnectionConfig::sqlite(genre_path.to_string_lossy()))
        .await
        .unwrap();

    assert_eq!(session.conversation().len(), 3);

    let schema = session.schema_text().await.unwrap();
    assert!(schema.contains("Table: Genre"));
    assert!(!schema.contains("Table: Artist"));

    // Artist no longer exists, so the mock's SQL fails on the new database
    let outcome = session.ask("Name 2 artists").await.unwrap();
    assert!(matches!(outcome, AskOutcome::ExecutionFailed(_)));
    assert_eq!(session.conversation().len(), 5);
}

#[tokio::test]
async fn test_ask_before_connect_is_not_connected() {
    let llm = MockLlmClient::new();
    let calls = llm.call_counter();
    let mut session = session_with(llm);

    let outcome = session.ask("Name 3 artists").await.unwrap();

    assert_eq!(outcome, AskOutcome::NotConnected);
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

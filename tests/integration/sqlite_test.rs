//! SQLite client behaviour through the public connection builder.

use super::common::chinook_db;
use sqlchat::conversation::Conversation;
use sqlchat::db::{self, Value};
use sqlchat::error::SqlChatError;
use sqlchat::llm::{generate_sql, MockLlmClient, SqlGeneration};

#[tokio::test]
async fn test_schema_lists_tables_and_foreign_keys() {
    let (_dir, config) = chinook_db().await;
    let client = db::connect(&config, 2).await.unwrap();

    let schema = client.introspect_schema().await.unwrap();
    let text = schema.format_for_llm();

    assert!(text.starts_with("Database Schema:"));
    assert!(text.contains("Table: Album"));
    assert!(text.contains("Table: Artist"));
    assert!(text.contains("  - ArtistId: INTEGER (PK, NOT NULL)"));
    assert!(text.contains("FK -> Artist.ArtistId"));
    assert!(text.contains("Foreign Keys:"));
    assert!(text.contains("AC/DC"));
    assert!(!text.contains("Alanis Morissette"));
}

#[tokio::test]
async fn test_execute_query_returns_typed_rows() {
    let (_dir, config) = chinook_db().await;
    let client = db::connect(&config, 0).await.unwrap();

    let result = client
        .execute_query("SELECT ArtistId, Name FROM Artist ORDER BY ArtistId LIMIT 2")
        .await
        .unwrap();

    assert_eq!(result.row_count(), 2);
    assert_eq!(result.rows[0][0], Value::Int(1));
    assert_eq!(result.rows[1][1], Value::String("Accept".to_string()));
    assert_eq!(result.format_for_llm(), "ArtistId | Name\n1 | AC/DC\n2 | Accept");
}

#[tokio::test]
async fn test_empty_result_keeps_header() {
    let (_dir, config) = chinook_db().await;
    let client = db::connect(&config, 0).await.unwrap();

    let result = client
        .execute_query("SELECT Name FROM Artist WHERE Name = 'Nobody'")
        .await
        .unwrap();

    assert_eq!(result.format_for_llm(), "Name\n(no rows)");
}

#[tokio::test]
async fn test_update_reports_affected_rows() {
    let (_dir, config) = chinook_db().await;
    let client = db::connect(&config, 0).await.unwrap();

    let result = client
        .execute_query("UPDATE Artist SET Name = UPPER(Name) WHERE ArtistId <= 2")
        .await
        .unwrap();

    assert_eq!(result.rows_affected, Some(2));
    assert_eq!(result.format_for_llm(), "(2 rows affected)");

    let names = client
        .execute_query("SELECT Name FROM Artist WHERE ArtistId = 2")
        .await
        .unwrap();
    assert_eq!(names.rows[0][0], Value::String("ACCEPT".to_string()));
}

#[tokio::test]
async fn test_invalid_sql_is_query_error() {
    let (_dir, config) = chinook_db().await;
    let client = db::connect(&config, 0).await.unwrap();

    let err = client
        .execute_query("SELECT Name FROM Artists")
        .await
        .unwrap_err();

    assert!(matches!(err, SqlChatError::Query(_)));
}

#[tokio::test]
async fn test_generated_sql_uses_schema_tables() {
    let (_dir, config) = chinook_db().await;
    let client = db::connect(&config, 3).await.unwrap();
    let schema = client.introspect_schema().await.unwrap().format_for_llm();
    let conversation = Conversation::new();

    let generation = generate_sql(
        &MockLlmClient::new(),
        "Name 3 artists",
        conversation.as_context(),
        &schema,
    )
    .await
    .unwrap();

    let SqlGeneration::Sql(sql) = generation else {
        panic!("expected SQL, got {generation:?}");
    };
    assert!(sql.to_uppercase().starts_with("SELECT"));
    assert!(sql.contains("FROM Artist"));
    assert!(!sql.contains("Album"));
}

#[test]
fn test_connect_outside_runtime_with_block_on() {
    let result = tokio_test::block_on(async {
        let (_dir, config) = chinook_db().await;
        let client = db::connect(&config, 0).await?;
        let count = client.execute_query("SELECT COUNT(*) FROM Album").await?;
        client.close().await?;
        Ok::<_, SqlChatError>(count)
    })
    .unwrap();

    assert_eq!(result.rows[0][0], Value::Int(3));
}

//! Mock database clients for testing.
//!
//! Provides in-memory database implementations for headless runs and tests.

use super::{Column, ColumnInfo, DatabaseClient, QueryResult, Schema, Table, Value};
use crate::error::{Result, SqlChatError};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const CHINOOK_ARTISTS: [&str; 3] = ["AC/DC", "Accept", "Aerosmith"];

/// A mock database client that returns predefined results.
///
/// Results are matched by a case-insensitive substring of the SQL; the first
/// registered match wins. Unmatched `SELECT`s echo the statement back.
#[derive(Debug, Clone, Default)]
pub struct MockDatabaseClient {
    schema: Schema,
    results: Vec<(String, QueryResult)>,
    executed: Arc<Mutex<Vec<String>>>,
}

impl MockDatabaseClient {
    /// Creates a new mock database client with an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new mock database client with the given schema.
    pub fn with_schema(schema: Schema) -> Self {
        Self {
            schema,
            ..Self::default()
        }
    }

    /// A small Chinook-like database with an `Artist` table.
    pub fn chinook() -> Self {
        let names = QueryResult::with_data(
            vec![ColumnInfo::new("Name", "NVARCHAR")],
            CHINOOK_ARTISTS
                .iter()
                .map(|name| vec![Value::from(*name)])
                .collect(),
        );

        let count = QueryResult::with_data(
            vec![ColumnInfo::new("artist_count", "BIGINT")],
            vec![vec![Value::Int(CHINOOK_ARTISTS.len() as i64)]],
        );

        Self::with_schema(Self::chinook_schema())
            .with_result("COUNT(*)", count)
            .with_result("FROM ARTIST", names)
    }

    /// The schema served by [`Self::chinook`].
    pub fn chinook_schema() -> Schema {
        let artist = Table {
            sample_rows: CHINOOK_ARTISTS
                .iter()
                .enumerate()
                .map(|(i, name)| vec![Value::Int(i as i64 + 1), Value::from(*name)])
                .collect(),
            ..Table::new("Artist")
                .with_column(Column::new("ArtistId", "INTEGER").nullable(false))
                .with_column(Column::new("Name", "NVARCHAR(120)"))
                .with_primary_key(&["ArtistId"])
        };

        Schema {
            tables: vec![artist],
            foreign_keys: vec![],
        }
    }

    /// Registers a result for statements containing `pattern`.
    pub fn with_result(mut self, pattern: impl Into<String>, result: QueryResult) -> Self {
        self.results.push((pattern.into().to_uppercase(), result));
        self
    }

    /// Returns a handle to the statements executed so far.
    pub fn executed(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.executed)
    }

    fn record(&self, sql: &str) {
        if let Ok(mut executed) = self.executed.lock() {
            executed.push(sql.to_string());
        }
    }
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    async fn introspect_schema(&self) -> Result<Schema> {
        Ok(self.schema.clone())
    }

    async fn execute_query(&self, sql: &str) -> Result<QueryResult> {
        self.record(sql);
        let sql_upper = sql.to_uppercase();

        if let Some((_, result)) = self
            .results
            .iter()
            .find(|(pattern, _)| sql_upper.contains(pattern.as_str()))
        {
            return Ok(result.clone().with_execution_time(Duration::from_millis(1)));
        }

        if sql_upper.trim_start().starts_with("SELECT") {
            let columns = vec![ColumnInfo::new("result", "TEXT")];
            let rows = vec![vec![Value::String(format!("Mock result for: {sql}"))]];
            Ok(QueryResult::with_data(columns, rows).with_execution_time(Duration::from_millis(1)))
        } else {
            Ok(QueryResult::affected(0).with_execution_time(Duration::from_millis(1)))
        }
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// A database whose schema is readable but on which every statement fails.
#[derive(Debug, Clone)]
pub struct FailingDatabaseClient {
    schema: Schema,
    message: String,
}

impl FailingDatabaseClient {
    /// Creates a failing client that reports `message` for every statement.
    pub fn new(schema: Schema, message: impl Into<String>) -> Self {
        Self {
            schema,
            message: message.into(),
        }
    }
}

#[async_trait]
impl DatabaseClient for FailingDatabaseClient {
    async fn introspect_schema(&self) -> Result<Schema> {
        Ok(self.schema.clone())
    }

    async fn execute_query(&self, _sql: &str) -> Result<QueryResult> {
        Err(SqlChatError::query(self.message.clone()))
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

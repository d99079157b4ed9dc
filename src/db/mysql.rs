//! MySQL database client implementation.
//!
//! Provides the `MySqlClient` struct that implements the `DatabaseClient` trait
//! for MySQL servers using sqlx.

use crate::config::ConnectionConfig;
use crate::db::{
    Column, ColumnInfo, DatabaseClient, ForeignKey, QueryResult, Row, Schema, Table, Value,
};
use crate::error::{Result, SqlChatError};
use async_trait::async_trait;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::{Column as SqlxColumn, Executor, Row as SqlxRow, TypeInfo, ValueRef};
use std::time::Instant;
use tracing::{debug, warn};

/// MySQL database client.
///
/// Holds a single-connection pool; the session never issues concurrent queries.
#[derive(Debug)]
pub struct MySqlClient {
    pool: MySqlPool,
    sample_rows: usize,
}

impl MySqlClient {
    /// Opens a connection for the given configuration.
    ///
    /// There is no retry: a failure is reported immediately as a connection error.
    pub async fn connect(config: &ConnectionConfig, sample_rows: usize) -> Result<Self> {
        let conn_str = config.to_connection_string()?;
        debug!("Connecting to MySQL at {}", config.display_string());

        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .connect(&conn_str)
            .await
            .map_err(|e| map_connection_error(e, config))?;

        debug!("Successfully connected to database");
        Ok(Self { pool, sample_rows })
    }

    /// Creates a client from an existing pool.
    pub fn from_pool(pool: MySqlPool, sample_rows: usize) -> Self {
        Self { pool, sample_rows }
    }
}

#[async_trait]
impl DatabaseClient for MySqlClient {
    async fn introspect_schema(&self) -> Result<Schema> {
        let mut tables = self.fetch_tables().await?;
        let foreign_keys = self.fetch_foreign_keys().await?;

        if self.sample_rows > 0 {
            for table in &mut tables {
                table.sample_rows = self.fetch_sample_rows(&table.name).await;
            }
        }

        Ok(Schema {
            tables,
            foreign_keys,
        })
    }

    async fn execute_query(&self, sql: &str) -> Result<QueryResult> {
        let start = Instant::now();

        // Statements without a result set report the affected row count
        let described = self.describe_columns(sql).await;
        if described.as_ref().is_some_and(Vec::is_empty) {
            let done = sqlx::query(sql)
                .execute(&self.pool)
                .await
                .map_err(|e| SqlChatError::query(format_query_error(e)))?;
            return Ok(QueryResult::affected(done.rows_affected())
                .with_execution_time(start.elapsed()));
        }

        let result = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| SqlChatError::query(format_query_error(e)))?;

        let execution_time = start.elapsed();

        let columns: Vec<ColumnInfo> = match result.first() {
            Some(first_row) => column_info(first_row.columns()),
            None => described.unwrap_or_default(),
        };

        let rows: Vec<Row> = result.iter().map(convert_row).collect();

        Ok(QueryResult::with_data(columns, rows).with_execution_time(execution_time))
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}

impl MySqlClient {
    /// Column metadata of a statement, or `None` if it cannot be prepared.
    async fn describe_columns(&self, sql: &str) -> Option<Vec<ColumnInfo>> {
        match self.pool.describe(sql).await {
            Ok(described) => Some(column_info(described.columns())),
            Err(e) => {
                debug!("Could not describe statement: {e}");
                None
            }
        }
    }

    /// Fetches all base tables of the current database.
    async fn fetch_tables(&self) -> Result<Vec<Table>> {
        let table_names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT CAST(TABLE_NAME AS CHAR)
            FROM information_schema.TABLES
            WHERE TABLE_SCHEMA = DATABASE() AND TABLE_TYPE = 'BASE TABLE'
            ORDER BY TABLE_NAME
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SqlChatError::query(format!("Failed to fetch tables: {e}")))?;

        let mut tables = Vec::with_capacity(table_names.len());

        for table_name in table_names {
            let (columns, primary_key) = self.fetch_columns(&table_name).await?;
            tables.push(Table {
                name: table_name,
                columns,
                primary_key,
                sample_rows: Vec::new(),
            });
        }

        Ok(tables)
    }

    /// Fetches columns and primary key columns for a specific table.
    async fn fetch_columns(&self, table_name: &str) -> Result<(Vec<Column>, Vec<String>)> {
        let rows: Vec<(String, String, String, Option<String>, String)> = sqlx::query_as(
            r#"
            SELECT
                CAST(COLUMN_NAME AS CHAR),
                CAST(COLUMN_TYPE AS CHAR),
                CAST(IS_NULLABLE AS CHAR),
                CAST(COLUMN_DEFAULT AS CHAR),
                CAST(COLUMN_KEY AS CHAR)
            FROM information_schema.COLUMNS
            WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?
            ORDER BY ORDINAL_POSITION
            "#,
        )
        .bind(table_name)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            SqlChatError::query(format!("Failed to fetch columns for {table_name}: {e}"))
        })?;

        let primary_key = rows
            .iter()
            .filter(|(_, _, _, _, key)| key == "PRI")
            .map(|(name, ..)| name.clone())
            .collect();

        let columns = rows
            .into_iter()
            .map(|(name, data_type, is_nullable, default, _)| Column {
                name,
                data_type,
                is_nullable: is_nullable == "YES",
                default,
            })
            .collect();

        Ok((columns, primary_key))
    }

    /// Fetches all foreign key relationships of the current database.
    async fn fetch_foreign_keys(&self) -> Result<Vec<ForeignKey>> {
        let rows: Vec<(String, String, String, String, String)> = sqlx::query_as(
            r#"
            SELECT
                CAST(CONSTRAINT_NAME AS CHAR),
                CAST(TABLE_NAME AS CHAR),
                CAST(COLUMN_NAME AS CHAR),
                CAST(REFERENCED_TABLE_NAME AS CHAR),
                CAST(REFERENCED_COLUMN_NAME AS CHAR)
            FROM information_schema.KEY_COLUMN_USAGE
            WHERE TABLE_SCHEMA = DATABASE() AND REFERENCED_TABLE_NAME IS NOT NULL
            ORDER BY TABLE_NAME, CONSTRAINT_NAME, ORDINAL_POSITION
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SqlChatError::query(format!("Failed to fetch foreign keys: {e}")))?;

        // Multi-column keys arrive as consecutive rows of the same constraint
        let mut foreign_keys: Vec<(String, ForeignKey)> = Vec::new();
        for (constraint, from_table, from_column, to_table, to_column) in rows {
            match foreign_keys.last_mut() {
                Some((name, fk)) if *name == constraint && fk.from_table == from_table => {
                    fk.from_columns.push(from_column);
                    fk.to_columns.push(to_column);
                }
                _ => foreign_keys.push((
                    constraint,
                    ForeignKey::new(from_table, vec![from_column], to_table, vec![to_column]),
                )),
            }
        }

        Ok(foreign_keys.into_iter().map(|(_, fk)| fk).collect())
    }

    /// Fetches a few rows of a table. Failures only cost the samples.
    async fn fetch_sample_rows(&self, table_name: &str) -> Vec<Row> {
        let sql = format!(
            "SELECT * FROM {} LIMIT {}",
            quote_identifier(table_name),
            self.sample_rows
        );
        match sqlx::query(&sql).fetch_all(&self.pool).await {
            Ok(rows) => rows.iter().map(convert_row).collect(),
            Err(e) => {
                warn!("Failed to fetch sample rows for {table_name}: {e}");
                Vec::new()
            }
        }
    }
}

fn column_info(columns: &[sqlx::mysql::MySqlColumn]) -> Vec<ColumnInfo> {
    columns
        .iter()
        .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
        .collect()
}

/// Quotes a MySQL identifier with backticks.
fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Converts a sqlx MySqlRow to our Row type.
fn convert_row(row: &MySqlRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| convert_value(row, i, col.type_info().name()))
        .collect()
}

/// Converts a single column value from a MySqlRow to our Value type.
///
/// Decoding is unchecked: MySQL reports result types per statement, and values
/// such as DECIMAL are only reachable as their text form.
fn convert_value(row: &MySqlRow, index: usize, type_name: &str) -> Value {
    match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Ok(_) => {}
        Err(e) => {
            warn!("Failed to read column {index}: {e}");
            return Value::Null;
        }
    }

    let type_name = type_name.to_uppercase();
    let decoded = match type_name.as_str() {
        "BOOLEAN" => row.try_get_unchecked::<bool, _>(index).map(Value::Bool),

        t if t.ends_with("UNSIGNED") => row.try_get_unchecked::<u64, _>(index).map(|v| {
            i64::try_from(v)
                .map(Value::Int)
                .unwrap_or_else(|_| Value::String(v.to_string()))
        }),

        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => {
            row.try_get_unchecked::<i64, _>(index).map(Value::Int)
        }

        "FLOAT" => row
            .try_get_unchecked::<f32, _>(index)
            .map(|v| Value::Float(v as f64)),

        "DOUBLE" => row.try_get_unchecked::<f64, _>(index).map(Value::Float),

        "DATE" => row
            .try_get_unchecked::<chrono::NaiveDate, _>(index)
            .map(|v| Value::String(v.to_string())),

        "DATETIME" | "TIMESTAMP" => row
            .try_get_unchecked::<chrono::NaiveDateTime, _>(index)
            .map(|v| Value::String(v.to_string())),

        "TIME" => row
            .try_get_unchecked::<chrono::NaiveTime, _>(index)
            .map(|v| Value::String(v.to_string())),

        "BINARY" | "VARBINARY" | "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BIT" => row
            .try_get_unchecked::<Vec<u8>, _>(index)
            .map(|bytes| match String::from_utf8(bytes) {
                Ok(text) => Value::String(text),
                Err(e) => Value::Bytes(e.into_bytes()),
            }),

        // Text, DECIMAL, JSON, ENUM, SET
        _ => row.try_get_unchecked::<String, _>(index).map(Value::String),
    };

    decoded.unwrap_or_else(|e| {
        warn!("Failed to decode {type_name} value in column {index}: {e}");
        Value::Null
    })
}

/// Maps sqlx connection errors to user-friendly messages.
fn map_connection_error(error: sqlx::Error, config: &ConnectionConfig) -> SqlChatError {
    let host = &config.host;
    let port = &config.port;
    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") || error_str.contains("could not connect") {
        SqlChatError::connection(format!(
            "Cannot connect to {host}:{port}. Check that the server is running."
        ))
    } else if error_str.contains("access denied") {
        SqlChatError::connection(format!(
            "Authentication failed for user '{}'. Check your credentials.",
            config.user
        ))
    } else if error_str.contains("unknown database") {
        SqlChatError::connection(format!("Database '{}' does not exist.", config.database))
    } else if error_str.contains("failed to lookup address")
        || error_str.contains("name or service not known")
    {
        SqlChatError::connection(format!("Cannot resolve host '{host}'."))
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        SqlChatError::connection(format!(
            "Connection to {host}:{port} timed out. The server may be overloaded or unreachable."
        ))
    } else {
        SqlChatError::connection(error.to_string())
    }
}

/// Formats a query error, keeping the server's error code when available.
fn format_query_error(error: sqlx::Error) -> String {
    match error.as_database_error() {
        Some(db_error) => match db_error.code() {
            Some(code) => format!("ERROR {}: {}", code, db_error.message()),
            None => format!("ERROR: {}", db_error.message()),
        },
        None => error.to_string(),
    }
}

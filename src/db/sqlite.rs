//! SQLite database client implementation.
//!
//! Opens an existing database file; a missing file is a connection error, not
//! an empty new database.

use crate::config::ConnectionConfig;
use crate::db::{
    Column, ColumnInfo, DatabaseClient, ForeignKey, QueryResult, Row, Schema, Table, Value,
};
use crate::error::{Result, SqlChatError};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column as SqlxColumn, Executor, Row as SqlxRow, TypeInfo, ValueRef};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, warn};

/// SQLite database client.
#[derive(Debug)]
pub struct SqliteClient {
    pool: SqlitePool,
    sample_rows: usize,
}

impl SqliteClient {
    /// Opens the database file named by `config.database`.
    pub async fn connect(config: &ConnectionConfig, sample_rows: usize) -> Result<Self> {
        let path = config.database.as_str();
        if !Path::new(path).is_file() {
            return Err(SqlChatError::connection(format!(
                "SQLite database file '{path}' does not exist."
            )));
        }

        debug!("Opening SQLite database at {path}");

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(false)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| {
                SqlChatError::connection(format!("Cannot open SQLite database '{path}': {e}"))
            })?;

        Ok(Self { pool, sample_rows })
    }

    /// Creates a client from an existing pool.
    pub fn from_pool(pool: SqlitePool, sample_rows: usize) -> Self {
        Self { pool, sample_rows }
    }

    async fn fetch_tables(&self) -> Result<Vec<Table>> {
        let table_names: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
             ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SqlChatError::query(format!("Failed to fetch tables: {e}")))?;

        let mut tables = Vec::with_capacity(table_names.len());
        for name in table_names {
            let (columns, primary_key) = self.fetch_columns(&name).await?;
            tables.push(Table {
                name,
                columns,
                primary_key,
                sample_rows: Vec::new(),
            });
        }

        Ok(tables)
    }

    async fn fetch_columns(&self, table_name: &str) -> Result<(Vec<Column>, Vec<String>)> {
        let rows: Vec<(String, String, i64, Option<String>, i64)> = sqlx::query_as(
            r#"SELECT name, type, "notnull", dflt_value, pk FROM pragma_table_info(?) ORDER BY cid"#,
        )
        .bind(table_name)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            SqlChatError::query(format!("Failed to fetch columns for {table_name}: {e}"))
        })?;

        // pk holds the 1-based position within the primary key
        let mut pk_columns: Vec<(i64, String)> = rows
            .iter()
            .filter(|(.., pk)| *pk > 0)
            .map(|(name, .., pk)| (*pk, name.clone()))
            .collect();
        pk_columns.sort();
        let primary_key = pk_columns.into_iter().map(|(_, name)| name).collect();

        let columns = rows
            .into_iter()
            .map(|(name, data_type, not_null, default, pk)| Column {
                name,
                data_type,
                // INTEGER PRIMARY KEY is a rowid alias and never NULL
                is_nullable: not_null == 0 && pk == 0,
                default,
            })
            .collect();

        Ok((columns, primary_key))
    }

    async fn fetch_foreign_keys(&self, tables: &[Table]) -> Result<Vec<ForeignKey>> {
        let mut foreign_keys = Vec::new();

        for table in tables {
            let rows: Vec<(i64, i64, String, String, Option<String>)> = sqlx::query_as(
                r#"SELECT id, seq, "table", "from", "to" FROM pragma_foreign_key_list(?) ORDER BY id, seq"#,
            )
            .bind(&table.name)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                SqlChatError::query(format!(
                    "Failed to fetch foreign keys for {}: {e}",
                    table.name
                ))
            })?;

            let mut current: Option<(i64, ForeignKey)> = None;
            for (id, seq, to_table, from_column, to_column) in rows {
                // A missing target column means the referenced primary key
                let to_column = to_column.unwrap_or_else(|| {
                    tables
                        .iter()
                        .find(|t| t.name == to_table)
                        .and_then(|t| t.primary_key.get(seq as usize).cloned())
                        .unwrap_or_default()
                });

                match current.as_mut() {
                    Some((current_id, fk)) if *current_id == id => {
                        fk.from_columns.push(from_column);
                        fk.to_columns.push(to_column);
                    }
                    _ => {
                        if let Some((_, fk)) = current.take() {
                            foreign_keys.push(fk);
                        }
                        current = Some((
                            id,
                            ForeignKey::new(
                                table.name.clone(),
                                vec![from_column],
                                to_table,
                                vec![to_column],
                            ),
                        ));
                    }
                }
            }
            if let Some((_, fk)) = current {
                foreign_keys.push(fk);
            }
        }

        Ok(foreign_keys)
    }

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

#[async_trait]
impl DatabaseClient for SqliteClient {
    async fn introspect_schema(&self) -> Result<Schema> {
        let mut tables = self.fetch_tables().await?;
        let foreign_keys = self.fetch_foreign_keys(&tables).await?;

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
        let described = match self.pool.describe(sql).await {
            Ok(described) => Some(column_info(described.columns())),
            Err(e) => {
                debug!("Could not describe statement: {e}");
                None
            }
        };
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

        let columns = match result.first() {
            Some(first_row) => column_info(first_row.columns()),
            None => described.unwrap_or_default(),
        };

        let rows = result.iter().map(convert_row).collect();

        Ok(QueryResult::with_data(columns, rows).with_execution_time(execution_time))
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}

fn column_info(columns: &[sqlx::sqlite::SqliteColumn]) -> Vec<ColumnInfo> {
    columns
        .iter()
        .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
        .collect()
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn convert_row(row: &SqliteRow) -> Row {
    (0..row.columns().len())
        .map(|i| convert_value(row, i))
        .collect()
}

/// Converts a value by its storage class, which in SQLite may differ from
/// the declared column type.
fn convert_value(row: &SqliteRow, index: usize) -> Value {
    let storage_class = match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Ok(raw) => raw.type_info().name().to_uppercase(),
        Err(e) => {
            warn!("Failed to read column {index}: {e}");
            return Value::Null;
        }
    };

    let decoded = match storage_class.as_str() {
        "INTEGER" | "INT" | "BIGINT" | "BOOLEAN" => {
            row.try_get_unchecked::<i64, _>(index).map(Value::Int)
        }
        "REAL" | "FLOAT" | "DOUBLE" | "NUMERIC" => {
            row.try_get_unchecked::<f64, _>(index).map(Value::Float)
        }
        "BLOB" => row.try_get_unchecked::<Vec<u8>, _>(index).map(Value::Bytes),
        _ => row.try_get_unchecked::<String, _>(index).map(Value::String),
    };

    decoded.unwrap_or_else(|e| {
        warn!("Failed to decode {storage_class} value in column {index}: {e}");
        Value::Null
    })
}

fn format_query_error(error: sqlx::Error) -> String {
    match error.as_database_error() {
        Some(db_error) => db_error.message().to_string(),
        None => error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn chinook_client(sample_rows: usize) -> (TempDir, SqliteClient) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chinook.db");

        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();

        for statement in [
            "CREATE TABLE Artist (ArtistId INTEGER PRIMARY KEY, Name NVARCHAR(120))",
            "CREATE TABLE Album (AlbumId INTEGER PRIMARY KEY, Title NVARCHAR(160) NOT NULL, \
             ArtistId INTEGER NOT NULL REFERENCES Artist(ArtistId))",
            "INSERT INTO Artist (ArtistId, Name) VALUES (1, 'AC/DC'), (2, 'Accept'), \
             (3, 'Aerosmith'), (4, 'Alanis Morissette')",
            "INSERT INTO Album (AlbumId, Title, ArtistId) VALUES \
             (1, 'For Those About To Rock We Salute You', 1), (2, 'Balls to the Wall', 2)",
        ] {
            sqlx::query(statement).execute(&pool).await.unwrap();
        }

        (dir, SqliteClient::from_pool(pool, sample_rows))
    }

    #[tokio::test]
    async fn test_connect_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConnectionConfig::sqlite(dir.path().join("missing.db").to_string_lossy());

        let err = SqliteClient::connect(&config, 0).await.unwrap_err();
        assert!(matches!(err, SqlChatError::Connection(_)));
        assert!(err.to_string().contains("does not exist"));
        assert!(!dir.path().join("missing.db").exists());
    }

    #[tokio::test]
    async fn test_introspect_schema() {
        let (_dir, client) = chinook_client(0).await;
        let schema = client.introspect_schema().await.unwrap();

        assert_eq!(schema.table_names(), vec!["Album", "Artist"]);

        let artist = &schema.tables[1];
        assert_eq!(artist.primary_key, vec!["ArtistId"]);
        assert_eq!(artist.columns[1].name, "Name");
        assert_eq!(artist.columns[1].data_type, "NVARCHAR(120)");
        assert!(artist.sample_rows.is_empty());

        assert_eq!(schema.foreign_keys.len(), 1);
        let fk = &schema.foreign_keys[0];
        assert_eq!(fk.from_table, "Album");
        assert_eq!(fk.from_columns, vec!["ArtistId"]);
        assert_eq!(fk.to_table, "Artist");
        assert_eq!(fk.to_columns, vec!["ArtistId"]);
    }

    #[tokio::test]
    async fn test_introspect_schema_with_sample_rows() {
        let (_dir, client) = chinook_client(2).await;
        let schema = client.introspect_schema().await.unwrap();

        let artist = &schema.tables[1];
        assert_eq!(artist.sample_rows.len(), 2);
        assert_eq!(artist.sample_rows[0], vec![Value::Int(1), Value::from("AC/DC")]);

        let text = schema.format_for_llm();
        assert!(text.contains("Table: Artist"));
        assert!(text.contains("1 | AC/DC"));
    }

    #[tokio::test]
    async fn test_execute_query() {
        let (_dir, client) = chinook_client(0).await;
        let result = client
            .execute_query("SELECT Name FROM Artist ORDER BY ArtistId LIMIT 3")
            .await
            .unwrap();

        assert_eq!(result.columns.len(), 1);
        assert_eq!(result.columns[0].name, "Name");
        assert_eq!(
            result.format_for_llm(),
            "Name\nAC/DC\nAccept\nAerosmith"
        );
    }

    #[tokio::test]
    async fn test_execute_query_empty_result_keeps_columns() {
        let (_dir, client) = chinook_client(0).await;
        let result = client
            .execute_query("SELECT Name FROM Artist WHERE ArtistId > 100")
            .await
            .unwrap();

        assert!(result.is_empty());
        assert_eq!(result.format_for_llm(), "Name\n(no rows)");
    }

    #[tokio::test]
    async fn test_execute_query_mixed_storage_classes() {
        let (_dir, client) = chinook_client(0).await;
        let result = client
            .execute_query("SELECT 1, 2.5, 'text', NULL, x'00ff'")
            .await
            .unwrap();

        assert_eq!(
            result.rows[0],
            vec![
                Value::Int(1),
                Value::Float(2.5),
                Value::from("text"),
                Value::Null,
                Value::Bytes(vec![0x00, 0xff]),
            ]
        );
    }

    #[tokio::test]
    async fn test_execute_query_error() {
        let (_dir, client) = chinook_client(0).await;
        let err = client
            .execute_query("SELECT * FROM Track")
            .await
            .unwrap_err();

        assert!(matches!(err, SqlChatError::Query(_)));
        assert!(err.to_string().contains("no such table"));
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("Artist"), "\"Artist\"");
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }
}

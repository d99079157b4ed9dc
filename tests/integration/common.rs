//! Shared fixtures: temporary SQLite databases and mock-backed sessions.

use sqlchat::config::{ApiKeys, Config, ConnectionConfig};
use sqlchat::llm::MockLlmClient;
use sqlchat::session::Session;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::Path;
use tempfile::TempDir;

/// Statements creating a small Chinook subset.
pub const CHINOOK_SQL: &[&str] = &[
    "CREATE TABLE Artist (ArtistId INTEGER PRIMARY KEY, Name NVARCHAR(120))",
    "CREATE TABLE Album (AlbumId INTEGER PRIMARY KEY, Title NVARCHAR(160) NOT NULL, \
     ArtistId INTEGER NOT NULL REFERENCES Artist(ArtistId))",
    "INSERT INTO Artist (ArtistId, Name) VALUES (1, 'AC/DC'), (2, 'Accept'), \
     (3, 'Aerosmith'), (4, 'Alanis Morissette')",
    "INSERT INTO Album (AlbumId, Title, ArtistId) VALUES \
     (1, 'For Those About To Rock We Salute You', 1), (2, 'Balls to the Wall', 2), \
     (3, 'Restless and Wild', 2)",
];

/// Statements creating an unrelated music-store table.
pub const GENRE_SQL: &[&str] = &[
    "CREATE TABLE Genre (GenreId INTEGER PRIMARY KEY, Name NVARCHAR(120))",
    "INSERT INTO Genre (GenreId, Name) VALUES (1, 'Rock'), (2, 'Jazz')",
];

/// Creates a SQLite file at `path` and runs `statements` on it.
pub async fn create_sqlite_db(path: &Path, statements: &[&str]) {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();

    for statement in statements {
        sqlx::query(statement).execute(&pool).await.unwrap();
    }

    pool.close().await;
}

/// Creates a temporary Chinook database and returns its directory and config.
pub async fn chinook_db() -> (TempDir, ConnectionConfig) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chinook.db");
    create_sqlite_db(&path, CHINOOK_SQL).await;
    (dir, ConnectionConfig::sqlite(path.to_string_lossy()))
}

/// A disconnected session using `llm`.
pub fn session_with(llm: MockLlmClient) -> Session {
    Session::new(&Config::default(), ApiKeys::default(), true)
        .unwrap()
        .with_llm_client(Box::new(llm))
}

/// A session connected to `config` using `llm`.
pub async fn connected_session(config: ConnectionConfig, llm: MockLlmClient) -> Session {
    let mut session = session_with(llm);
    session.connect_to(config).await.unwrap();
    session
}

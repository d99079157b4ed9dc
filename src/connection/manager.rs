//! Connection manager for the session's single database connection.

use tracing::{info, warn};

use crate::config::ConnectionConfig;
use crate::db::DatabaseClient;
use crate::error::Result;

/// An active database connection with the settings that opened it.
pub struct ActiveConnection {
    /// Settings used to open the connection.
    pub config: ConnectionConfig,
    /// Database client.
    pub db: Box<dyn DatabaseClient>,
}

/// Owns at most one open connection and replaces it wholesale on reconnect.
#[derive(Default)]
pub struct ConnectionManager {
    active: Option<ActiveConnection>,
}

impl ConnectionManager {
    /// Creates a new connection manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a connection manager with an existing connection.
    pub fn with_connection(config: ConnectionConfig, db: Box<dyn DatabaseClient>) -> Self {
        Self {
            active: Some(ActiveConnection { config, db }),
        }
    }

    /// Connect to a database using the given configuration.
    ///
    /// The new connection is opened before the old one is touched, so a
    /// failure leaves the previous connection in place.
    pub async fn connect(&mut self, config: &ConnectionConfig, sample_rows: usize) -> Result<()> {
        let db = crate::db::connect(config, sample_rows).await?;
        self.replace(config.clone(), db).await;
        Ok(())
    }

    /// Installs an already opened client, closing the previous one.
    pub async fn replace(&mut self, config: ConnectionConfig, db: Box<dyn DatabaseClient>) {
        if let Some(old) = self.active.take() {
            if let Err(e) = old.db.close().await {
                warn!("Failed to close previous connection: {e}");
            }
        }

        info!("Connected to {}", config.display_string());
        self.active = Some(ActiveConnection { config, db });
    }

    /// Get the active database client.
    pub fn db(&self) -> Option<&dyn DatabaseClient> {
        self.active.as_ref().map(|c| c.db.as_ref())
    }

    /// Get the settings of the active connection.
    pub fn config(&self) -> Option<&ConnectionConfig> {
        self.active.as_ref().map(|c| &c.config)
    }

    /// Check if there's an active connection.
    pub fn is_connected(&self) -> bool {
        self.active.is_some()
    }

    /// Close the active connection.
    pub async fn close(&mut self) -> Result<()> {
        if let Some(conn) = self.active.take() {
            conn.db.close().await?;
        }
        Ok(())
    }
}

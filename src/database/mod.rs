//! SeaORM connection handling
//!
//! This module opens connections for SQLite, PostgreSQL and MySQL and keeps
//! the process-wide default connection used by the data-access functions.

use sea_orm::{ConnectOptions, Database as SeaOrmDatabase};
use std::error::Error;
use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::errors::{RowError, RowResult};

pub mod connection;
pub mod default_connection;

pub use connection::Connection;
pub use default_connection::{clear_connection, get_connection, set_connection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    SQLite,
    PostgreSQL,
    MySQL,
}

impl DatabaseType {
    /// Detect the database type from the URL
    pub fn detect(url: &str) -> RowResult<Self> {
        if url.starts_with("sqlite:") {
            Ok(Self::SQLite)
        } else if url.starts_with("postgres:") || url.starts_with("postgresql:") {
            Ok(Self::PostgreSQL)
        } else if url.starts_with("mysql:") || url.starts_with("mariadb:") {
            Ok(Self::MySQL)
        } else {
            Err(RowError::configuration(format!(
                "Unsupported database URL format: {url}"
            )))
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SQLite => "SQLite",
            Self::PostgreSQL => "PostgreSQL",
            Self::MySQL => "MySQL",
        }
    }
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Open a connection described by `config`
pub async fn connect(config: &DatabaseConfig) -> RowResult<Connection> {
    config.validate()?;
    let database_type = DatabaseType::detect(&config.url)?;

    info!("Connecting to {} database", database_type);

    let connection_url = match database_type {
        DatabaseType::SQLite => ensure_sqlite_auto_creation(&config.url)?,
        _ => config.url.clone(),
    };

    let mut connect_options = ConnectOptions::new(connection_url.clone());
    connect_options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(config.connect_timeout()?)
        .acquire_timeout(config.acquire_timeout()?)
        .idle_timeout(config.idle_timeout()?)
        .max_lifetime(config.max_lifetime()?)
        .sqlx_logging(config.sqlx_logging)
        .sqlx_logging_level(config.logging_level()?);

    // Every pooled connection to an in-memory SQLite URL opens its own empty database
    if connection_url.contains(":memory:") {
        connect_options.max_connections(1).min_connections(1);
    }

    let connection = match SeaOrmDatabase::connect(connect_options).await {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!("Database connection failed: {:?}", e);
            let mut source = e.source();
            let mut level = 0;
            while let Some(err) = source {
                tracing::error!("  Level {}: {}", level, err);
                source = err.source();
                level += 1;
            }
            return Err(e.into());
        }
    };

    debug!("Database connection established successfully");
    Ok(Connection::from(connection))
}

/// Open a connection and install it as the default connection
pub async fn connect_default(config: &DatabaseConfig) -> RowResult<Connection> {
    let connection = connect(config).await?;
    set_connection(connection.clone());
    Ok(connection)
}

/// Ensure a SQLite URL includes auto-creation mode if needed
fn ensure_sqlite_auto_creation(url: &str) -> RowResult<String> {
    if url.contains("mode=") || url.contains(":memory:") {
        debug!("SQLite URL needs no modification: {}", url);
        return Ok(url.to_string());
    }

    let file_path = if let Some(path) = url.strip_prefix("sqlite://") {
        path
    } else if let Some(path) = url.strip_prefix("sqlite:") {
        path
    } else {
        return Err(RowError::configuration(format!(
            "Invalid SQLite URL format: {url}"
        )));
    };
    let file_path = file_path.split('?').next().unwrap_or(file_path);

    let path = std::path::Path::new(file_path);
    if path.exists() {
        debug!("SQLite database file already exists: {}", file_path);
        return Ok(url.to_string());
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| {
                RowError::configuration(format!(
                    "Failed to create directory for SQLite database {}: {e}",
                    parent.display()
                ))
            })?;
            info!("Created directory for SQLite database: {}", parent.display());
        }
    }

    let auto_create_url = if url.contains('?') {
        format!("{url}&mode=rwc")
    } else {
        format!("{url}?mode=rwc")
    };

    info!(
        "Modified SQLite URL to enable auto-creation: {} -> {}",
        url, auto_create_url
    );
    Ok(auto_create_url)
}

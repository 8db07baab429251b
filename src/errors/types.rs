//! Error type definitions for active-row
//!
//! Two kinds of failure originate in this crate itself: referencing a column
//! that is not part of a row's snapshot, and using the default connection
//! before one was configured. Everything the database client raises is
//! passed through unchanged.

use thiserror::Error;

/// Errors produced by row handles and the data-access functions
#[derive(Error, Debug)]
pub enum RowError {
    /// A column was referenced that is not present in the row snapshot
    #[error("Column '{column}' does not exist for table {table}")]
    ColumnNotFound { column: String, table: String },

    /// The process-wide default connection was used before being set
    #[error("Default connection is not set")]
    DefaultConnectionNotSet,

    /// Database errors from SeaORM, propagated unmodified
    #[error(transparent)]
    Database(#[from] sea_orm::DbErr),

    /// Statement construction errors from SeaQuery
    #[error("Statement error: {0}")]
    Statement(#[from] sea_orm::sea_query::error::Error),

    /// A column value could not be converted into the requested type
    #[error("Column '{column}' of table {table} could not be decoded: {source}")]
    Decode {
        column: String,
        table: String,
        #[source]
        source: serde_json::Error,
    },

    /// The column holds an expression evaluated by the database (for example
    /// `CURRENT_TIMESTAMP`) whose concrete value was never read back
    #[error("Column '{column}' of table {table} holds a database-evaluated value that has not been fetched")]
    UnresolvedValue { column: String, table: String },

    /// Commit or rollback was requested while other handles still share the transaction
    #[error("Transaction is still shared by other connection handles")]
    TransactionInUse,

    /// Commit or rollback was requested on a connection that is not a transaction
    #[error("Connection is not a transaction")]
    NotInTransaction,

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl RowError {
    /// Create an unknown column error
    pub fn column_not_found<C: Into<String>, T: Into<String>>(column: C, table: T) -> Self {
        Self::ColumnNotFound {
            column: column.into(),
            table: table.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether this error was raised locally before any statement was issued
    pub fn is_local(&self) -> bool {
        !matches!(self, Self::Database(_))
    }
}

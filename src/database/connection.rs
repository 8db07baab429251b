//! Shared connection handle
//!
//! A [`Connection`] is either a pooled SeaORM database connection or an open
//! transaction. Clones share the same underlying handle, and rows compare
//! connections by identity.

use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend, DbErr, ExecResult,
    QueryResult, Statement, TransactionTrait,
};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::errors::{RowError, RowResult};

/// Database handle shared between rows and data-access calls
#[derive(Clone)]
pub enum Connection {
    /// Pooled connection
    Database(Arc<DatabaseConnection>),
    /// Open transaction; statements run inside it until committed or rolled back
    Transaction(Arc<DatabaseTransaction>),
}

impl Connection {
    /// Backend used to render statements for this connection
    pub fn backend(&self) -> DbBackend {
        match self {
            Self::Database(conn) => conn.get_database_backend(),
            Self::Transaction(txn) => txn.get_database_backend(),
        }
    }

    pub(crate) fn backend_name(&self) -> &'static str {
        match self.backend() {
            DbBackend::MySql => "MySQL",
            DbBackend::Postgres => "PostgreSQL",
            DbBackend::Sqlite => "SQLite",
        }
    }

    /// Whether both handles refer to the same underlying connection or transaction
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Database(a), Self::Database(b)) => Arc::ptr_eq(a, b),
            (Self::Transaction(a), Self::Transaction(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn is_transaction(&self) -> bool {
        matches!(self, Self::Transaction(_))
    }

    /// Start a transaction (a savepoint when already inside one)
    pub async fn begin(&self) -> RowResult<Connection> {
        let txn = match self {
            Self::Database(conn) => conn.begin().await?,
            Self::Transaction(txn) => txn.begin().await?,
        };
        debug!("Started {} transaction", self.backend_name());
        Ok(Self::Transaction(Arc::new(txn)))
    }

    /// Commit the transaction. Every other clone of this handle, including
    /// rows bound to it, must have been dropped or switched away first.
    pub async fn commit(self) -> RowResult<()> {
        let txn = self.into_transaction()?;
        txn.commit().await?;
        debug!("Committed transaction");
        Ok(())
    }

    /// Roll the transaction back, under the same sharing rules as [`Connection::commit`]
    pub async fn rollback(self) -> RowResult<()> {
        let txn = self.into_transaction()?;
        txn.rollback().await?;
        debug!("Rolled back transaction");
        Ok(())
    }

    fn into_transaction(self) -> RowResult<DatabaseTransaction> {
        match self {
            Self::Transaction(txn) => Arc::try_unwrap(txn).map_err(|_| RowError::TransactionInUse),
            Self::Database(_) => Err(RowError::NotInTransaction),
        }
    }

    pub(crate) async fn execute(&self, stmt: Statement) -> Result<ExecResult, DbErr> {
        match self {
            Self::Database(conn) => conn.execute(stmt).await,
            Self::Transaction(txn) => txn.execute(stmt).await,
        }
    }

    pub(crate) async fn query_one(&self, stmt: Statement) -> Result<Option<QueryResult>, DbErr> {
        match self {
            Self::Database(conn) => conn.query_one(stmt).await,
            Self::Transaction(txn) => txn.query_one(stmt).await,
        }
    }

    pub(crate) async fn query_all(&self, stmt: Statement) -> Result<Vec<QueryResult>, DbErr> {
        match self {
            Self::Database(conn) => conn.query_all(stmt).await,
            Self::Transaction(txn) => txn.query_all(stmt).await,
        }
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_transaction() {
            "Transaction"
        } else {
            "Database"
        };
        f.debug_struct("Connection")
            .field("kind", &kind)
            .field("backend", &self.backend_name())
            .finish()
    }
}

impl From<DatabaseConnection> for Connection {
    fn from(conn: DatabaseConnection) -> Self {
        Self::Database(Arc::new(conn))
    }
}

impl From<Arc<DatabaseConnection>> for Connection {
    fn from(conn: Arc<DatabaseConnection>) -> Self {
        Self::Database(conn)
    }
}

impl From<DatabaseTransaction> for Connection {
    fn from(txn: DatabaseTransaction) -> Self {
        Self::Transaction(Arc::new(txn))
    }
}

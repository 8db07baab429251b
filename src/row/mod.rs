//! Row handles
//!
//! A [`Row`] wraps one fetched record together with its table name, the
//! columns that identify it and the connection it is bound to. Reads are
//! served from the in-memory snapshot; every write issues exactly one
//! statement and then mirrors the change locally.

use sea_orm::sea_query::{Alias, Asterisk, Condition, Expr, Query, SelectStatement};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

use crate::config::defaults::{
    DEFAULT_ID_COLUMN, DEFAULT_TIME_CREATED_COLUMN, DEFAULT_TIME_DELETED_COLUMN,
    DEFAULT_TIME_UPDATED_COLUMN,
};
use crate::database::Connection;
use crate::database::default_connection::resolve_connection;
use crate::errors::{RowError, RowResult};

pub mod value;

pub use value::{RowData, RowValue, row_data_from_json};

/// Names of the bookkeeping columns of a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNames {
    pub id: String,
    pub time_created: String,
    pub time_updated: String,
    pub time_deleted: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            id: DEFAULT_ID_COLUMN.to_string(),
            time_created: DEFAULT_TIME_CREATED_COLUMN.to_string(),
            time_updated: DEFAULT_TIME_UPDATED_COLUMN.to_string(),
            time_deleted: DEFAULT_TIME_DELETED_COLUMN.to_string(),
        }
    }
}

/// Options for constructing a [`Row`] directly
#[derive(Debug, Clone, Default)]
pub struct RowOptions {
    /// Connection to bind; the default connection when `None`
    pub conn: Option<Connection>,
    /// Identity columns; `[columns.id]` when `None`
    pub primary_cols: Option<Vec<String>>,
    pub columns: ColumnNames,
}

impl RowOptions {
    pub fn conn(mut self, conn: Connection) -> Self {
        self.conn = Some(conn);
        self
    }

    pub fn primary_cols<I, S>(mut self, cols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_cols = Some(cols.into_iter().map(Into::into).collect());
        self
    }

    pub fn columns(mut self, columns: ColumnNames) -> Self {
        self.columns = columns;
        self
    }
}

/// One database record bound to a table and a connection
#[derive(Debug, Clone)]
pub struct Row {
    table_name: String,
    data: RowData,
    primary_cols: Vec<String>,
    columns: ColumnNames,
    initial_conn: Connection,
    conn: Connection,
}

impl Row {
    /// Wrap `data` as a row of `table_name`, bound to `opts.conn` or the default connection
    pub fn new<T: Into<String>>(table_name: T, data: RowData, opts: RowOptions) -> RowResult<Self> {
        let conn = resolve_connection(opts.conn.clone())?;
        Ok(Self::with_connection(table_name, data, conn, opts))
    }

    /// Wrap `data` as a row bound to `conn`; `opts.conn` is ignored
    pub fn with_connection<T: Into<String>>(
        table_name: T,
        data: RowData,
        conn: Connection,
        opts: RowOptions,
    ) -> Self {
        let RowOptions {
            primary_cols,
            columns,
            ..
        } = opts;
        let primary_cols = primary_cols.unwrap_or_else(|| vec![columns.id.clone()]);

        Self {
            table_name: table_name.into(),
            data,
            primary_cols,
            columns,
            initial_conn: conn.clone(),
            conn,
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn primary_cols(&self) -> &[String] {
        &self.primary_cols
    }

    pub fn columns(&self) -> &ColumnNames {
        &self.columns
    }

    /// Last-known snapshot of the record
    pub fn data(&self) -> &RowData {
        &self.data
    }

    pub fn into_data(self) -> RowData {
        self.data
    }

    /// Current connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Replace the current connection, or go back to the one the row was
    /// constructed with when `conn` is `None`
    pub fn set_connection(&mut self, conn: Option<Connection>) {
        self.conn = conn.unwrap_or_else(|| self.initial_conn.clone());
    }

    pub fn is_column(&self, column: &str) -> bool {
        self.data.contains_key(column)
    }

    pub fn get_column(&self, column: &str) -> RowResult<&RowValue> {
        self.data
            .get(column)
            .ok_or_else(|| RowError::column_not_found(column, &self.table_name))
    }

    /// Typed column access
    pub fn get<T: DeserializeOwned>(&self, column: &str) -> RowResult<T> {
        match self.get_column(column)? {
            RowValue::Json(value) => T::deserialize(value).map_err(|source| RowError::Decode {
                column: column.to_string(),
                table: self.table_name.clone(),
                source,
            }),
            RowValue::Expr(_) => Err(RowError::UnresolvedValue {
                column: column.to_string(),
                table: self.table_name.clone(),
            }),
        }
    }

    pub fn id(&self) -> RowResult<&RowValue> {
        self.get_column(&self.columns.id)
    }

    pub fn time_created(&self) -> RowResult<&RowValue> {
        self.get_column(&self.columns.time_created)
    }

    pub fn time_updated(&self) -> RowResult<&RowValue> {
        self.get_column(&self.columns.time_updated)
    }

    pub fn time_deleted(&self) -> RowResult<&RowValue> {
        self.get_column(&self.columns.time_deleted)
    }

    pub fn is_deleted(&self) -> RowResult<bool> {
        Ok(!self.time_deleted()?.is_blank())
    }

    /// Values of the identity columns
    pub fn primary_key(&self) -> RowResult<BTreeMap<String, RowValue>> {
        self.primary_cols
            .iter()
            .map(|col| Ok((col.clone(), self.get_column(col)?.clone())))
            .collect()
    }

    /// Condition matching exactly this record
    fn identity(&self) -> RowResult<Condition> {
        Ok(self
            .primary_key()?
            .into_iter()
            .fold(Condition::all(), |cond, (col, value)| {
                cond.add(Expr::col(Alias::new(col)).eq(value.to_simple_expr()))
            }))
    }

    /// `SELECT *` scoped to this record
    pub fn query(&self) -> RowResult<SelectStatement> {
        Ok(Query::select()
            .column(Asterisk)
            .from(Alias::new(&self.table_name))
            .cond_where(self.identity()?)
            .to_owned())
    }

    /// Update several columns with one statement, then mirror the values locally.
    ///
    /// Every key must already be a column of the snapshot; the first unknown
    /// key fails the call before anything is sent to the database.
    pub async fn set_columns<I, K, V>(&mut self, data: I) -> RowResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<RowValue>,
    {
        let data: RowData = data
            .into_iter()
            .map(|(column, value)| (column.into(), value.into()))
            .collect();

        if let Some(column) = data.keys().find(|column| !self.is_column(column)) {
            return Err(RowError::column_not_found(column, &self.table_name));
        }
        if data.is_empty() {
            trace!("No columns to update for table {}", self.table_name);
            return Ok(());
        }

        let mut update = Query::update();
        update
            .table(Alias::new(&self.table_name))
            .cond_where(self.identity()?);
        for (column, value) in &data {
            update.value(Alias::new(column), value.to_simple_expr());
        }

        let stmt = self.conn.backend().build(&update);
        debug!(table = %self.table_name, sql = %stmt, "Updating row");
        let result = self.conn.execute(stmt).await?;
        if result.rows_affected() == 0 {
            warn!(
                "Update on table {} matched no rows; the row may have been removed",
                self.table_name
            );
        }

        trace!("Merging {} column(s) into row snapshot", data.len());
        self.data.extend(data);
        Ok(())
    }

    pub async fn set_column<K, V>(&mut self, column: K, value: V) -> RowResult<()>
    where
        K: Into<String>,
        V: Into<RowValue>,
    {
        self.set_columns([(column.into(), value.into())]).await
    }

    /// Soft delete: stamp the deleted column with the database's current time
    pub async fn delete(&mut self) -> RowResult<()> {
        let column = self.columns.time_deleted.clone();
        self.set_column(column, RowValue::now()).await
    }

    /// Undo a soft delete
    pub async fn restore(&mut self) -> RowResult<()> {
        let column = self.columns.time_deleted.clone();
        self.set_column(column, RowValue::null()).await
    }

    /// Remove the record. The snapshot is left as it was, so the row must not
    /// be used for further writes.
    pub async fn delete_permanently(&self) -> RowResult<()> {
        let delete = Query::delete()
            .from_table(Alias::new(&self.table_name))
            .cond_where(self.identity()?)
            .to_owned();

        let stmt = self.conn.backend().build(&delete);
        debug!(table = %self.table_name, sql = %stmt, "Deleting row");
        let result = self.conn.execute(stmt).await?;
        if result.rows_affected() == 0 {
            warn!("Delete on table {} matched no rows", self.table_name);
        }
        Ok(())
    }
}

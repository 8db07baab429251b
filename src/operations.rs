//! Data-access functions
//!
//! `find_all`, `find`, `count_all`, `insert` and `insert_all` each build one
//! statement with SeaQuery and run it against an explicit connection or the
//! default one. Query customisation happens through callbacks that receive
//! the statement in progress.

use sea_orm::sea_query::{Alias, Asterisk, Expr, Func, Query, SelectStatement, SimpleExpr};
use sea_orm::{DbBackend, FromQueryResult, JsonValue};
use tracing::debug;

use crate::config::defaults::{DEFAULT_ID_COLUMN, DEFAULT_PAGINATION_LIMIT, DEFAULT_PAGINATION_PAGE};
use crate::database::Connection;
use crate::database::default_connection::resolve_connection;
use crate::errors::RowResult;
use crate::row::{ColumnNames, Row, RowData, RowOptions, RowValue, row_data_from_json};

/// Callback that customises a select statement before it runs
pub type QueryFn = Box<dyn FnOnce(&mut SelectStatement) + Send>;

/// Page window for `find_all`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page number, 1 when unset
    pub page: Option<u64>,
    /// Page size, 20 when unset
    pub limit: Option<u64>,
}

impl Pagination {
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }

    pub fn limit(&self) -> u64 {
        self.limit.unwrap_or(DEFAULT_PAGINATION_LIMIT)
    }

    pub fn page(&self) -> u64 {
        self.page.unwrap_or(DEFAULT_PAGINATION_PAGE)
    }

    pub fn offset(&self) -> u64 {
        self.page().saturating_sub(1).saturating_mul(self.limit())
    }
}

/// Options for `find_all` and `find`
pub struct FindOptions {
    pub table_name: String,
    pub conn: Option<Connection>,
    pub filter: Option<QueryFn>,
    pub include_deleted: bool,
    pub pagination: Option<Pagination>,
    pub before: Option<QueryFn>,
    /// Identity columns handed to every returned row
    pub primary_cols: Option<Vec<String>>,
    pub columns: ColumnNames,
}

impl FindOptions {
    pub fn new<T: Into<String>>(table_name: T) -> Self {
        Self {
            table_name: table_name.into(),
            conn: None,
            filter: None,
            include_deleted: false,
            pagination: None,
            before: None,
            primary_cols: None,
            columns: ColumnNames::default(),
        }
    }

    pub fn conn(mut self, conn: Connection) -> Self {
        self.conn = Some(conn);
        self
    }

    /// Add conditions to the query; runs before the soft-delete filter
    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: FnOnce(&mut SelectStatement) + Send + 'static,
    {
        self.filter = Some(Box::new(filter));
        self
    }

    pub fn include_deleted(mut self, include_deleted: bool) -> Self {
        self.include_deleted = include_deleted;
        self
    }

    pub fn pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    /// Last customisation step, run after filtering and pagination
    pub fn before<F>(mut self, before: F) -> Self
    where
        F: FnOnce(&mut SelectStatement) + Send + 'static,
    {
        self.before = Some(Box::new(before));
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

/// Columns counted by `count_all`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountBy {
    Single(String),
    Many(Vec<String>),
}

impl CountBy {
    fn into_columns(self) -> Vec<String> {
        match self {
            Self::Single(column) => vec![column],
            Self::Many(columns) => columns,
        }
    }
}

impl From<&str> for CountBy {
    fn from(column: &str) -> Self {
        Self::Single(column.to_string())
    }
}

impl From<String> for CountBy {
    fn from(column: String) -> Self {
        Self::Single(column)
    }
}

impl From<Vec<String>> for CountBy {
    fn from(columns: Vec<String>) -> Self {
        Self::Many(columns)
    }
}

impl<const N: usize> From<[&str; N]> for CountBy {
    fn from(columns: [&str; N]) -> Self {
        Self::Many(columns.iter().map(|c| c.to_string()).collect())
    }
}

/// Options for `count_all`
pub struct CountOptions {
    pub table_name: String,
    pub conn: Option<Connection>,
    pub filter: Option<QueryFn>,
    pub include_deleted: bool,
    /// The id column when unset
    pub count_by: Option<CountBy>,
    pub columns: ColumnNames,
}

impl CountOptions {
    pub fn new<T: Into<String>>(table_name: T) -> Self {
        Self {
            table_name: table_name.into(),
            conn: None,
            filter: None,
            include_deleted: false,
            count_by: None,
            columns: ColumnNames::default(),
        }
    }

    pub fn conn(mut self, conn: Connection) -> Self {
        self.conn = Some(conn);
        self
    }

    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: FnOnce(&mut SelectStatement) + Send + 'static,
    {
        self.filter = Some(Box::new(filter));
        self
    }

    pub fn include_deleted(mut self, include_deleted: bool) -> Self {
        self.include_deleted = include_deleted;
        self
    }

    pub fn count_by<C: Into<CountBy>>(mut self, count_by: C) -> Self {
        self.count_by = Some(count_by.into());
        self
    }

    pub fn columns(mut self, columns: ColumnNames) -> Self {
        self.columns = columns;
        self
    }
}

/// Options for `insert` and `insert_all`
#[derive(Debug, Clone)]
pub struct InsertOptions {
    pub conn: Option<Connection>,
    /// Column whose generated value `insert` returns
    pub id_column: String,
}

impl Default for InsertOptions {
    fn default() -> Self {
        Self {
            conn: None,
            id_column: DEFAULT_ID_COLUMN.to_string(),
        }
    }
}

impl InsertOptions {
    pub fn conn(mut self, conn: Connection) -> Self {
        self.conn = Some(conn);
        self
    }

    pub fn id_column<S: Into<String>>(mut self, id_column: S) -> Self {
        self.id_column = id_column.into();
        self
    }
}

/// Apply the caller's filter and, unless deleted rows are wanted, the soft-delete filter
fn apply_filters(
    query: &mut SelectStatement,
    filter: Option<QueryFn>,
    include_deleted: bool,
    columns: &ColumnNames,
) {
    if let Some(filter) = filter {
        filter(query);
    }
    if !include_deleted {
        query.and_where(Expr::col(Alias::new(&columns.time_deleted)).is_null());
    }
}

/// Select statement `find_all` would run for `opts`, minus the connection
fn build_find_query(
    table_name: &str,
    filter: Option<QueryFn>,
    include_deleted: bool,
    pagination: Option<Pagination>,
    before: Option<QueryFn>,
    columns: &ColumnNames,
) -> SelectStatement {
    let mut query = Query::select();
    query.column(Asterisk).from(Alias::new(table_name));

    apply_filters(&mut query, filter, include_deleted, columns);

    if let Some(pagination) = pagination {
        query.limit(pagination.limit()).offset(pagination.offset());
    }
    if let Some(before) = before {
        before(&mut query);
    }
    query
}

/// Fetch every matching record as a [`Row`]
pub async fn find_all(opts: FindOptions) -> RowResult<Vec<Row>> {
    let FindOptions {
        table_name,
        conn,
        filter,
        include_deleted,
        pagination,
        before,
        primary_cols,
        columns,
    } = opts;
    let conn = resolve_connection(conn)?;

    let query = build_find_query(
        &table_name,
        filter,
        include_deleted,
        pagination,
        before,
        &columns,
    );
    let stmt = conn.backend().build(&query);
    debug!(table = %table_name, sql = %stmt, "Finding rows");

    let results = conn.query_all(stmt).await?;
    debug!("Fetched {} row(s) from {}", results.len(), table_name);

    results
        .iter()
        .map(|result| -> RowResult<Row> {
            let data = row_data_from_json(JsonValue::from_query_result(result, "")?);
            let row_opts = RowOptions {
                conn: None,
                primary_cols: primary_cols.clone(),
                columns: columns.clone(),
            };
            Ok(Row::with_connection(
                table_name.clone(),
                data,
                conn.clone(),
                row_opts,
            ))
        })
        .collect()
}

/// Fetch the first matching record, if any
pub async fn find(opts: FindOptions) -> RowResult<Option<Row>> {
    Ok(find_all(opts).await?.into_iter().next())
}

/// Count matching records
///
/// With several `count_by` columns the result is the number of records in
/// which all of them are non-null.
pub async fn count_all(opts: CountOptions) -> RowResult<u64> {
    let CountOptions {
        table_name,
        conn,
        filter,
        include_deleted,
        count_by,
        columns,
    } = opts;
    let conn = resolve_connection(conn)?;

    let count_columns = count_by
        .map(CountBy::into_columns)
        .filter(|columns| !columns.is_empty())
        .unwrap_or_else(|| vec![columns.id.clone()]);

    let mut query = Query::select();
    query.from(Alias::new(&table_name));
    apply_filters(&mut query, filter, include_deleted, &columns);

    let (first, rest) = count_columns.split_at(1);
    query.expr_as(
        Func::count(Expr::col(Alias::new(&first[0]))),
        Alias::new("count"),
    );
    for column in rest {
        query.and_where(Expr::col(Alias::new(column)).is_not_null());
    }

    let stmt = conn.backend().build(&query);
    debug!(table = %table_name, sql = %stmt, "Counting rows");

    let count: i64 = match conn.query_one(stmt).await? {
        Some(result) => result.try_get("", "count")?,
        None => 0,
    };
    Ok(u64::try_from(count).unwrap_or_default())
}

/// Column list covering every record, in first-seen order
fn union_columns(records: &[RowData]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for record in records {
        for column in record.keys() {
            if !columns.contains(column) {
                columns.push(column.clone());
            }
        }
    }
    columns
}

/// Insert records as given. Columns missing from a record are written as NULL.
pub async fn insert_all(table_name: &str, records: Vec<RowData>, opts: InsertOptions) -> RowResult<()> {
    if records.is_empty() {
        debug!("No records to insert into {}", table_name);
        return Ok(());
    }
    let conn = resolve_connection(opts.conn)?;

    let columns = union_columns(&records);
    if columns.is_empty() {
        // Nothing to list in VALUES; each record takes every column default
        for _ in &records {
            let mut insert = Query::insert();
            insert.into_table(Alias::new(table_name)).or_default_values();
            conn.execute(conn.backend().build(&insert)).await?;
        }
        return Ok(());
    }

    let mut insert = Query::insert();
    insert
        .into_table(Alias::new(table_name))
        .columns(columns.iter().map(Alias::new));
    for record in &records {
        let values: Vec<SimpleExpr> = columns
            .iter()
            .map(|column| {
                record
                    .get(column)
                    .map_or_else(|| RowValue::null().to_simple_expr(), RowValue::to_simple_expr)
            })
            .collect();
        insert.values(values)?;
    }

    let stmt = conn.backend().build(&insert);
    debug!(table = %table_name, sql = %stmt, "Inserting {} row(s)", records.len());
    conn.execute(stmt).await?;
    Ok(())
}

/// Insert one record and return its generated key
pub async fn insert(table_name: &str, record: RowData, opts: InsertOptions) -> RowResult<JsonValue> {
    let InsertOptions { conn, id_column } = opts;
    let conn = resolve_connection(conn)?;
    let backend = conn.backend();

    let mut insert = Query::insert();
    insert.into_table(Alias::new(table_name));
    if record.is_empty() {
        insert.or_default_values();
    } else {
        insert.columns(record.keys().map(Alias::new));
        insert.values(record.values().map(RowValue::to_simple_expr))?;
    }

    if backend == DbBackend::Postgres {
        insert.returning_col(Alias::new(&id_column));
        let stmt = backend.build(&insert);
        debug!(table = %table_name, sql = %stmt, "Inserting row");

        let generated = match conn.query_one(stmt).await? {
            Some(result) => JsonValue::from_query_result(&result, "")?
                .get(&id_column)
                .cloned()
                .unwrap_or(JsonValue::Null),
            None => JsonValue::Null,
        };
        return Ok(generated);
    }

    let stmt = backend.build(&insert);
    debug!(table = %table_name, sql = %stmt, "Inserting row");
    let result = conn.execute(stmt).await?;
    Ok(JsonValue::from(result.last_insert_id()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::sea_query::{MysqlQueryBuilder, Order, PostgresQueryBuilder};

    #[test]
    fn test_pagination_defaults() {
        let pagination = Pagination::default();
        assert_eq!(pagination.limit(), 20);
        assert_eq!(pagination.page(), 1);
        assert_eq!(pagination.offset(), 0);

        assert_eq!(Pagination::new(3, 4).offset(), 8);
        assert_eq!(Pagination { page: Some(0), limit: Some(4) }.offset(), 0);
    }

    #[test]
    fn test_find_query_excludes_deleted_by_default() {
        let query = build_find_query("kansen", None, false, None, None, &ColumnNames::default());
        assert_eq!(
            query.to_string(MysqlQueryBuilder),
            "SELECT * FROM `kansen` WHERE `time_deleted` IS NULL"
        );
    }

    #[test]
    fn test_find_query_applies_filter_pagination_and_hook_in_order() {
        let filter: QueryFn = Box::new(|q: &mut SelectStatement| {
            q.and_where(Expr::col(Alias::new("score")).gte(30));
        });
        let before: QueryFn = Box::new(|q: &mut SelectStatement| {
            q.order_by(Alias::new("id"), Order::Asc);
        });

        let query = build_find_query(
            "kansen",
            Some(filter),
            false,
            Some(Pagination { page: Some(2), limit: Some(4) }),
            Some(before),
            &ColumnNames::default(),
        );
        assert_eq!(
            query.to_string(PostgresQueryBuilder),
            r#"SELECT * FROM "kansen" WHERE "score" >= 30 AND "time_deleted" IS NULL ORDER BY "id" ASC LIMIT 4 OFFSET 4"#
        );
    }

    #[test]
    fn test_find_query_with_deleted_rows() {
        let query = build_find_query("kansen", None, true, None, None, &ColumnNames::default());
        assert_eq!(query.to_string(MysqlQueryBuilder), "SELECT * FROM `kansen`");
    }

    #[test]
    fn test_union_columns_keeps_first_seen_order() {
        let records = vec![
            row_data_from_json(serde_json::json!({ "name": "Mainz", "key": "mainz" })),
            row_data_from_json(serde_json::json!({ "score": 45, "key": "roon" })),
        ];
        assert_eq!(union_columns(&records), vec!["key", "name", "score"]);
    }

    #[test]
    fn test_count_by_conversions() {
        assert_eq!(CountBy::from("id"), CountBy::Single("id".to_string()));
        assert_eq!(
            CountBy::from(["id", "key"]).into_columns(),
            vec!["id".to_string(), "key".to_string()]
        );
    }
}

//! Active-record style row handles over SeaORM connections.
//!
//! ```no_run
//! use active_row::{FindOptions, database, find};
//! use active_row::config::DatabaseConfig;
//! use active_row::sea_query::{Alias, Expr};
//!
//! # async fn run() -> active_row::errors::RowResult<()> {
//! database::connect_default(&DatabaseConfig::with_url("sqlite://./ships.db")).await?;
//!
//! let opts = FindOptions::new("kansen").filter(|q| {
//!     q.and_where(Expr::col(Alias::new("key")).eq("z23"));
//! });
//! if let Some(mut row) = find(opts).await? {
//!     row.set_column("name", "Z23 (Retrofit)").await?;
//!     row.delete().await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod database;
pub mod errors;
pub mod operations;
pub mod row;

pub use database::{Connection, get_connection, set_connection};
pub use errors::{RowError, RowResult};
pub use operations::{
    CountBy, CountOptions, FindOptions, InsertOptions, Pagination, QueryFn, count_all, find,
    find_all, insert, insert_all,
};
pub use row::{ColumnNames, Row, RowData, RowOptions, RowValue, row_data_from_json};
pub use sea_orm::{self, sea_query};

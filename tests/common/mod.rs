//! Shared fixtures for the integration tests
#![allow(dead_code)]

use active_row::config::DatabaseConfig;
use active_row::sea_orm::{ConnectionTrait, DatabaseBackend, Statement};
use active_row::sea_query::{Alias, Expr, Order, SelectStatement, Value};
use active_row::{Connection, InsertOptions, RowData, database, insert_all, row_data_from_json};
use anyhow::Result;
use serde_json::json;

pub const TABLE: &str = "kansen";

const CREATE_KANSEN: &str = r#"
    CREATE TABLE kansen (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        time_created TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        time_updated TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        time_deleted TIMESTAMP NULL DEFAULT NULL,
        "key" TEXT,
        name TEXT,
        score INTEGER
    )
"#;

/// (id, key, name, score)
pub const KANSEN: [(i64, &str, &str, i64); 6] = [
    (1, "karlsruhe", "Karlsruhe", 10),
    (2, "leipzig", "Leipzig", 20),
    (3, "z23", "Z23", 30),
    (4, "prinz_eugen", "Prinz Eugen", 40),
    (5, "odin", "Odin", 45),
    (6, "friedrich_der_grosse", "Friedrich der Große", 55),
];

/// In-memory database with the `kansen` table created and seeded
pub async fn create_test_connection() -> Result<Connection> {
    let mut config = DatabaseConfig::with_url("sqlite::memory:");
    config.sqlx_logging = false;
    let conn = database::connect(&config).await?;

    let Connection::Database(db) = &conn else {
        anyhow::bail!("expected a pooled connection");
    };
    db.execute(Statement::from_string(DatabaseBackend::Sqlite, CREATE_KANSEN))
        .await?;

    insert_all(TABLE, seed_records(), InsertOptions::default().conn(conn.clone())).await?;
    Ok(conn)
}

pub fn seed_records() -> Vec<RowData> {
    KANSEN
        .iter()
        .map(|(id, key, name, score)| {
            row_data_from_json(json!({ "id": id, "key": key, "name": name, "score": score }))
        })
        .collect()
}

/// Filter callback matching `column = value`
pub fn where_eq<V>(column: &str, value: V) -> impl FnOnce(&mut SelectStatement) + Send + 'static
where
    V: Into<Value>,
{
    let column = column.to_string();
    let value = value.into();
    move |q: &mut SelectStatement| {
        q.and_where(Expr::col(Alias::new(column)).eq(value));
    }
}

/// Filter callback matching `column >= value`
pub fn where_gte(column: &str, value: i64) -> impl FnOnce(&mut SelectStatement) + Send + 'static {
    let column = column.to_string();
    move |q: &mut SelectStatement| {
        q.and_where(Expr::col(Alias::new(column)).gte(value));
    }
}

/// Hook ordering results by id
pub fn order_by_id(q: &mut SelectStatement) {
    q.order_by(Alias::new("id"), Order::Asc);
}

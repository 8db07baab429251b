//! Column values held in a row snapshot

use sea_orm::sea_query::{Keyword, SimpleExpr, Value};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Column name to value mapping for one record
pub type RowData = BTreeMap<String, RowValue>;

/// A single column value
///
/// Fetched values are plain JSON-compatible values. Values written through a
/// row may also be expressions that only the database can evaluate, such as
/// `CURRENT_TIMESTAMP`.
#[derive(Debug, Clone, PartialEq)]
pub enum RowValue {
    Json(JsonValue),
    Expr(SimpleExpr),
}

impl RowValue {
    pub fn null() -> Self {
        Self::Json(JsonValue::Null)
    }

    /// The database's current timestamp, evaluated server-side
    pub fn now() -> Self {
        Self::Expr(SimpleExpr::Keyword(Keyword::CurrentTimestamp))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Json(JsonValue::Null))
    }

    /// Null or an empty string
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Json(JsonValue::Null) => true,
            Self::Json(JsonValue::String(s)) => s.is_empty(),
            _ => false,
        }
    }

    pub fn as_json(&self) -> Option<&JsonValue> {
        match self {
            Self::Json(value) => Some(value),
            Self::Expr(_) => None,
        }
    }

    /// Expression used when this value is written in a statement
    pub fn to_simple_expr(&self) -> SimpleExpr {
        match self {
            Self::Expr(expr) => expr.clone(),
            Self::Json(value) => json_to_expr(value),
        }
    }
}

fn json_to_expr(value: &JsonValue) -> SimpleExpr {
    match value {
        JsonValue::Null => SimpleExpr::Keyword(Keyword::Null),
        JsonValue::Bool(b) => SimpleExpr::Value(Value::from(*b)),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                SimpleExpr::Value(Value::from(i))
            } else if let Some(u) = n.as_u64() {
                SimpleExpr::Value(Value::from(u))
            } else {
                n.as_f64()
                    .map_or(SimpleExpr::Keyword(Keyword::Null), |f| {
                        SimpleExpr::Value(Value::from(f))
                    })
            }
        }
        JsonValue::String(s) => SimpleExpr::Value(Value::from(s.clone())),
        JsonValue::Array(_) | JsonValue::Object(_) => {
            SimpleExpr::Value(Value::Json(Some(Box::new(value.clone()))))
        }
    }
}

/// Convert a JSON object into row data; anything other than an object yields no columns
pub fn row_data_from_json(value: JsonValue) -> RowData {
    match value {
        JsonValue::Object(map) => map
            .into_iter()
            .map(|(column, value)| (column, RowValue::Json(value)))
            .collect(),
        _ => RowData::new(),
    }
}

impl From<JsonValue> for RowValue {
    fn from(value: JsonValue) -> Self {
        Self::Json(value)
    }
}

impl From<SimpleExpr> for RowValue {
    fn from(expr: SimpleExpr) -> Self {
        Self::Expr(expr)
    }
}

impl From<&str> for RowValue {
    fn from(value: &str) -> Self {
        Self::Json(JsonValue::from(value))
    }
}

macro_rules! impl_from_json {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for RowValue {
                fn from(value: $ty) -> Self {
                    Self::Json(JsonValue::from(value))
                }
            }
        )*
    };
}

impl_from_json!(String, bool, i32, i64, u32, u64, f64);

impl<T> From<Option<T>> for RowValue
where
    T: Into<RowValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or_else(Self::null, Into::into)
    }
}

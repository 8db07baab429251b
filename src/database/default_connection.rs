//! Process-wide default connection
//!
//! Every data-access function accepts an explicit connection; when it is
//! omitted they fall back to the handle stored here. Set it once during
//! startup, before any concurrent use.

use std::sync::{PoisonError, RwLock};
use tracing::{debug, info};

use super::Connection;
use crate::errors::{RowError, RowResult};

/// Global default connection slot
static DEFAULT_CONNECTION: RwLock<Option<Connection>> = RwLock::new(None);

/// Install `conn` as the default connection, replacing any previous one
pub fn set_connection(conn: Connection) {
    let mut slot = DEFAULT_CONNECTION
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    if slot.is_some() {
        debug!("Replacing default {} connection", conn.backend_name());
    } else {
        info!("Default {} connection configured", conn.backend_name());
    }
    *slot = Some(conn);
}

/// Get the default connection
pub fn get_connection() -> RowResult<Connection> {
    DEFAULT_CONNECTION
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
        .ok_or(RowError::DefaultConnectionNotSet)
}

/// Return the slot to its unset state
pub fn clear_connection() {
    DEFAULT_CONNECTION
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
}

/// Use `conn` if given, otherwise the default connection
pub(crate) fn resolve_connection(conn: Option<Connection>) -> RowResult<Connection> {
    match conn {
        Some(conn) => Ok(conn),
        None => get_connection(),
    }
}

//! Centralized error handling for active-row
//!
//! # Usage
//!
//! ```rust
//! use active_row::errors::{RowError, RowResult};
//!
//! fn example_function() -> RowResult<()> {
//!     Err(RowError::DefaultConnectionNotSet)
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using RowError
pub type RowResult<T> = Result<T, RowError>;

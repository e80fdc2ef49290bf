//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Each submodule pairs the `Queryable` row
//! for a table with its `Insertable` counterpart and a conversion into the
//! validated domain type.

use std::fmt;

use tracing::warn;

mod account_rows;
mod content_rows;
mod engagement_rows;
mod social_rows;

pub(crate) use account_rows::*;
pub(crate) use content_rows::*;
pub(crate) use engagement_rows::*;
pub(crate) use social_rows::*;

/// A stored value failed domain validation on the way out.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("stored {table} row is invalid: {message}")]
pub(crate) struct RowConversionError {
    pub table: &'static str,
    pub message: String,
}

impl RowConversionError {
    pub(crate) fn new(table: &'static str, error: impl fmt::Display) -> Self {
        let message = error.to_string();
        warn!(table, %message, "unexpected stored value");
        Self { table, message }
    }
}

/// Convert a non-negative counter column.
pub(crate) fn count_from_column(table: &'static str, value: i64) -> Result<u64, RowConversionError> {
    u64::try_from(value).map_err(|err| RowConversionError::new(table, err))
}

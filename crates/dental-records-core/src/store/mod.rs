//! Record store seam.
//!
//! Every persistent operation the application performs is one call on a
//! [`RecordStore`]. Two implementations exist:
//!
//! - [`RestStore`]: the hosted `users` table over its PostgREST HTTP API
//! - [`Database`](crate::db::Database): a local SQLite file with the same
//!   table layout

mod rest;
mod sqlite;

pub use rest::*;

use thiserror::Error;

use crate::db::DbError;
use crate::models::{NewVisit, RecordId, VisitField, VisitFields, VisitRecord};

/// Store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Record store is not reachable at {0}")]
    Connection(String),

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("Record store returned error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("Malformed store response: {0}")]
    Decode(String),

    #[error("No record with id {0}")]
    NotFound(RecordId),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The table of visit records.
pub trait RecordStore {
    /// Insert one row; returns it with the store-assigned id.
    fn insert(&self, visit: &NewVisit) -> StoreResult<VisitRecord>;

    /// Every row, in insertion order.
    fn select_all(&self) -> StoreResult<Vec<VisitRecord>>;

    /// One column of every row, in insertion order, `NULL` as empty.
    fn select_column(&self, field: VisitField) -> StoreResult<Vec<String>>;

    /// Overwrite the user fields of one row.
    fn update(&self, id: RecordId, fields: &VisitFields) -> StoreResult<()>;

    /// Remove one row.
    fn delete(&self, id: RecordId) -> StoreResult<()>;
}

//! Data models for the introspection gateway.
//!
//! This module re-exports all model types used throughout the application.

pub mod result;
pub mod schema;

// Re-export commonly used types
pub use result::{
    ColumnDescriptor, DEFAULT_QUERY_ROWS, DEFAULT_SAMPLE_ROWS, MAX_ROW_LIMIT, QUERY_TIMEOUT_SECS,
    ResultRow, TabularResult, clamp_row_limit,
};
pub use schema::{ColumnInfo, ParameterInfo, StoredProcedureInfo, TableIdentifier, TableSchema};

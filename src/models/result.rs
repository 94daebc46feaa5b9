//! The universal tabular result shape.
//!
//! Both sample-data and ad-hoc-query operations return a `TabularResult`:
//! ordered column descriptors, ordered rows as name/value maps, and the row
//! count. Type names are the engine's own and are deliberately not
//! normalized across dialects.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Default row cap for `get_sample_data`.
pub const DEFAULT_SAMPLE_ROWS: u32 = 5;

/// Default row cap for `execute_query`.
pub const DEFAULT_QUERY_ROWS: u32 = 100;

/// Upper bound on any caller-supplied row cap.
pub const MAX_ROW_LIMIT: u32 = 10000;

/// Command timeout for ad-hoc query execution, in seconds.
pub const QUERY_TIMEOUT_SECS: u64 = 30;

/// One result column: name plus the driver-reported type name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Rows keyed by column name, with engine NULLs mapped to JSON null.
pub type ResultRow = serde_json::Map<String, JsonValue>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabularResult {
    pub columns: Vec<ColumnDescriptor>,
    pub rows: Vec<ResultRow>,
    pub row_count: usize,
}

impl TabularResult {
    /// Assemble a result; `row_count` is always the number of rows present.
    pub fn new(columns: Vec<ColumnDescriptor>, rows: Vec<ResultRow>) -> Self {
        let row_count = rows.len();
        Self {
            columns,
            rows,
            row_count,
        }
    }

    /// An empty result set (no columns are reported when no rows came back).
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            row_count: 0,
        }
    }
}

/// Clamp a caller-supplied row cap to the allowed ceiling. Zero is a valid
/// cap and returns zero rows.
pub fn clamp_row_limit(max_rows: u32) -> u32 {
    max_rows.min(MAX_ROW_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_column_descriptor_serializes_type_key() {
        let col = ColumnDescriptor::new("x", "int4");
        let json = serde_json::to_value(&col).unwrap();
        assert_eq!(json["name"], "x");
        assert_eq!(json["type"], "int4");
    }

    #[test]
    fn test_row_count_matches_rows() {
        let mut row = ResultRow::new();
        row.insert("x".to_string(), json!(1));
        let result = TabularResult::new(vec![ColumnDescriptor::new("x", "int4")], vec![row]);
        assert_eq!(result.row_count, 1);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["row_count"], 1);
        assert_eq!(json["rows"][0]["x"], 1);
        assert_eq!(json["columns"][0]["name"], "x");
    }

    #[test]
    fn test_empty_result() {
        let result = TabularResult::empty();
        assert_eq!(result.row_count, 0);
        assert!(result.columns.is_empty());
        assert!(result.rows.is_empty());
    }

    #[test]
    fn test_clamp_row_limit() {
        assert_eq!(clamp_row_limit(0), 0);
        assert_eq!(clamp_row_limit(5), 5);
        assert_eq!(clamp_row_limit(MAX_ROW_LIMIT + 1), MAX_ROW_LIMIT);
    }

    #[test]
    fn test_null_cell_serializes_to_json_null() {
        let mut row = ResultRow::new();
        row.insert("v".to_string(), JsonValue::Null);
        let result = TabularResult::new(vec![ColumnDescriptor::new("v", "text")], vec![row]);
        let json = serde_json::to_value(&result).unwrap();
        assert!(json["rows"][0]["v"].is_null());
    }
}

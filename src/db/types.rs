//! Driver-native rows to the universal tabular shape.
//!
//! Type conversion uses a two-phase approach: `TypeCategory` classifies the
//! driver-reported type name, then an engine-specific decoder extracts the
//! value. Column type names are passed through exactly as the driver reports
//! them; they are not normalized across engines.

use crate::models::{ColumnDescriptor, ResultRow, TabularResult};
use serde_json::Value as JsonValue;
use sqlx::postgres::{PgRow, PgTypeInfo, PgValueRef};
use sqlx::{Column, Decode, Row, Type, TypeInfo};
use tiberius::ColumnData;

// =============================================================================
// Type Classification
// =============================================================================

/// Logical category for Postgres column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Integer,
    Float,
    Decimal,
    Boolean,
    Text,
    Binary,
    Json,
    Uuid,
    Timestamp,
    Date,
    Time,
    Unknown,
}

/// Classify a Postgres type name into a logical category.
pub fn categorize_pg_type(type_name: &str) -> TypeCategory {
    let lower = type_name.to_lowercase();

    if lower.contains("decimal") || lower.contains("numeric") {
        return TypeCategory::Decimal;
    }
    if lower.contains("int") || lower.contains("serial") {
        return TypeCategory::Integer;
    }
    if lower == "bool" || lower == "boolean" {
        return TypeCategory::Boolean;
    }
    if lower.contains("float")
        || lower.contains("double")
        || lower == "real"
        || lower == "float4"
        || lower == "float8"
    {
        return TypeCategory::Float;
    }
    if lower == "json" || lower == "jsonb" {
        return TypeCategory::Json;
    }
    if lower == "uuid" {
        return TypeCategory::Uuid;
    }
    if lower.starts_with("timestamp") {
        return TypeCategory::Timestamp;
    }
    if lower == "date" {
        return TypeCategory::Date;
    }
    if lower == "time" || lower == "timetz" {
        return TypeCategory::Time;
    }
    if lower == "bytea" || lower.contains("binary") {
        return TypeCategory::Binary;
    }
    if lower.contains("char") || lower == "text" || lower == "name" {
        return TypeCategory::Text;
    }

    TypeCategory::Unknown
}

/// Encode binary data as base64 text.
pub fn encode_binary_value(bytes: &[u8]) -> JsonValue {
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    JsonValue::String(STANDARD.encode(bytes))
}

// =============================================================================
// Decimal Type Support
// =============================================================================

/// Wrapper type for raw NUMERIC/DECIMAL values as strings, preserving the
/// exact database representation.
#[derive(Debug)]
pub struct RawDecimal(pub String);

impl Type<sqlx::Postgres> for RawDecimal {
    fn type_info() -> PgTypeInfo {
        <String as Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        let name = ty.name().to_lowercase();
        name.contains("numeric") || name.contains("decimal")
    }
}

impl<'r> Decode<'r, sqlx::Postgres> for RawDecimal {
    fn decode(value: PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as Decode<sqlx::Postgres>>::decode(value)?;
        Ok(RawDecimal(s.to_string()))
    }
}

// =============================================================================
// PostgreSQL
// =============================================================================

/// Convert a page of Postgres rows into a `TabularResult`.
///
/// Column metadata comes from the first row; an empty page reports no
/// columns, matching the empty result shape.
pub fn shape_pg_rows(rows: &[PgRow]) -> TabularResult {
    let Some(first) = rows.first() else {
        return TabularResult::empty();
    };

    let columns: Vec<ColumnDescriptor> = first
        .columns()
        .iter()
        .map(|col| ColumnDescriptor::new(col.name(), col.type_info().name()))
        .collect();

    let shaped: Vec<ResultRow> = rows.iter().map(pg_row_to_map).collect();
    TabularResult::new(columns, shaped)
}

/// Convert one Postgres row to a column-name/value map.
pub fn pg_row_to_map(row: &PgRow) -> ResultRow {
    row.columns()
        .iter()
        .enumerate()
        .map(|(idx, col)| {
            let category = categorize_pg_type(col.type_info().name());
            (col.name().to_string(), decode_pg_column(row, idx, category))
        })
        .collect()
}

fn decode_pg_column(row: &PgRow, idx: usize, category: TypeCategory) -> JsonValue {
    match category {
        TypeCategory::Decimal => decode_pg_decimal(row, idx),
        TypeCategory::Integer => decode_pg_integer(row, idx),
        TypeCategory::Boolean => row
            .try_get::<Option<bool>, _>(idx)
            .ok()
            .flatten()
            .map(JsonValue::Bool)
            .unwrap_or(JsonValue::Null),
        TypeCategory::Float => decode_pg_float(row, idx),
        TypeCategory::Binary => row
            .try_get::<Option<Vec<u8>>, _>(idx)
            .ok()
            .flatten()
            .map(|v| encode_binary_value(&v))
            .unwrap_or(JsonValue::Null),
        TypeCategory::Json => row
            .try_get::<Option<JsonValue>, _>(idx)
            .ok()
            .flatten()
            .unwrap_or(JsonValue::Null),
        TypeCategory::Uuid => row
            .try_get::<Option<uuid::Uuid>, _>(idx)
            .ok()
            .flatten()
            .map(|u| JsonValue::String(u.to_string()))
            .unwrap_or(JsonValue::Null),
        TypeCategory::Timestamp => decode_pg_timestamp(row, idx),
        TypeCategory::Date => row
            .try_get::<Option<chrono::NaiveDate>, _>(idx)
            .ok()
            .flatten()
            .map(|d| JsonValue::String(d.format("%Y-%m-%d").to_string()))
            .unwrap_or(JsonValue::Null),
        TypeCategory::Time => row
            .try_get::<Option<chrono::NaiveTime>, _>(idx)
            .ok()
            .flatten()
            .map(|t| JsonValue::String(t.format("%H:%M:%S%.f").to_string()))
            .unwrap_or(JsonValue::Null),
        TypeCategory::Text | TypeCategory::Unknown => row
            .try_get::<Option<String>, _>(idx)
            .ok()
            .flatten()
            .map(JsonValue::String)
            .unwrap_or(JsonValue::Null),
    }
}

fn decode_pg_integer(row: &PgRow, idx: usize) -> JsonValue {
    if let Ok(Some(v)) = row.try_get::<Option<i16>, _>(idx) {
        return JsonValue::Number(v.into());
    }
    if let Ok(Some(v)) = row.try_get::<Option<i32>, _>(idx) {
        return JsonValue::Number(v.into());
    }
    if let Ok(Some(v)) = row.try_get::<Option<i64>, _>(idx) {
        return JsonValue::Number(v.into());
    }
    JsonValue::Null
}

fn decode_pg_float(row: &PgRow, idx: usize) -> JsonValue {
    if let Ok(Some(v)) = row.try_get::<Option<f64>, _>(idx) {
        return serde_json::Number::from_f64(v)
            .map(JsonValue::Number)
            .unwrap_or_else(|| JsonValue::String(v.to_string()));
    }
    if let Ok(Some(v)) = row.try_get::<Option<f32>, _>(idx) {
        return serde_json::Number::from_f64(v as f64)
            .map(JsonValue::Number)
            .unwrap_or_else(|| JsonValue::String(v.to_string()));
    }
    JsonValue::Null
}

/// NUMERIC is preserved as its exact textual representation.
fn decode_pg_decimal(row: &PgRow, idx: usize) -> JsonValue {
    match row.try_get::<Option<RawDecimal>, _>(idx) {
        Ok(Some(v)) => JsonValue::String(v.0),
        Ok(None) => JsonValue::Null,
        Err(e) => {
            tracing::error!("Failed to decode NUMERIC: {:?}", e);
            JsonValue::Null
        }
    }
}

fn decode_pg_timestamp(row: &PgRow, idx: usize) -> JsonValue {
    if let Ok(Some(v)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(idx) {
        return JsonValue::String(v.to_rfc3339());
    }
    if let Ok(Some(v)) = row.try_get::<Option<chrono::NaiveDateTime>, _>(idx) {
        return JsonValue::String(v.format("%Y-%m-%d %H:%M:%S%.f").to_string());
    }
    JsonValue::Null
}

// =============================================================================
// SQL Server
// =============================================================================

/// Convert a page of tiberius rows into a `TabularResult`.
pub fn shape_mssql_rows(rows: &[tiberius::Row]) -> TabularResult {
    let Some(first) = rows.first() else {
        return TabularResult::empty();
    };

    let columns: Vec<ColumnDescriptor> = first
        .columns()
        .iter()
        .map(|col| ColumnDescriptor::new(col.name(), format!("{:?}", col.column_type())))
        .collect();

    let shaped: Vec<ResultRow> = rows.iter().map(mssql_row_to_map).collect();
    TabularResult::new(columns, shaped)
}

/// Convert one tiberius row to a column-name/value map.
pub fn mssql_row_to_map(row: &tiberius::Row) -> ResultRow {
    row.cells()
        .enumerate()
        .map(|(idx, (col, data))| {
            (col.name().to_string(), decode_mssql_cell(row, idx, data))
        })
        .collect()
}

fn decode_mssql_cell(row: &tiberius::Row, idx: usize, data: &ColumnData<'_>) -> JsonValue {
    match data {
        ColumnData::Bit(Some(b)) => JsonValue::Bool(*b),
        ColumnData::U8(Some(v)) => JsonValue::Number((*v as i64).into()),
        ColumnData::I16(Some(v)) => JsonValue::Number((*v as i64).into()),
        ColumnData::I32(Some(v)) => JsonValue::Number((*v as i64).into()),
        ColumnData::I64(Some(v)) => JsonValue::Number((*v).into()),
        ColumnData::F32(Some(v)) => serde_json::Number::from_f64(*v as f64)
            .map(JsonValue::Number)
            .unwrap_or_else(|| JsonValue::String(v.to_string())),
        ColumnData::F64(Some(v)) => serde_json::Number::from_f64(*v)
            .map(JsonValue::Number)
            .unwrap_or_else(|| JsonValue::String(v.to_string())),
        // Exact textual representation, like Postgres NUMERIC
        ColumnData::Numeric(Some(n)) => JsonValue::String(n.to_string()),
        ColumnData::String(Some(s)) => JsonValue::String(s.to_string()),
        ColumnData::Guid(Some(g)) => JsonValue::String(g.to_string()),
        ColumnData::Binary(Some(b)) => encode_binary_value(b),
        ColumnData::Xml(Some(xml)) => JsonValue::String(xml.to_string()),
        // Date/time types go through chrono via typed getters
        ColumnData::DateTime(Some(_))
        | ColumnData::SmallDateTime(Some(_))
        | ColumnData::DateTime2(Some(_)) => row
            .try_get::<chrono::NaiveDateTime, _>(idx)
            .ok()
            .flatten()
            .map(|dt| JsonValue::String(dt.format("%Y-%m-%d %H:%M:%S%.f").to_string()))
            .unwrap_or(JsonValue::Null),
        ColumnData::DateTimeOffset(Some(_)) => row
            .try_get::<chrono::DateTime<chrono::Utc>, _>(idx)
            .ok()
            .flatten()
            .map(|dt| JsonValue::String(dt.to_rfc3339()))
            .unwrap_or(JsonValue::Null),
        ColumnData::Date(Some(_)) => row
            .try_get::<chrono::NaiveDate, _>(idx)
            .ok()
            .flatten()
            .map(|d| JsonValue::String(d.format("%Y-%m-%d").to_string()))
            .unwrap_or(JsonValue::Null),
        ColumnData::Time(Some(_)) => row
            .try_get::<chrono::NaiveTime, _>(idx)
            .ok()
            .flatten()
            .map(|t| JsonValue::String(t.format("%H:%M:%S%.f").to_string()))
            .unwrap_or(JsonValue::Null),
        // All None variants map to JSON null
        _ => JsonValue::Null,
    }
}

//! Schema-related data models.
//!
//! Everything here is request-scoped: built fresh per tool call, serialized,
//! and discarded. There is no cross-request cache.

use crate::error::{GatewayError, GatewayResult};
use serde::{Deserialize, Serialize};

/// Characters that could break out of identifier quoting when a parsed
/// identifier is embedded into SQL text. Identifiers cannot be bound as
/// query parameters, so these are rejected up front.
const FORBIDDEN_IDENTIFIER_CHARS: &[char] = &['[', ']', '"', '`', '\'', ';'];

/// A parsed `schema.table` pair.
///
/// Bare table names take the dialect's default schema. The input is split on
/// the first `.` only; table names containing a literal `.` are unsupported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableIdentifier {
    pub schema: String,
    pub name: String,
}

impl TableIdentifier {
    /// Parse a `"schema.table"` or bare `"table"` string.
    pub fn parse(input: &str, default_schema: &str) -> GatewayResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(GatewayError::validation("table name must not be empty"));
        }

        let (schema, name) = match trimmed.split_once('.') {
            Some((schema, name)) => (schema, name),
            None => (default_schema, trimmed),
        };

        if schema.is_empty() || name.is_empty() {
            return Err(GatewayError::validation(format!(
                "invalid table identifier: '{}'",
                input
            )));
        }

        for part in [schema, name] {
            if part.contains(FORBIDDEN_IDENTIFIER_CHARS) {
                return Err(GatewayError::validation(format!(
                    "table identifier '{}' contains a quoting delimiter",
                    input
                )));
            }
        }

        Ok(Self {
            schema: schema.to_string(),
            name: name.to_string(),
        })
    }

    /// The canonical `schema.table` form. Re-parsing this yields the same pair.
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }
}

impl std::fmt::Display for TableIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.qualified())
    }
}

/// Column metadata for a single table, in ordinal position order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSchema {
    pub table_name: String,
    pub schema_name: String,
    pub columns: Vec<ColumnInfo>,
}

impl TableSchema {
    /// Create an empty schema for the given identifier.
    pub fn new(identifier: &TableIdentifier) -> Self {
        Self {
            table_name: identifier.name.clone(),
            schema_name: identifier.schema.clone(),
            columns: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
    pub column_name: String,
    pub data_type: String,
    pub is_nullable: bool,
    pub is_primary_key: bool,
    pub is_foreign_key: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A stored routine (procedure or function, per engine convention).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredProcedureInfo {
    pub name: String,
    pub schema_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    /// Parameter introspection is not implemented by either adapter yet;
    /// the field is kept so the output shape is stable when it lands.
    #[serde(default)]
    pub parameters: Vec<ParameterInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterInfo {
    pub name: String,
    pub data_type: String,
    pub is_output: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<i32>,
}

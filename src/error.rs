//! Error types for the introspection gateway.
//!
//! All errors are defined with `thiserror` and stay local to a single tool
//! call: nothing here is retried and nothing crashes the dispatch loop. The
//! dispatch boundary renders every variant as a human-readable error result.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    /// A required parameter is missing or empty. Raised at the dispatch
    /// boundary, never reaches the database.
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// An ad-hoc query was rejected by the safety filter.
    #[error("Query contains potentially unsafe operations: {message}")]
    UnsafeQuery { message: String },

    #[error("Connection failed: {message}")]
    Connection { message: String },

    /// Execution or syntax failure, including command timeouts.
    #[error("Query failed: {message}")]
    Query {
        message: String,
        /// e.g., "42P01" for undefined table
        sql_state: Option<String>,
    },

    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl GatewayError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create an unsafe query error.
    pub fn unsafe_query(message: impl Into<String>) -> Self {
        Self::UnsafeQuery {
            message: message.into(),
        }
    }

    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error without an SQLSTATE code.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
            sql_state: None,
        }
    }

    /// Create a query error carrying the engine's SQLSTATE code.
    pub fn query_with_state(message: impl Into<String>, sql_state: Option<String>) -> Self {
        Self::Query {
            message: message.into(),
            sql_state,
        }
    }

    /// Create an unknown tool error.
    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Self::UnknownTool { name: name.into() }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a query error for an operation that exceeded its timeout.
    pub fn timeout(operation: impl Into<String>, elapsed_secs: u64) -> Self {
        Self::Query {
            message: format!("{} exceeded {}s timeout", operation.into(), elapsed_secs),
            sql_state: None,
        }
    }
}

/// Convert sqlx errors to GatewayError.
impl From<sqlx::Error> for GatewayError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(msg) => GatewayError::connection(msg.to_string()),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                GatewayError::query_with_state(db_err.message().to_string(), code)
            }
            sqlx::Error::Io(io_err) => GatewayError::connection(format!("I/O error: {}", io_err)),
            sqlx::Error::Tls(tls_err) => {
                GatewayError::connection(format!("TLS error: {}", tls_err))
            }
            sqlx::Error::Protocol(msg) => {
                GatewayError::connection(format!("Protocol error: {}", msg))
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                GatewayError::connection("Connection unavailable")
            }
            sqlx::Error::RowNotFound => GatewayError::query("No rows returned"),
            sqlx::Error::ColumnNotFound(col) => {
                GatewayError::internal(format!("Column not found: {}", col))
            }
            sqlx::Error::ColumnIndexOutOfBounds { index, len } => GatewayError::internal(format!(
                "Column index {} out of bounds (len: {})",
                index, len
            )),
            sqlx::Error::ColumnDecode { index, source } => {
                GatewayError::internal(format!("Failed to decode column {}: {}", index, source))
            }
            sqlx::Error::Decode(source) => {
                GatewayError::internal(format!("Decode error: {}", source))
            }
            _ => GatewayError::internal(format!("Unknown database error: {}", err)),
        }
    }
}

/// Convert tiberius errors to GatewayError.
impl From<tiberius::error::Error> for GatewayError {
    fn from(err: tiberius::error::Error) -> Self {
        use tiberius::error::Error;
        match err {
            Error::Io { .. } => GatewayError::connection(format!("I/O error: {}", err)),
            Error::Tls(msg) => GatewayError::connection(format!("TLS error: {}", msg)),
            Error::Routing { host, port } => {
                GatewayError::connection(format!("Server requested routing to {}:{}", host, port))
            }
            Error::Server(token) => {
                let code = token.code();
                GatewayError::query_with_state(token.message().to_string(), Some(code.to_string()))
            }
            other => GatewayError::query(other.to_string()),
        }
    }
}

/// Result type alias for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display() {
        let err = GatewayError::validation("table_name parameter is required");
        assert!(err.to_string().contains("table_name parameter is required"));
        assert!(err.to_string().starts_with("Invalid input"));
    }

    #[test]
    fn test_unsafe_query_display_mentions_unsafe() {
        let err = GatewayError::unsafe_query("detected keyword DELETE");
        assert!(err.to_string().contains("unsafe"));
    }

    #[test]
    fn test_unknown_tool_display_includes_name() {
        let err = GatewayError::unknown_tool("drop_everything");
        assert_eq!(err.to_string(), "Unknown tool: drop_everything");
    }

    #[test]
    fn test_timeout_becomes_query_error() {
        let err = GatewayError::timeout("execute_query", 30);
        assert!(matches!(err, GatewayError::Query { .. }));
        assert!(err.to_string().contains("30s"));
    }

    #[test]
    fn test_sqlx_io_error_maps_to_connection() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err: GatewayError = sqlx::Error::Io(io).into();
        assert!(matches!(err, GatewayError::Connection { .. }));
    }

    #[test]
    fn test_sqlx_row_not_found_maps_to_query() {
        let err: GatewayError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, GatewayError::Query { .. }));
    }

    #[test]
    fn test_query_with_state_keeps_code() {
        let err = GatewayError::query_with_state("syntax error", Some("42601".to_string()));
        match err {
            GatewayError::Query { sql_state, .. } => {
                assert_eq!(sql_state.as_deref(), Some("42601"))
            }
            _ => panic!("expected Query variant"),
        }
    }
}

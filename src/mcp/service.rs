//! MCP service implementation using rmcp.
//!
//! `GatewayService` exposes the five introspection tools over the MCP
//! protocol. Tool dispatch is implemented by hand rather than through the
//! router macros so that every failure surfaces as a tool error result the
//! client can read: invalid arguments, rejected queries, unknown tool names,
//! and database errors all come back as `CallToolResult::error`, never as a
//! protocol-level fault.

use crate::db::Introspector;
use crate::error::{GatewayError, GatewayResult};
use crate::models::{DEFAULT_QUERY_ROWS, DEFAULT_SAMPLE_ROWS};
use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    model::{
        CallToolRequestParam, CallToolResult, Content, Implementation, JsonObject,
        ListToolsResult, PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo,
        Tool,
    },
    service::RequestContext,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Clone)]
pub struct GatewayService {
    introspector: Arc<Introspector>,
}

impl GatewayService {
    pub fn new(introspector: Arc<Introspector>) -> Self {
        Self { introspector }
    }

    /// Dispatch one tool call by name.
    ///
    /// Infallible at the protocol level: every failure is rendered into the
    /// returned `CallToolResult` so the client sees the message.
    pub async fn dispatch(&self, name: &str, arguments: Option<JsonObject>) -> CallToolResult {
        let args = arguments.unwrap_or_default();
        info!(tool = name, "Tool call received");

        let outcome = match name {
            "list_tables" => self.list_tables().await,
            "get_table_schema" => self.get_table_schema(&args).await,
            "get_sample_data" => self.get_sample_data(&args).await,
            "list_stored_procedures" => self.list_stored_procedures().await,
            "execute_query" => self.execute_query(&args).await,
            other => Err(GatewayError::unknown_tool(other)),
        };

        match outcome {
            Ok(value) => serialize_response(&value),
            Err(e) => {
                error!(
                    tool = name,
                    input = offending_input(&args).unwrap_or(""),
                    error = %e,
                    "Tool call failed"
                );
                CallToolResult::error(vec![Content::text(e.to_string())])
            }
        }
    }

    async fn list_tables(&self) -> GatewayResult<serde_json::Value> {
        let tables = self.introspector.get_tables().await?;
        Ok(json!({
            "tables": tables,
            "count": tables.len(),
        }))
    }

    async fn get_table_schema(&self, args: &JsonObject) -> GatewayResult<serde_json::Value> {
        let table_name = required_str(args, "table_name")?;
        let schema = self.introspector.get_table_schema(&table_name).await?;
        serde_json::to_value(schema).map_err(|e| GatewayError::internal(e.to_string()))
    }

    async fn get_sample_data(&self, args: &JsonObject) -> GatewayResult<serde_json::Value> {
        let table_name = required_str(args, "table_name")?;
        let max_rows = optional_u32(args, "max_rows", DEFAULT_SAMPLE_ROWS)?;
        let result = self
            .introspector
            .get_sample_data(&table_name, max_rows)
            .await?;
        serde_json::to_value(result).map_err(|e| GatewayError::internal(e.to_string()))
    }

    async fn list_stored_procedures(&self) -> GatewayResult<serde_json::Value> {
        let procedures = self.introspector.get_stored_procedures().await?;
        Ok(json!({
            "stored_procedures": procedures,
            "count": procedures.len(),
        }))
    }

    async fn execute_query(&self, args: &JsonObject) -> GatewayResult<serde_json::Value> {
        let query = required_str(args, "query")?;
        let max_rows = optional_u32(args, "max_rows", DEFAULT_QUERY_ROWS)?;
        let result = self.introspector.execute_query(&query, max_rows).await?;
        serde_json::to_value(result).map_err(|e| GatewayError::internal(e.to_string()))
    }
}

/// The query or table text a failed call was operating on, for the error
/// log. Tools without either argument log nothing extra.
fn offending_input(args: &JsonObject) -> Option<&str> {
    args.get("query")
        .or_else(|| args.get("table_name"))
        .and_then(|v| v.as_str())
}

/// Extract a required non-empty string argument.
fn required_str(args: &JsonObject, key: &str) -> GatewayResult<String> {
    match args.get(key) {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        Some(serde_json::Value::String(_)) => Err(GatewayError::validation(format!(
            "parameter '{}' must not be empty",
            key
        ))),
        Some(_) => Err(GatewayError::validation(format!(
            "parameter '{}' must be a string",
            key
        ))),
        None => Err(GatewayError::validation(format!(
            "missing required parameter '{}'",
            key
        ))),
    }
}

/// Extract an optional non-negative integer argument, falling back to a
/// default. Zero is accepted; negative numbers and fractions are not.
fn optional_u32(args: &JsonObject, key: &str, default: u32) -> GatewayResult<u32> {
    match args.get(key) {
        None | Some(serde_json::Value::Null) => Ok(default),
        Some(value) => value
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| {
                GatewayError::validation(format!(
                    "parameter '{}' must be a non-negative integer",
                    key
                ))
            }),
    }
}

/// Serialize a JSON value to pretty-printed text and wrap it in a successful
/// CallToolResult. Falls back to an error result on serialization failure.
fn serialize_response(value: &serde_json::Value) -> CallToolResult {
    match serde_json::to_string_pretty(value) {
        Ok(s) => CallToolResult::success(vec![Content::text(s)]),
        Err(e) => {
            error!(error = %e, "Failed to serialize tool response");
            CallToolResult::error(vec![Content::text(format!(
                "Internal error: failed to serialize response: {}",
                e
            ))])
        }
    }
}

// Tool input schemas, defined at module level to keep list_tools() concise.

fn empty_schema() -> Arc<JsonObject> {
    Arc::new(rmcp::model::object(json!({
        "type": "object",
        "properties": {},
        "required": []
    })))
}

fn table_schema_schema() -> Arc<JsonObject> {
    Arc::new(rmcp::model::object(json!({
        "type": "object",
        "properties": {
            "table_name": {
                "type": "string",
                "description": "Table name, optionally schema-qualified (e.g. 'dbo.Orders' or 'orders')"
            }
        },
        "required": ["table_name"]
    })))
}

fn sample_data_schema() -> Arc<JsonObject> {
    Arc::new(rmcp::model::object(json!({
        "type": "object",
        "properties": {
            "table_name": {
                "type": "string",
                "description": "Table name, optionally schema-qualified (e.g. 'dbo.Orders' or 'orders')"
            },
            "max_rows": {
                "type": "integer",
                "description": "Maximum number of rows to return (default: 5)"
            }
        },
        "required": ["table_name"]
    })))
}

fn execute_query_schema() -> Arc<JsonObject> {
    Arc::new(rmcp::model::object(json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": "The SELECT statement to execute"
            },
            "max_rows": {
                "type": "integer",
                "description": "Maximum number of rows to return (default: 100)"
            }
        },
        "required": ["query"]
    })))
}

impl ServerHandler for GatewayService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "db-introspect-mcp".to_string(),
                title: Some("Database Introspection Gateway".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Read-only gateway for inspecting SQL Server and PostgreSQL databases. \
                 Use list_tables and get_table_schema to explore the database structure, \
                 get_sample_data to preview table contents, and execute_query to run \
                 read-only SELECT statements."
                    .to_string(),
            ),
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        async move { Ok(list_tools_result()) }
    }

    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        async move { Ok(self.dispatch(&request.name, request.arguments).await) }
    }
}

/// The five tools exposed by the gateway.
pub fn list_tools_result() -> ListToolsResult {
    let list_tables = Tool::new(
        "list_tables",
        "List all user tables in the connected database as schema-qualified names.",
        empty_schema(),
    );
    let get_table_schema = Tool::new(
        "get_table_schema",
        concat!(
            "Get the structure of a table: columns with data types, nullability, ",
            "primary/foreign key membership, maximum lengths, and defaults. ",
            "Unqualified names resolve against the engine's default schema.",
        ),
        table_schema_schema(),
    );
    let get_sample_data = Tool::new(
        "get_sample_data",
        "Fetch the first rows of a table (default: 5) to preview its contents.",
        sample_data_schema(),
    );
    let list_stored_procedures = Tool::new(
        "list_stored_procedures",
        "List stored procedures in the connected database with their definitions where available.",
        empty_schema(),
    );
    let execute_query = Tool::new(
        "execute_query",
        concat!(
            "Execute a read-only SELECT statement and return columns, rows, and row_count. ",
            "Results are capped at max_rows (default: 100). ",
            "Statements containing data-modifying keywords are rejected.",
        ),
        execute_query_schema(),
    );

    ListToolsResult {
        meta: None,
        tools: vec![
            list_tables,
            get_table_schema,
            get_sample_data,
            list_stored_procedures,
            execute_query,
        ],
        next_cursor: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(value: serde_json::Value) -> JsonObject {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_required_str_present() {
        let a = args(json!({"table_name": "orders"}));
        assert_eq!(required_str(&a, "table_name").unwrap(), "orders");
    }

    #[test]
    fn test_required_str_missing_or_empty() {
        let a = args(json!({}));
        assert!(required_str(&a, "table_name").is_err());

        let a = args(json!({"table_name": "   "}));
        assert!(required_str(&a, "table_name").is_err());
    }

    #[test]
    fn test_required_str_wrong_type() {
        let a = args(json!({"table_name": 42}));
        let err = required_str(&a, "table_name").unwrap_err();
        assert!(err.to_string().contains("must be a string"));
    }

    #[test]
    fn test_optional_u32_defaults_and_zero() {
        let a = args(json!({}));
        assert_eq!(optional_u32(&a, "max_rows", 5).unwrap(), 5);

        let a = args(json!({"max_rows": null}));
        assert_eq!(optional_u32(&a, "max_rows", 5).unwrap(), 5);

        let a = args(json!({"max_rows": 0}));
        assert_eq!(optional_u32(&a, "max_rows", 5).unwrap(), 0);
    }

    #[test]
    fn test_optional_u32_rejects_negative_and_fractional() {
        let a = args(json!({"max_rows": -1}));
        assert!(optional_u32(&a, "max_rows", 5).is_err());

        let a = args(json!({"max_rows": 2.5}));
        assert!(optional_u32(&a, "max_rows", 5).is_err());

        let a = args(json!({"max_rows": "ten"}));
        assert!(optional_u32(&a, "max_rows", 5).is_err());
    }

    #[test]
    fn test_offending_input_prefers_query_then_table_name() {
        let a = args(json!({"query": "SELECT 1", "table_name": "orders"}));
        assert_eq!(offending_input(&a), Some("SELECT 1"));

        let a = args(json!({"table_name": "orders"}));
        assert_eq!(offending_input(&a), Some("orders"));

        let a = args(json!({}));
        assert_eq!(offending_input(&a), None);
    }

    #[test]
    fn test_list_tools_exposes_all_five() {
        let result = list_tools_result();
        let names: Vec<&str> = result.tools.iter().map(|t| t.name.as_ref()).collect();
        assert_eq!(
            names,
            vec![
                "list_tables",
                "get_table_schema",
                "get_sample_data",
                "list_stored_procedures",
                "execute_query"
            ]
        );
    }

    #[test]
    fn test_serialize_response_success() {
        let result = serialize_response(&json!({"tables": ["public.orders"]}));
        assert_ne!(result.is_error, Some(true));
    }
}

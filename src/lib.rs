//! Database Introspection MCP Gateway
//!
//! A read-only MCP (Model Context Protocol) server that lets AI assistants
//! inspect SQL Server and PostgreSQL databases: list tables, describe
//! schemas, preview data, enumerate stored procedures, and run denylist-
//! filtered SELECT queries.

pub mod config;
pub mod db;
pub mod error;
pub mod mcp;
pub mod models;
pub mod transport;

pub use config::Config;
pub use error::GatewayError;
pub use mcp::GatewayService;

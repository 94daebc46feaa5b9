//! MCP server integration module.
//!
//! Binds the introspection operations to the MCP protocol via rmcp.

pub mod service;

pub use service::GatewayService;

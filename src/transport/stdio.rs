//! Stdio transport for the MCP server.
//!
//! Reads JSON-RPC messages from stdin and writes responses to stdout,
//! the standard mode for CLI-based MCP integrations.

use crate::db::Introspector;
use crate::error::{GatewayError, GatewayResult};
use crate::mcp::GatewayService;
use crate::transport::Transport;
use rmcp::{ServiceExt, transport::stdio};
use std::sync::Arc;
use tokio::signal;
use tracing::info;

pub struct StdioTransport {
    introspector: Arc<Introspector>,
}

impl StdioTransport {
    pub fn new(introspector: Arc<Introspector>) -> Self {
        Self { introspector }
    }
}

impl Transport for StdioTransport {
    async fn run(&self) -> GatewayResult<()> {
        info!("Starting MCP server with stdio transport");

        let service = GatewayService::new(self.introspector.clone());

        let transport = stdio();
        let running_service = service.serve(transport).await.map_err(|e| {
            GatewayError::internal(format!("Failed to start stdio transport: {}", e))
        })?;

        let shutdown_requested = tokio::select! {
            result = running_service.waiting() => {
                match result {
                    Ok(_quit_reason) => {
                        info!("Stdio transport completed normally");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Stdio transport error");
                        return Err(GatewayError::internal(format!(
                            "Stdio transport error: {}",
                            e
                        )));
                    }
                }
                false
            }
            _ = wait_for_signal() => {
                info!("Shutdown signal received (send again to force exit)");
                true
            }
        };

        if shutdown_requested {
            // tokio::select! cannot interrupt a blocking stdin read, so a
            // second signal forces the exit
            tokio::spawn(async {
                wait_for_signal().await;
                tracing::warn!("Received second signal, forcing immediate exit");
                std::process::exit(1);
            });

            info!("Exiting process");
            std::process::exit(0);
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "stdio"
    }
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
async fn wait_for_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT");
        }
        _ = terminate => {
            info!("Received SIGTERM");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Connector;

    #[test]
    fn test_stdio_transport_creation() {
        let connector = Connector::from_url("postgres://u:p@localhost/db").unwrap();
        let transport = StdioTransport::new(Arc::new(Introspector::new(connector)));
        assert_eq!(transport.name(), "stdio");
    }
}

use rmcp::serve_server;
use rmcp::transport::io::stdio;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use toolhub::{McpServer, ToolHub};

use crate::error::{CliError, CliResult};
use crate::exit_codes::EXIT_WARNING;

/// Serve `hub` over stdio until ctrl-c
pub async fn run_server(hub: ToolHub) -> CliResult<()> {
    let hub = Arc::new(hub);
    tracing::info!(
        "Serving {} tools in {} mode",
        hub.registry().resolved_count(),
        hub.config().discovery_mode
    );
    let server = McpServer::new(hub);

    let ct = CancellationToken::new();
    let ct_clone = ct.clone();

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Shutdown signal received"),
            Err(e) => tracing::error!("Failed to listen for ctrl-c: {}", e),
        }
        ct_clone.cancel();
    });

    let running = serve_server(server, stdio())
        .await
        .map_err(|e| CliError::new(format!("MCP server error: {}", e), EXIT_WARNING))?;
    tracing::info!("MCP server started");

    tokio::select! {
        _ = ct.cancelled() => {
            tracing::info!("MCP server stopping");
        }
        quit = running.waiting() => {
            match quit {
                Ok(reason) => tracing::info!("MCP client disconnected: {:?}", reason),
                Err(e) => tracing::warn!("MCP service task failed: {}", e),
            }
        }
    }

    tracing::info!("MCP server exited successfully");
    Ok(())
}

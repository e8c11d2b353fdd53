//! Todoist MCP Server
//!
//! Exposes Todoist over MCP on stdio. Requires an API token in
//! `TODOIST_API_TOKEN` (or `~/.binks/todoist.toml`).

use rmcp::{transport::io::stdio, ServiceExt};
use todoist_mcp::{Config, TodoistMcpServer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mcp_common::init_tracing("todoist_mcp")?;

    let config = Config::load()?;
    if let Err(e) = config.validate() {
        tracing::error!("{}", e);
        std::process::exit(1);
    }

    tracing::info!("Starting Todoist MCP server");

    let server = TodoistMcpServer::from_config(&config)?;
    let service = server.serve(stdio()).await?;

    tracing::info!("Todoist MCP server running");

    service.waiting().await?;

    tracing::info!("Todoist MCP server stopped");

    Ok(())
}

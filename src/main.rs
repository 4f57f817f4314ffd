//! openHAB MCP Server - Main Entry Point
//!
//! Wires configuration, the REST client and the tool registry together and
//! serves tool invocations as newline-delimited JSON on stdio. The MCP
//! session/protocol layer proper is the embedding transport's job; this
//! binary is the seam it drives.

use clap::Parser;
use openhab_mcp_rust::client::{OpenHabClient, OpenHabHttpClient};
use openhab_mcp_rust::tools::{self, ToolContext, ToolResponse};
use openhab_mcp_rust::{Result, ServerConfig};
use serde::Deserialize;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// openHAB MCP Server Configuration
#[derive(Parser, Debug)]
#[command(name = "openhab-mcp-server")]
#[command(about = "openHAB MCP server: resource graph tools over the openHAB REST API")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// openHAB base URL
    #[arg(long, env = "OPENHAB_URL")]
    openhab_url: Option<String>,

    /// openHAB API token (bearer authentication)
    #[arg(long, env = "OPENHAB_API_TOKEN")]
    openhab_api_token: Option<String>,

    /// openHAB username (basic authentication)
    #[arg(long, env = "OPENHAB_USERNAME")]
    openhab_username: Option<String>,

    /// openHAB password (basic authentication)
    #[arg(long, env = "OPENHAB_PASSWORD")]
    openhab_password: Option<String>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

impl Cli {
    fn initialize_logging(&self) {
        let filter = if self.debug {
            EnvFilter::new("debug")
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
        };

        // Log to stderr; stdout carries tool responses
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }

    /// Environment-derived config with CLI flags overlaid
    fn build_config(&self) -> Result<ServerConfig> {
        let mut config = ServerConfig::from_env()?;

        if let Some(url) = &self.openhab_url {
            config.openhab.url = url
                .parse()
                .map_err(|e| openhab_mcp_rust::OpenHabError::config(format!("Invalid URL: {e}")))?;
        }
        if self.openhab_api_token.is_some() {
            config.openhab.api_token = self.openhab_api_token.clone();
        }
        if self.openhab_username.is_some() {
            config.openhab.username = self.openhab_username.clone();
        }
        if self.openhab_password.is_some() {
            config.openhab.password = self.openhab_password.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

/// One tool invocation read from stdin
#[derive(Debug, Deserialize)]
struct ToolRequest {
    tool: String,
    #[serde(default)]
    arguments: serde_json::Value,
}

async fn serve(context: ToolContext) -> anyhow::Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let mut lines = stdin.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<ToolRequest>(&line) {
            Ok(request) => tools::dispatch(&context, &request.tool, request.arguments).await,
            Err(e) => ToolResponse::error(format!("Malformed tool request: {e}")),
        };

        let mut payload = serde_json::to_vec(&response)?;
        payload.push(b'\n');
        stdout.write_all(&payload).await?;
        stdout.flush().await?;
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli.initialize_logging();

    let config = cli.build_config()?;
    if config.openhab.api_token.is_none() && config.openhab.username.is_none() {
        warn!("No authentication credentials configured; expecting an open openHAB instance");
    }

    let client = Arc::new(OpenHabHttpClient::new(config.openhab.clone())?);

    match client.health_check().await {
        Ok(true) => info!("Connected to openHAB at {}", config.openhab.url),
        Ok(false) => warn!("openHAB at {} answered with an error status", config.openhab.url),
        Err(e) => warn!("openHAB at {} is not reachable yet: {e}", config.openhab.url),
    }

    let context = ToolContext::new(client, Arc::new(config));
    info!("Serving tool requests on stdio");
    serve(context).await
}

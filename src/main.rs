//! # Main Entry Point
//!
//! Initializes the server:
//! - Domain: configuration
//! - Infrastructure: command runner, MCP surface
//! - Strings: instruction templates and framework docs

mod domain;
mod infrastructure;
mod strings;

use anyhow::{Context, Result};
use clap::Parser;
use rmcp::{
    ServiceExt,
    transport::{sse_server::SseServer, stdio},
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::config::{AppConfig, Transport};
use crate::infrastructure::mcp::CciServer;
use crate::infrastructure::runner::CommandRunner;

#[derive(Debug, Parser)]
#[command(name = "sfcore-th-dev", about = "MCP server for CumulusCI CLI operations")]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long, default_value = "data/config.yaml")]
    config: PathBuf,
    /// Override the configured transport (sse or stdio).
    #[arg(long)]
    transport: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env may supply TRANSPORT/HOST/PORT before config load reads them
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Logging Setup
    if !std::path::Path::new("data").exists() {
        std::fs::create_dir("data").context("Failed to create data directory")?;
    }

    let file_appender = tracing_appender::rolling::never("data", "session.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);

    // stdout carries the stdio transport, so console logs go to stderr
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    tracing::info!("Starting sfcore-th-dev...");

    let mut config = AppConfig::load(&cli.config).context("Failed to load configuration")?;
    match cli.transport.as_deref() {
        Some("stdio") => config.server.transport = Transport::Stdio,
        Some("sse") => config.server.transport = Transport::Sse,
        Some(other) => anyhow::bail!("unknown transport '{other}', expected 'sse' or 'stdio'"),
        None => {}
    }

    let runner = Arc::new(CommandRunner::new().with_timeout(config.command_timeout()));

    match config.server.transport {
        Transport::Sse => {
            let addr: SocketAddr = config
                .bind_address()
                .parse()
                .with_context(|| format!("invalid bind address '{}'", config.bind_address()))?;
            tracing::info!("Serving MCP over SSE on {addr}");

            let ct = SseServer::serve(addr)
                .await
                .context("Failed to start SSE server")?
                .with_service(move || CciServer::new(runner.clone()));

            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for shutdown signal")?;
            tracing::info!("Shutting down");
            ct.cancel();
        }
        Transport::Stdio => {
            tracing::info!("Serving MCP over stdio");

            let service = CciServer::new(runner)
                .serve(stdio())
                .await
                .context("Failed to start stdio server")?;
            service.waiting().await?;
        }
    }

    Ok(())
}

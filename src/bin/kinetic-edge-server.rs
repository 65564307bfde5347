// ABOUTME: Server binary for the Kinetic Edge health coaching API
// ABOUTME: Loads configuration, opens the database, wires the model provider, and serves HTTP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kinetic Edge Contributors

//! # Kinetic Edge Server Binary
//!
//! Starts the JSON API with session authentication, `SQLite` storage, and the
//! configured OpenAI-compatible language model.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use kinetic_edge::{
    auth::AuthManager,
    config::ServerConfig,
    database::Database,
    llm::{prompts::CoachPrompts, LlmProvider, OpenAiCompatibleConfig, OpenAiCompatibleProvider},
    logging,
    resources::ServerResources,
    routes,
};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "kinetic-edge-server")]
#[command(about = "Kinetic Edge - BMI tracking with AI diet and workout coaching")]
pub struct Args {
    /// Override bind host
    #[arg(long)]
    host: Option<String>,

    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    info!("Starting Kinetic Edge server");
    info!("{}", config.summary());

    let database = Database::new(&config.database.url).await?;
    info!(url = %config.database.url, "Database initialized successfully");

    let auth_manager = AuthManager::new(
        config.auth.jwt_secret.as_bytes(),
        config.auth.jwt_expiry_hours,
    );

    let provider: Arc<dyn LlmProvider> = Arc::new(OpenAiCompatibleProvider::new(
        OpenAiCompatibleConfig::from(&config.llm),
    )?);
    info!(
        provider = provider.display_name(),
        model = provider.default_model(),
        "Language model provider configured"
    );

    let prompts = CoachPrompts::load(&config.prompts).await?;

    let addr: SocketAddr = format!("{}:{}", config.host, config.http_port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.host, config.http_port))?;

    let resources = Arc::new(ServerResources::new(
        database,
        auth_manager,
        provider,
        prompts,
        Arc::new(config),
    ));
    let app = routes::build_router(resources);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Listening on http://{addr}");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {e}");
        return Err(e.into());
    }

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
        return;
    }
    info!("Shutdown signal received");
}

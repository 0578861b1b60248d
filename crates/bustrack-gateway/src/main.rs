use anyhow::Context;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

mod app;
mod http;
mod ws;

/// Live bus location relay: drivers publish, students watch.
#[derive(Debug, Parser)]
#[command(name = "bustrack-gateway", version, about)]
struct Cli {
    /// Path to bustrack.toml (default: ~/.bustrack/bustrack.toml).
    #[arg(long, env = "BUSTRACK_CONFIG")]
    config: Option<String>,

    /// Override the bind address from the config file.
    #[arg(long)]
    bind: Option<String>,

    /// Override the listen port from the config file.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "bustrack_gateway=info,bustrack_sessions=info,tower_http=debug".into()
            }),
        )
        .init();

    let cli = Cli::parse();

    // load config: --config / BUSTRACK_CONFIG > ~/.bustrack/bustrack.toml
    // A broken file must not revive the built-in tokens, so this is fatal.
    let mut config = bustrack_core::config::BusTrackConfig::load(cli.config.as_deref())
        .context("failed to load bustrack config")?;
    if let Some(bind) = cli.bind {
        config.gateway.bind = bind;
    }
    if let Some(port) = cli.port {
        config.gateway.port = port;
    }

    let addr: SocketAddr = format!("{}:{}", config.gateway.bind, config.gateway.port).parse()?;

    // the fleet is fixed from here on
    let state = Arc::new(app::AppState::new(config)?);
    let router = app::build_router(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        publishers = state.lifecycle.sessions().registry().len(),
        "BRUR bus tracker listening on {}", addr
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;

use kubedeck_api::{ApiSettings, AppState, build_router};
use kubedeck_k8s::KubeClient;

mod config;

use config::{ConfigFile, ServerConfig};

/// Kubedeck - a web dashboard API gateway for Kubernetes clusters
#[derive(Parser, Debug)]
#[command(name = "kubedeck")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, value_name = "ADDR")]
    bind: Option<SocketAddr>,

    /// Path to the configuration file
    #[arg(long, value_name = "FILE", default_value = "kubedeck.toml")]
    config: PathBuf,

    /// Directory of built frontend assets to serve at /
    #[arg(long, value_name = "DIR")]
    static_dir: Option<PathBuf>,

    /// Origin allowed by CORS, repeatable (all origins when omitted)
    #[arg(long = "cors-origin", value_name = "ORIGIN")]
    cors_origin: Vec<String>,

    /// Seconds between WebSocket count frames
    #[arg(long, value_name = "SECS")]
    update_interval_secs: Option<u64>,

    /// Default number of log lines returned per request
    #[arg(long, value_name = "LINES")]
    tail_lines: Option<i64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let result = run_server(args).await;

    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

async fn run_server(args: Args) -> Result<()> {
    let mut config = ServerConfig::from_file(ConfigFile::load(&args.config)?);

    // CLI flags win over the config file
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    if let Some(dir) = args.static_dir {
        config.static_dir = Some(dir);
    }
    if !args.cors_origin.is_empty() {
        config.cors_origins = args.cors_origin;
    }
    if let Some(secs) = args.update_interval_secs {
        config.update_interval = Duration::from_secs(secs);
    }
    if let Some(lines) = args.tail_lines {
        config.tail_lines = lines;
    }
    config.validate()?;

    // Come up even without a reachable cluster; the API answers 503
    // until the server restarts with working credentials
    let kube = match KubeClient::connect().await {
        Ok(client) => {
            tracing::info!("Connected to Kubernetes cluster");
            Some(client)
        }
        Err(e) => {
            tracing::warn!("Starting without Kubernetes client: {e:#}");
            None
        }
    };

    let settings = ApiSettings {
        update_interval: config.update_interval,
        tail_lines: config.tail_lines,
        cors_origins: config.cors_origins.clone(),
        static_dir: config.static_dir.clone(),
    };
    let app = build_router(AppState::new(kube, settings))?;

    let listener = TcpListener::bind(config.bind)
        .await
        .context(format!("Failed to bind {}", config.bind))?;
    tracing::info!("Listening on http://{}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutting down");
}

//! `memspace-server` — hosts the network façade (§4.8): a trivial in-memory
//! `put`/`get`/`read` tuple store reachable over HTTP/JSON, for clients that
//! don't want to attach to the shared-memory region directly.

use clap::Parser;
use memspace_config::FacadeConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Network façade for a memspace tuple space.
#[derive(Parser, Debug)]
#[command(name = "memspace-server")]
#[command(about = "HTTP/JSON façade over an in-memory tuple space")]
struct Args {
    /// Listen host, overrides the config file's `listen_host`.
    #[arg(long)]
    listen: Option<String>,

    /// Listen port, overrides the config file's `port`.
    #[arg(long)]
    port: Option<u16>,

    /// Path to a TOML config file (§4.9).
    #[arg(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => FacadeConfig::load(path.clone())?,
        None => FacadeConfig::default(),
    };
    if let Some(listen) = args.listen {
        config.listen_host = listen;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    let addr = format!("{}:{}", config.listen_host, config.port);
    let app = memspace_net::router();

    info!(addr, "memspace-server listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

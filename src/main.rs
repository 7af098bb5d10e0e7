//! API Gateway
//!
//! Single entry point between the browser client and the backend services.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌───────────────────────────────────────────────────────┐
//!                      │                      API GATEWAY                      │
//!                      │                                                       │
//!   Client POST        │  ┌───────────┐    ┌───────────┐    ┌──────────────┐   │
//!   ───────────────────┼─▶│ normalize │───▶│  routing  │───▶│ credentials  │   │
//!   json | multipart   │  │ (payload) │    │ (apiRoute)│    │ (cookies →)  │   │
//!   | urlencoded       │  └───────────┘    └───────────┘    └──────┬───────┘   │
//!                      │                                           │           │
//!                      │                                           ▼           │
//!   Client Response    │  ┌───────────┐    ┌───────────┐    ┌──────────────┐   │
//!   ◀──────────────────┼──│ response  │◀───│  error    │◀───│   upstream   │◀──┼── Backend
//!   document | json    │  │  framer   │    │normalizer │    │   invoker    │   │   services
//!   | {error}          │  └───────────┘    └───────────┘    └──────────────┘   │
//!                      │                                                       │
//!                      │  config · observability · lifecycle · security/CORS   │
//!                      └───────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use api_gateway::config::load_config;
use api_gateway::lifecycle::startup;
use api_gateway::observability::logging;
use api_gateway::ResolutionTable;

#[derive(Parser)]
#[command(name = "api-gateway")]
#[command(about = "Protocol gateway between the web client and backend services", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,

    /// Print the resolution table and exit.
    #[arg(long)]
    list_operations: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    if cli.list_operations {
        let table = ResolutionTable::from_config(&config.operations);
        for (name, endpoint) in table.entries() {
            println!("{:<28} {:<7} {}", name, endpoint.method, endpoint.path);
        }
        return Ok(());
    }

    logging::init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        backend = %config.backend.base_url,
        allowed_origin = %config.cors.allowed_origin,
        request_timeout_secs = config.timeouts.request_secs,
        "api-gateway starting"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

//! Admin service binary

use clap::{Parser, Subcommand};
use kvadm::admin::{create_router, AdminState};
use kvadm::agency::{AgencyPaths, HttpAgency};
use kvadm::cluster::SupervisionLockProbe;
use kvadm::common::Config;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "kvadm-server")]
#[command(about = "kvadm cluster administration service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the admin HTTP API
    Serve {
        /// Bind address
        #[arg(long)]
        bind: Option<SocketAddr>,

        /// Agency endpoints (comma-separated)
        #[arg(long, value_delimiter = ',')]
        agency: Vec<String>,

        /// Root prefix of the agency tree
        #[arg(long)]
        prefix: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            bind,
            agency,
            prefix,
        } => {
            // File/env config first, CLI arguments win.
            let mut config = Config::load();
            if let Some(bind) = bind {
                config.admin.bind_addr = bind;
            }
            if !agency.is_empty() {
                config.agency.endpoints = agency;
            }
            if let Some(prefix) = prefix {
                config.agency.prefix = prefix;
            }

            tracing::info!("Starting kvadm-server {}", kvadm::VERSION);
            tracing::info!("  Admin API: {}", config.admin.bind_addr);
            tracing::info!("  Agency: {}", config.agency.endpoints.join(", "));
            tracing::info!("  Tree prefix: /{}", config.agency.prefix);

            let paths = AgencyPaths::new(&config.agency.prefix);
            let agency = Arc::new(HttpAgency::new(&config.agency)?);
            let locks = Arc::new(SupervisionLockProbe::new(agency.clone(), paths.clone()));

            let state = AdminState {
                agency,
                locks,
                paths,
                removal: config.removal.clone(),
            };
            let router = create_router(state);

            let listener = tokio::net::TcpListener::bind(config.admin.bind_addr).await?;
            tracing::info!("kvadm-server ready");
            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}

//! LSNET daemon binary.
//!
//! Loads the node configuration and runs a router or host until Ctrl-C.

use clap::Parser;
use lsnet::{Config, Host, Router};
use std::path::PathBuf;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, EnvFilter};

/// Link-state routed datagram network node
#[derive(Parser, Debug)]
#[command(name = "lsnet", version, about)]
struct Args {
    /// Path to the node configuration file
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    let config = match Config::load_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!(
                "failed to load configuration from {}: {}",
                args.config.display(),
                e
            );
            std::process::exit(1);
        }
    };

    info!(
        id = %config.node.id,
        listen = %config.node.listen,
        role = if config.is_router() { "router" } else { "host" },
        "configuration loaded"
    );

    if config.is_router() {
        run_router(config).await;
    } else {
        run_host(config).await;
    }
}

async fn run_router(config: Config) {
    let mut router = match Router::new(config) {
        Ok(router) => router,
        Err(e) => {
            error!("failed to create router: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = router.start().await {
        error!("failed to start router: {}", e);
        std::process::exit(1);
    }

    tokio::select! {
        result = router.run() => {
            match result {
                Ok(()) => info!("router event loop exited"),
                Err(e) => error!("router event loop error: {}", e),
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    router.stop();
}

async fn run_host(config: Config) {
    let mut host = match Host::new(config) {
        Ok(host) => host,
        Err(e) => {
            error!("failed to create host: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = host.start().await {
        error!("failed to start host: {}", e);
        std::process::exit(1);
    }

    host.startup_burst().await;

    tokio::select! {
        result = host.run() => {
            match result {
                Ok(()) => info!("host event loop exited"),
                Err(e) => error!("host event loop error: {}", e),
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    host.stop();
}

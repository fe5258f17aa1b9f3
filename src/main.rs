//! Site headers service.
//!
//! Serves a document root and sets per-site, pattern-keyed response headers.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────────┐
//!                     │                    SITE HEADERS                      │
//!                     │                                                      │
//!   Client Request    │  ┌─────────┐    ┌────────────┐    ┌──────────────┐   │
//!   ──────────────────┼─▶│  http   │───▶│ injection  │───▶│   resolver   │   │
//!                     │  │ server  │    │ middleware │    │    engine    │   │
//!                     │  └─────────┘    └─────┬──────┘    └──────┬───────┘   │
//!                     │                       │            miss  │           │
//!                     │                       ▼                  ▼           │
//!   Client Response   │                ┌────────────┐    ┌──────────────┐    │
//!   ◀─────────────────┼────────────────│ doc root + │    │ secret store │    │
//!                     │                │  headers   │    │  + rules     │    │
//!                     │                └────────────┘    └──────▲───────┘    │
//!                     │                                         │ reload     │
//!                     │  ┌──────────┐   SecretsSaved   ┌────────┴───────┐    │
//!                     │  │ events   │◀─────────────────│ secrets watcher│    │
//!                     │  │   bus    │──▶ invalidate    └────────────────┘    │
//!                     │  └──────────┘                                        │
//!                     └──────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use site_headers::admin::{setup_admin_router, AdminState};
use site_headers::config::{load_config, AppConfig};
use site_headers::lifecycle::{shutdown, signals};
use site_headers::observability::{logging, metrics};
use site_headers::{HttpServer, Services, Shutdown};

#[derive(Parser)]
#[command(name = "site-headers", version, about = "Per-site response header injection")]
struct Args {
    /// Path to the TOML configuration file. Defaults are used when omitted.
    #[arg(short, long, env = "SITE_HEADERS_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    logging::init_logging(&config.observability.log_level)?;
    tracing::info!("site-headers v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        secrets = ?config.secrets.path,
        app_key = %config.resolver.app_key,
        empty_patterns = ?config.resolver.empty_patterns,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let services = Services::start(&config)?;
    let shutdown = Shutdown::new();

    if config.admin.enabled {
        let admin = setup_admin_router(AdminState {
            engine: services.engine.clone(),
            api_key: config.admin.api_key.as_str().into(),
        });
        let admin_listener = TcpListener::bind(&config.admin.bind_address).await?;
        tracing::info!(address = %admin_listener.local_addr()?, "Admin API listening");

        let admin_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            if let Err(e) = axum::serve(admin_listener, admin)
                .with_graceful_shutdown(shutdown::wait(admin_shutdown))
                .await
            {
                tracing::error!(error = %e, "Admin API failed");
            }
        });
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config, services.engine.clone());
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    signals::wait_for_shutdown_signal().await;
    shutdown.trigger();

    server_task.await??;
    services.stop();

    tracing::info!("Shutdown complete");
    Ok(())
}

//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router serving the document root
//! - Wire up middleware (tracing, timeout, header injection)
//! - Bind server to listener with graceful shutdown

use axum::{http::StatusCode, middleware, Router};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::http::middleware::{header_injection_middleware, InjectionState};
use crate::http::site::SiteResolver;
use crate::lifecycle::shutdown;
use crate::resolver::HeaderEngine;

/// HTTP server applying per-site headers to every response.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
}

impl HttpServer {
    pub fn new(config: AppConfig, engine: Arc<HeaderEngine>) -> Self {
        let state = InjectionState {
            engine,
            sites: Arc::new(SiteResolver::from_config(&config.sites)),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: InjectionState) -> Router {
        let content = match &config.listener.document_root {
            Some(root) => Router::new().fallback_service(ServeDir::new(root)),
            None => Router::new().fallback(not_found),
        };

        content
            .layer(middleware::from_fn_with_state(state, header_injection_middleware))
            .layer(TimeoutLayer::new(Duration::from_secs(config.listener.request_timeout_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown_rx` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            document_root = ?self.config.listener.document_root,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}

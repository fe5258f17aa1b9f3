//! Startup orchestration.
//!
//! # Responsibilities
//! - Load the secrets file
//! - Build the header engine and subscribe it to configuration changes
//! - Start the secrets watcher
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - A missing secrets file is not an error; every site starts unconfigured
//! - Sites without secrets inherit `secrets.fallback_site`, unless it is empty

use notify::RecommendedWatcher;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{AppConfig, SecretsWatcher};
use crate::events::{ListenerHandle, SecretsEventBus};
use crate::resolver::{EngineOptions, HeaderEngine};
use crate::secrets::{FileSecretStore, SecretError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to load secrets: {0}")]
    Secrets(#[from] SecretError),

    #[error("failed to watch secrets file: {0}")]
    Watch(#[from] notify::Error),
}

/// Long-lived services shared by the HTTP and admin servers.
pub struct Services {
    pub engine: Arc<HeaderEngine>,
    pub store: Arc<FileSecretStore>,
    pub bus: SecretsEventBus,
    subscription: ListenerHandle,
    watcher: Option<RecommendedWatcher>,
}

impl Services {
    /// Initialize services. Must be called within a Tokio runtime.
    pub fn start(config: &AppConfig) -> Result<Self, StartupError> {
        let mut store = FileSecretStore::load_or_empty(&config.secrets.path)?;
        if !config.secrets.fallback_site.is_empty() {
            store = store.with_fallback_site(config.secrets.fallback_site.clone());
        }
        let store = Arc::new(store);
        let bus = SecretsEventBus::new();

        let engine = Arc::new(HeaderEngine::new(
            store.clone(),
            EngineOptions::from(&config.resolver),
        ));
        let subscription = bus.subscribe(engine.clone());
        tracing::info!(app_key = %config.resolver.app_key, "Header engine subscribed to secrets events");

        let watcher = if config.secrets.watch {
            let watcher =
                SecretsWatcher::new(store.clone(), bus.clone(), config.resolver.app_key.clone());
            Some(watcher.run()?)
        } else {
            None
        };

        Ok(Self {
            engine,
            store,
            bus,
            subscription,
            watcher,
        })
    }

    /// Unsubscribe the engine and stop watching the secrets file.
    pub fn stop(self) {
        tracing::info!("Unsubscribing header engine from secrets events");
        self.subscription.unsubscribe();
        drop(self.watcher);
    }
}

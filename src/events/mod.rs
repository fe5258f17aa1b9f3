//! Configuration-changed notifications.
//!
//! # Data Flow
//! ```text
//! secrets saved (store API, file watcher)
//!     → SecretsEventBus::publish(SecretsSaved)
//!     → one task per subscribed listener
//!     → SecretsListener::on_secrets_saved (the resolver clears its cache)
//! ```
//!
//! # Design Decisions
//! - Events carry only an opaque key; listeners do not filter on it
//! - Subscriptions are explicit handles, dropped or unsubscribed at shutdown

pub mod bus;

pub use bus::{ListenerHandle, SecretsEventBus};

/// Published whenever per-site secrets are created, updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretsSaved {
    pub key: String,
}

impl SecretsSaved {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

/// Receives configuration-changed events.
pub trait SecretsListener: Send + Sync + 'static {
    fn on_secrets_saved(&self, event: &SecretsSaved);
}

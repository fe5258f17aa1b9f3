//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!
//! Secrets file change:
//!     watcher.rs detects change
//!     → FileSecretStore reloads (atomic swap)
//!     → SecretsSaved published
//!     → resolver clears its rule cache
//! ```
//!
//! # Design Decisions
//! - Service config is immutable once loaded; only secrets reload at runtime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AdminConfig, AppConfig, ListenerConfig, ObservabilityConfig, ResolverConfig, SecretsConfig,
    SitesConfig,
};
pub use watcher::SecretsWatcher;

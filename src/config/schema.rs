//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::rules::EmptyPatternPolicy;

/// Placeholder admin key; validation rejects it when the admin API is enabled.
pub const PLACEHOLDER_API_KEY: &str = "CHANGE_ME_IN_PRODUCTION";

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address, document root).
    pub listener: ListenerConfig,

    /// Where per-site secrets are read from.
    pub secrets: SecretsConfig,

    /// Header resolution settings.
    pub resolver: ResolverConfig,

    /// Host header to site identifier mapping.
    pub sites: SitesConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    pub admin: AdminConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Directory served as static content. Unset means every path is a 404.
    pub document_root: Option<PathBuf>,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            document_root: None,
            request_timeout_secs: 30,
        }
    }
}

/// Secret store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecretsConfig {
    /// Path to the TOML secrets file.
    pub path: PathBuf,

    /// Reload the file and clear cached rules when it changes.
    pub watch: bool,

    /// Site whose secrets apply to sites without their own. Empty disables it.
    pub fallback_site: String,
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("secrets.toml"),
            watch: true,
            fallback_site: crate::secrets::SYSTEM_HOST.to_string(),
        }
    }
}

/// Header resolution configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// App key under which site header rules are stored.
    pub app_key: String,

    /// User the secret store lookups are made as.
    pub acting_user: String,

    /// What empty patterns (e.g. `"/a,,/b"`) match.
    pub empty_patterns: EmptyPatternPolicy,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            app_key: crate::resolver::APP_KEY.to_string(),
            acting_user: crate::resolver::SYSTEM_USER.to_string(),
            empty_patterns: EmptyPatternPolicy::default(),
        }
    }
}

/// Site identification.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SitesConfig {
    /// Host header (with or without port) -> site identifier.
    /// Unmapped hosts use the lower-cased host name as the site identifier.
    pub hosts: HashMap<String, String>,

    /// Site used for requests without a Host header.
    pub default_site: Option<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: PLACEHOLDER_API_KEY.to_string(),
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}

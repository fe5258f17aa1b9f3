//! Per-site response header injection.
//!
//! Resolves, for a request URL on a site, the extra response headers to set,
//! from per-site rules kept in a secret store and cached until configuration
//! changes.

pub mod admin;
pub mod config;
pub mod events;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resolver;
pub mod rules;
pub mod secrets;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::{Services, Shutdown};
pub use resolver::HeaderEngine;

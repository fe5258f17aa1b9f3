//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (cache, store and match counters)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - `RUST_LOG` overrides the configured log level
//! - Metrics are cheap (atomic increments) and safe to record with no recorder installed

pub mod logging;
pub mod metrics;

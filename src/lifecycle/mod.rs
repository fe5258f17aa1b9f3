//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load secrets → Build resolver → Subscribe to events → Start watcher
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop servers → Unsubscribe → Stop watcher → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: secrets first, then resolver, then listeners
//! - The resolver is subscribed for as long as the services live

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{Services, StartupError};

//! HTTP surface.
//!
//! # Data Flow
//! ```text
//! Client request
//!     → server.rs (Axum router, trace + timeout layers)
//!     → middleware.rs (site from Host, resolve headers)
//!         → site.rs (Host header → site identifier)
//!         → resolver::HeaderEngine
//!     → document root / 404
//!     → middleware.rs sets resolved headers on the response
//!     → Send to client
//! ```

pub mod middleware;
pub mod server;
pub mod site;

pub use middleware::{apply_headers, header_injection_middleware, InjectionState};
pub use server::HttpServer;
pub use site::SiteResolver;

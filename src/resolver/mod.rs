//! Header resolution subsystem.
//!
//! # Data Flow
//! ```text
//! resolve_headers(url, site)
//!     → cache.rs (lookup site)
//!         miss → SecretStore::get_secrets → RuleParser per entry
//!              → publish Configured(rules) or Absent
//!     → url.rs (decode URL, raw on failure)
//!     → scan rules in order, first matching rule's headers
//!
//! SecretsSaved event
//!     → engine.rs (invalidate)
//!     → cache.rs (clear every site)
//! ```
//!
//! # Per-site states
//! ```text
//! UNRESOLVED → RESOLVING → CONFIGURED(rules) | ABSENT
//!      ↑_________________________________________|   (invalidate)
//! ```

pub mod cache;
pub mod engine;
pub mod url;

pub use cache::{CacheSummary, RuleCache, SiteRules};
pub use engine::{EngineOptions, HeaderEngine, APP_KEY, SYSTEM_USER};

//! Per-site secret storage.
//!
//! # Data Flow
//! ```text
//! store.rs   SecretStore trait consumed by the resolver
//! memory.rs  DashMap-backed store (embedding, tests)
//! file.rs    TOML file store, atomically reloaded by the secrets watcher
//! ```
//!
//! # Design Decisions
//! - A site's secrets are a flat, ordered list of key/value strings
//! - The `name` key is descriptive metadata, everything else is a rule
//! - Stores report failures; the resolver decides to treat them as "absent"
//! - A site without secrets inherits the fallback site's, when one is set

pub mod file;
pub mod memory;
pub mod store;

pub use file::FileSecretStore;
pub use memory::MemorySecretStore;
pub use store::{
    RawSecretEntry, SecretError, SecretStore, SiteSecrets, METADATA_KEY, SYSTEM_HOST,
};

//! Shared fakes for integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use site_headers::secrets::{MemorySecretStore, SecretError, SecretStore, SiteSecrets};

/// Wraps a memory store and counts every fetch.
#[derive(Default)]
pub struct CountingStore {
    pub inner: MemorySecretStore,
    calls: AtomicUsize,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count fetches against a store that falls back to `site`.
    #[allow(dead_code)]
    pub fn with_fallback_site(site: &str) -> Self {
        Self {
            inner: MemorySecretStore::new().with_fallback_site(site),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_site(self, app_key: &str, site: &str, fields: &[(&str, &str)]) -> Self {
        self.inner
            .put_site(app_key, site, fields.iter().copied().collect());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SecretStore for CountingStore {
    fn get_secrets(
        &self,
        app_key: &str,
        site: &str,
        acting_user: &str,
    ) -> Result<Option<SiteSecrets>, SecretError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_secrets(app_key, site, acting_user)
    }
}

/// A store that is always unreachable.
#[derive(Default)]
#[allow(dead_code)]
pub struct FailingStore {
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl FailingStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SecretStore for FailingStore {
    fn get_secrets(
        &self,
        _app_key: &str,
        _site: &str,
        _acting_user: &str,
    ) -> Result<Option<SiteSecrets>, SecretError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(SecretError::Unavailable("connection refused".into()))
    }
}

//! In-memory secret store.

use dashmap::DashMap;

use crate::events::{SecretsEventBus, SecretsSaved};
use crate::secrets::store::lookup_with_fallback;
use crate::secrets::{SecretError, SecretStore, SiteSecrets};

/// A thread-safe secret store held entirely in memory.
///
/// Writes publish [`SecretsSaved`] on the attached bus, if any.
#[derive(Default)]
pub struct MemorySecretStore {
    /// (app key, site) -> secrets.
    inner: DashMap<(String, String), SiteSecrets>,
    bus: Option<SecretsEventBus>,
    fallback_site: Option<String>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that announces every write on `bus`.
    pub fn with_bus(bus: SecretsEventBus) -> Self {
        Self {
            bus: Some(bus),
            ..Self::default()
        }
    }

    /// Serve `site`'s secrets to sites that have none of their own.
    pub fn with_fallback_site(mut self, site: impl Into<String>) -> Self {
        self.fallback_site = Some(site.into());
        self
    }

    /// Create or replace the secrets of a site.
    pub fn put_site(&self, app_key: &str, site: &str, secrets: SiteSecrets) {
        self.inner
            .insert((app_key.to_string(), site.to_string()), secrets);
        tracing::info!(app_key, site, "Site secrets saved");
        self.announce(app_key);
    }

    /// Delete the secrets of a site. Returns true if there was anything to delete.
    pub fn remove_site(&self, app_key: &str, site: &str) -> bool {
        let removed = self
            .inner
            .remove(&(app_key.to_string(), site.to_string()))
            .is_some();
        if removed {
            tracing::info!(app_key, site, "Site secrets deleted");
            self.announce(app_key);
        }
        removed
    }

    pub fn site_count(&self) -> usize {
        self.inner.len()
    }

    fn announce(&self, app_key: &str) {
        if let Some(bus) = &self.bus {
            bus.publish(SecretsSaved::new(app_key));
        }
    }
}

impl SecretStore for MemorySecretStore {
    fn get_secrets(
        &self,
        app_key: &str,
        site: &str,
        _acting_user: &str,
    ) -> Result<Option<SiteSecrets>, SecretError> {
        Ok(lookup_with_fallback(site, self.fallback_site.as_deref(), |site| {
            self.inner
                .get(&(app_key.to_string(), site.to_string()))
                .map(|r| r.value().clone())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::SYSTEM_HOST;

    #[test]
    fn test_put_get_remove() {
        let store = MemorySecretStore::new();
        let secrets: SiteSecrets = [("/api", "x-a: 1")].into_iter().collect();

        assert!(store.get_secrets("headerapp", "site-a", "system").unwrap().is_none());

        store.put_site("headerapp", "site-a", secrets.clone());
        assert_eq!(
            store.get_secrets("headerapp", "site-a", "system").unwrap(),
            Some(secrets)
        );
        // Scoped by app key.
        assert!(store.get_secrets("otherapp", "site-a", "system").unwrap().is_none());

        assert!(store.remove_site("headerapp", "site-a"));
        assert!(!store.remove_site("headerapp", "site-a"));
        assert_eq!(store.site_count(), 0);
    }

    #[test]
    fn test_fallback_site() {
        let store = MemorySecretStore::new().with_fallback_site(SYSTEM_HOST);
        assert!(store.get_secrets("headerapp", "site-a", "system").unwrap().is_none());

        let system: SiteSecrets = [("/", "x-system: 1")].into_iter().collect();
        store.put_site("headerapp", SYSTEM_HOST, system.clone());
        assert_eq!(
            store.get_secrets("headerapp", "site-a", "system").unwrap(),
            Some(system)
        );
        // Fallback stays within the app key.
        assert!(store.get_secrets("otherapp", "site-a", "system").unwrap().is_none());

        let own: SiteSecrets = [("/", "x-own: 1")].into_iter().collect();
        store.put_site("headerapp", "site-a", own.clone());
        assert_eq!(store.get_secrets("headerapp", "site-a", "system").unwrap(), Some(own));
    }
}

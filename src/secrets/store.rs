//! Secret store contract and raw entry types.

use thiserror::Error;

/// Reserved entry key holding the configuration's display name.
pub const METADATA_KEY: &str = "name";

/// Site whose configuration is inherited by sites that have none of their own.
pub const SYSTEM_HOST: &str = "SYSTEM_HOST";

/// One configuration field as stored: a pattern list key and a header list value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSecretEntry {
    pub key: String,
    pub value: String,
}

impl RawSecretEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// True for the reserved metadata entry (compared case-insensitively).
    pub fn is_metadata(&self) -> bool {
        self.key.eq_ignore_ascii_case(METADATA_KEY)
    }
}

/// All entries configured for one site, in store order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteSecrets {
    entries: Vec<RawSecretEntry>,
}

impl SiteSecrets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry. A key that already exists keeps its position and gets the new value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let entry = RawSecretEntry::new(key, value);
        match self.entries.iter_mut().find(|e| e.key == entry.key) {
            Some(existing) => existing.value = entry.value,
            None => self.entries.push(entry),
        }
    }

    pub fn entries(&self) -> &[RawSecretEntry] {
        &self.entries
    }

    /// Entries that describe rules, i.e. everything except the metadata entry.
    pub fn rule_entries(&self) -> impl Iterator<Item = &RawSecretEntry> {
        self.entries.iter().filter(|e| !e.is_metadata())
    }

    /// The descriptive `name` entry, if present.
    pub fn display_name(&self) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.is_metadata())
            .map(|e| e.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for SiteSecrets
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut secrets = SiteSecrets::new();
        for (key, value) in iter {
            secrets.insert(key, value);
        }
        secrets
    }
}

/// Errors a secret store can report.
#[derive(Debug, Error)]
pub enum SecretError {
    /// The backing store could not be reached.
    #[error("secret store unavailable: {0}")]
    Unavailable(String),

    /// Stored data could not be decoded.
    #[error("failed to decode secrets: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Source of per-site secrets.
///
/// `Ok(None)` means the site has no configuration for `app_key`.
pub trait SecretStore: Send + Sync {
    fn get_secrets(
        &self,
        app_key: &str,
        site: &str,
        acting_user: &str,
    ) -> Result<Option<SiteSecrets>, SecretError>;
}

/// Look up `site`, or `fallback_site` when `site` has no entry of its own.
pub(crate) fn lookup_with_fallback<F>(
    site: &str,
    fallback_site: Option<&str>,
    lookup: F,
) -> Option<SiteSecrets>
where
    F: Fn(&str) -> Option<SiteSecrets>,
{
    lookup(site).or_else(|| {
        let fallback = fallback_site.filter(|fallback| *fallback != site)?;
        let secrets = lookup(fallback)?;
        tracing::debug!(site, fallback, "Site has no secrets, using fallback site");
        Some(secrets)
    })
}

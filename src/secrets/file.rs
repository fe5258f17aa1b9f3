//! TOML file secret store.
//!
//! # File layout
//! ```toml
//! [apps.headerapp.site-a]
//! name = "My Config"
//! "/api/*" = "x-frame-options: DENY"
//! "/*.jpg,/*.png" = "cache-control: max-age=3600; access-control-allow-origin: *"
//! ```
//!
//! # Design Decisions
//! - The whole document lives in memory behind an `ArcSwap`; reads never block
//! - `reload()` swaps the document atomically, or keeps the old one on error
//! - Field order in the file is the rule order

use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use toml::{Table, Value};

use crate::secrets::store::lookup_with_fallback;
use crate::secrets::{SecretError, SecretStore, SiteSecrets};

/// app key -> site -> secrets.
pub type SecretsDocument = HashMap<String, HashMap<String, SiteSecrets>>;

pub struct FileSecretStore {
    path: PathBuf,
    document: ArcSwap<SecretsDocument>,
    fallback_site: Option<String>,
}

impl FileSecretStore {
    /// Load the store from `path`.
    pub fn load(path: &Path) -> Result<Self, SecretError> {
        let document = read_document(path)?;
        tracing::info!(path = ?path, sites = count_sites(&document), "Loaded secrets file");

        Ok(Self {
            path: path.to_path_buf(),
            document: ArcSwap::from_pointee(document),
            fallback_site: None,
        })
    }

    /// Load the store, starting empty if the file does not exist yet.
    pub fn load_or_empty(path: &Path) -> Result<Self, SecretError> {
        if path.exists() {
            return Self::load(path);
        }

        tracing::warn!(path = ?path, "Secrets file not found, starting with no site configuration");
        Ok(Self {
            path: path.to_path_buf(),
            document: ArcSwap::from_pointee(SecretsDocument::new()),
            fallback_site: None,
        })
    }

    /// Re-read the file. On error the previous contents stay in place.
    /// Returns the number of configured sites.
    pub fn reload(&self) -> Result<usize, SecretError> {
        let document = read_document(&self.path)?;
        let sites = count_sites(&document);
        self.document.store(Arc::new(document));
        tracing::info!(path = ?self.path, sites, "Reloaded secrets file");
        Ok(sites)
    }

    /// Serve `site`'s secrets to sites that have none of their own.
    pub fn with_fallback_site(mut self, site: impl Into<String>) -> Self {
        self.fallback_site = Some(site.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn site_count(&self) -> usize {
        count_sites(&self.document.load())
    }
}

impl SecretStore for FileSecretStore {
    fn get_secrets(
        &self,
        app_key: &str,
        site: &str,
        acting_user: &str,
    ) -> Result<Option<SiteSecrets>, SecretError> {
        tracing::trace!(app_key, site, acting_user, "Reading site secrets");
        let document = self.document.load();
        let Some(sites) = document.get(app_key) else {
            return Ok(None);
        };
        Ok(lookup_with_fallback(site, self.fallback_site.as_deref(), |site| {
            sites.get(site).cloned()
        }))
    }
}

fn read_document(path: &Path) -> Result<SecretsDocument, SecretError> {
    let content = fs::read_to_string(path)?;
    parse_document(&content)
}

fn count_sites(document: &SecretsDocument) -> usize {
    document.values().map(HashMap::len).sum()
}

/// Parse a secrets document. Non-string field values are skipped.
pub fn parse_document(content: &str) -> Result<SecretsDocument, SecretError> {
    let root: Table = toml::from_str(content)?;
    let mut document = SecretsDocument::new();

    let apps = match root.get("apps") {
        None => return Ok(document),
        Some(Value::Table(apps)) => apps,
        Some(_) => return Err(SecretError::Decode("`apps` must be a table".into())),
    };

    for (app_key, sites) in apps {
        let Value::Table(sites) = sites else {
            return Err(SecretError::Decode(format!(
                "`apps.{app_key}` must be a table of sites"
            )));
        };

        let app = document.entry(app_key.clone()).or_default();
        for (site, fields) in sites {
            let Value::Table(fields) = fields else {
                return Err(SecretError::Decode(format!(
                    "`apps.{app_key}.{site}` must be a table of fields"
                )));
            };

            let mut secrets = SiteSecrets::new();
            for (key, value) in fields {
                match value {
                    Value::String(value) => secrets.insert(key.clone(), value.clone()),
                    other => tracing::warn!(
                        app_key = %app_key,
                        site = %site,
                        field = %key,
                        kind = other.type_str(),
                        "Skipping non-string secret field"
                    ),
                }
            }
            app.insert(site.clone(), secrets);
        }
    }

    Ok(document)
}

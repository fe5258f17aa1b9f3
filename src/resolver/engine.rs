//! Header resolution engine.
//!
//! # Responsibilities
//! - Load a site's rules from the secret store on first use
//! - Cache loaded rules, including the fact that a site has none
//! - Match request URLs against the site's rules, first match wins
//! - Drop the whole cache when configuration changes
//!
//! # Design Decisions
//! - Store failures mean "no configuration"; resolution never errors
//! - Concurrent misses for one site may each load it; last publish wins
//! - Invalidation is global, not per site

use std::sync::Arc;

use crate::config::schema::ResolverConfig;
use crate::events::{SecretsListener, SecretsSaved};
use crate::observability::metrics;
use crate::resolver::cache::{CacheSummary, RuleCache, SiteRules};
use crate::resolver::url::decode_url;
use crate::rules::{DefaultRuleParser, EmptyPatternPolicy, HeaderSet, RuleParser};
use crate::secrets::{SecretStore, SiteSecrets};

/// Key under which site header configuration is stored.
pub const APP_KEY: &str = "headerapp";

/// User identity passed to the secret store for lookups.
pub const SYSTEM_USER: &str = "system";

#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub app_key: String,
    pub acting_user: String,
    pub empty_patterns: EmptyPatternPolicy,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            app_key: APP_KEY.to_string(),
            acting_user: SYSTEM_USER.to_string(),
            empty_patterns: EmptyPatternPolicy::default(),
        }
    }
}

impl From<&ResolverConfig> for EngineOptions {
    fn from(config: &ResolverConfig) -> Self {
        Self {
            app_key: config.app_key.clone(),
            acting_user: config.acting_user.clone(),
            empty_patterns: config.empty_patterns,
        }
    }
}

/// Resolves the extra response headers for a request URL on a site.
pub struct HeaderEngine {
    store: Arc<dyn SecretStore>,
    parser: Arc<dyn RuleParser>,
    cache: RuleCache,
    options: EngineOptions,
}

impl HeaderEngine {
    /// Create an engine using the default rule parser.
    pub fn new(store: Arc<dyn SecretStore>, options: EngineOptions) -> Self {
        Self::with_parser(store, Arc::new(DefaultRuleParser), options)
    }

    pub fn with_parser(
        store: Arc<dyn SecretStore>,
        parser: Arc<dyn RuleParser>,
        options: EngineOptions,
    ) -> Self {
        Self {
            store,
            parser,
            cache: RuleCache::new(),
            options,
        }
    }

    /// Headers to add for `url` on `site`, or `None` if no rule matches.
    ///
    /// A matching rule with no headers yields `Some` of an empty set.
    pub fn resolve_headers(&self, url: &str, site: &str) -> Option<HeaderSet> {
        let site_rules = self.site_rules(site);
        self.match_rules(&site_rules, url, site)
    }

    /// Like [`HeaderEngine::resolve_headers`], but never touches the store.
    ///
    /// Returns `None` if `site` is not cached.
    pub fn resolve_cached(&self, url: &str, site: &str) -> Option<Option<HeaderSet>> {
        let site_rules = self.cache.lookup(site)?;
        metrics::record_cache_hit();
        Some(self.match_rules(&site_rules, url, site))
    }

    fn match_rules(&self, site_rules: &SiteRules, url: &str, site: &str) -> Option<HeaderSet> {
        let decoded = decode_url(url);

        let matched = site_rules
            .rules()
            .iter()
            .find(|rule| rule.matches(&decoded, self.options.empty_patterns));

        metrics::record_match(matched.is_some());
        match matched {
            Some(rule) => {
                tracing::debug!(site, url, headers = rule.headers().len(), "Header rule matched");
                Some(rule.headers().clone())
            }
            None => {
                tracing::trace!(site, url, "No header rule matched");
                None
            }
        }
    }

    /// True if `site` is cached, so resolving it will not touch the store.
    pub fn is_cached(&self, site: &str) -> bool {
        self.cache.lookup(site).is_some()
    }

    /// Drop every cached site; the next request per site reloads it.
    /// Returns the cache generation this clear started.
    pub fn invalidate(&self) -> u64 {
        let generation = self.cache.clear_all();
        metrics::record_invalidation();
        tracing::info!(generation, "Header rule cache cleared");
        generation
    }

    pub fn cache_summary(&self) -> CacheSummary {
        self.cache.summary()
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    fn site_rules(&self, site: &str) -> Arc<SiteRules> {
        if let Some(rules) = self.cache.lookup(site) {
            metrics::record_cache_hit();
            return rules;
        }

        metrics::record_cache_miss();
        let generation = self.cache.generation();
        let rules = self.load_site(site);
        self.cache.populate(site, rules, generation)
    }

    fn load_site(&self, site: &str) -> SiteRules {
        match self.fetch_secrets(site) {
            Some(secrets) => {
                let rules: Vec<_> = secrets
                    .rule_entries()
                    .map(|entry| self.parser.parse(&entry.key, &entry.value))
                    .collect();
                tracing::info!(
                    site,
                    config = secrets.display_name().unwrap_or_default(),
                    rules = rules.len(),
                    "Loaded site header rules"
                );
                SiteRules::Configured(rules)
            }
            None => {
                tracing::debug!(site, "No header configuration for site");
                SiteRules::Absent
            }
        }
    }

    fn fetch_secrets(&self, site: &str) -> Option<SiteSecrets> {
        let result = self
            .store
            .get_secrets(&self.options.app_key, site, &self.options.acting_user);

        match &result {
            Ok(Some(_)) => metrics::record_store_fetch("found"),
            Ok(None) => metrics::record_store_fetch("not_found"),
            Err(e) => {
                metrics::record_store_fetch("error");
                tracing::warn!(site, error = %e, "Failed to fetch site secrets, treating as unconfigured");
            }
        }

        result.ok().flatten()
    }
}

impl SecretsListener for HeaderEngine {
    fn on_secrets_saved(&self, event: &SecretsSaved) {
        tracing::info!(key = %event.key, "Secrets saved, clearing header rule cache");
        self.invalidate();
    }
}

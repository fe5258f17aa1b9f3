//! Per-site rule cache.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::observability::metrics;
use crate::rules::Rule;

/// Cached outcome of loading one site's configuration.
#[derive(Debug)]
pub enum SiteRules {
    /// Configuration exists; the rules are in declaration order and may be empty.
    Configured(Vec<Rule>),
    /// No configuration could be found for the site.
    Absent,
}

impl SiteRules {
    pub fn rules(&self) -> &[Rule] {
        match self {
            SiteRules::Configured(rules) => rules,
            SiteRules::Absent => &[],
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, SiteRules::Configured(_))
    }
}

/// Snapshot of cache contents for the admin API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheSummary {
    pub sites: usize,
    pub configured: usize,
    pub absent: usize,
    pub generation: u64,
}

/// Site id -> published rules.
///
/// Entries are only ever inserted whole and removed all at once. Every
/// [`RuleCache::clear_all`] bumps a generation counter; a result loaded under
/// an older generation is not published.
#[derive(Debug, Default)]
pub struct RuleCache {
    sites: DashMap<String, Arc<SiteRules>>,
    generation: AtomicU64,
}

impl RuleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, site: &str) -> Option<Arc<SiteRules>> {
        self.sites.get(site).map(|r| Arc::clone(r.value()))
    }

    /// Current generation. Read it before loading a site and pass it to
    /// [`RuleCache::populate`].
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Publish the rules loaded for `site` under `generation`.
    ///
    /// Returns the shared rules either way. They are only stored if no clear
    /// happened since `generation` was read; the check runs under the shard
    /// lock, so a concurrent clear either rejects or removes the entry.
    pub fn populate(&self, site: &str, rules: SiteRules, generation: u64) -> Arc<SiteRules> {
        let rules = Arc::new(rules);

        match self.sites.entry(site.to_string()) {
            Entry::Occupied(mut entry) => {
                if self.generation() == generation {
                    entry.insert(Arc::clone(&rules));
                }
            }
            Entry::Vacant(entry) => {
                if self.generation() == generation {
                    entry.insert(Arc::clone(&rules));
                } else {
                    tracing::debug!(site, "Cache cleared while loading site, not publishing");
                }
            }
        }

        metrics::record_cached_sites(self.sites.len());
        rules
    }

    /// Drop every cached site. Returns the new generation.
    pub fn clear_all(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.sites.clear();
        metrics::record_cached_sites(0);
        generation
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn summary(&self) -> CacheSummary {
        let mut configured = 0;
        let mut absent = 0;
        for r in self.sites.iter() {
            if r.value().is_configured() {
                configured += 1;
            } else {
                absent += 1;
            }
        }

        CacheSummary {
            sites: configured + absent,
            configured,
            absent,
            generation: self.generation(),
        }
    }
}

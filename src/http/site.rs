//! Site identification from the Host header.
//!
//! # Design Decisions
//! - Host matching is case-insensitive (RFC 9110)
//! - An explicit mapping is tried with the port first, then without
//! - Unmapped hosts are their own site identifier

use axum::http::{header, HeaderMap};
use std::collections::HashMap;

use crate::config::SitesConfig;

#[derive(Debug, Clone, Default)]
pub struct SiteResolver {
    /// Lower-cased host -> site identifier.
    hosts: HashMap<String, String>,
    default_site: Option<String>,
}

impl SiteResolver {
    pub fn from_config(config: &SitesConfig) -> Self {
        Self {
            hosts: config
                .hosts
                .iter()
                .map(|(host, site)| (host.trim().to_lowercase(), site.trim().to_string()))
                .collect(),
            default_site: config.default_site.clone(),
        }
    }

    /// The site a request targets, or `None` if it cannot be determined.
    pub fn resolve(&self, headers: &HeaderMap) -> Option<String> {
        let host = headers
            .get(header::HOST)
            .and_then(|h| h.to_str().ok())
            .map(|h| h.trim().to_lowercase())
            .filter(|h| !h.is_empty());

        match host {
            Some(host) => Some(self.site_for_host(&host)),
            None => self.default_site.clone(),
        }
    }

    fn site_for_host(&self, host: &str) -> String {
        if let Some(site) = self.hosts.get(host) {
            return site.clone();
        }

        let bare = strip_port(host);
        self.hosts
            .get(bare)
            .cloned()
            .unwrap_or_else(|| bare.to_string())
    }
}

/// `example.com:8080` → `example.com`, `[::1]:8080` → `[::1]`.
fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }

    match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_host(host: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_str(host).unwrap());
        headers
    }

    fn resolver() -> SiteResolver {
        let mut config = SitesConfig::default();
        config.hosts.insert("WWW.Example.com".into(), "main".into());
        config.hosts.insert("localhost:3000".into(), "dev".into());
        config.default_site = Some("fallback".into());
        SiteResolver::from_config(&config)
    }

    #[test]
    fn test_mapped_host() {
        let sites = resolver();
        assert_eq!(sites.resolve(&headers_with_host("www.example.com")).as_deref(), Some("main"));
        assert_eq!(sites.resolve(&headers_with_host("WWW.EXAMPLE.COM:8443")).as_deref(), Some("main"));
        assert_eq!(sites.resolve(&headers_with_host("localhost:3000")).as_deref(), Some("dev"));
    }

    #[test]
    fn test_unmapped_host_is_site_id() {
        let sites = resolver();
        assert_eq!(sites.resolve(&headers_with_host("Blog.Example.com:80")).as_deref(), Some("blog.example.com"));
        assert_eq!(sites.resolve(&headers_with_host("localhost:4000")).as_deref(), Some("localhost"));
    }

    #[test]
    fn test_missing_host_uses_default() {
        assert_eq!(resolver().resolve(&HeaderMap::new()).as_deref(), Some("fallback"));
        assert_eq!(SiteResolver::default().resolve(&HeaderMap::new()), None);
    }

    #[test]
    fn test_strip_port() {
        assert_eq!(strip_port("example.com"), "example.com");
        assert_eq!(strip_port("example.com:8080"), "example.com");
        assert_eq!(strip_port("[::1]:8080"), "[::1]");
        assert_eq!(strip_port("[::1"), "[::1");
    }
}

//! Header injection middleware.
//!
//! Resolves the extra headers for the request's path and site, runs the
//! inner service, then sets each header on the response.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::http::site::SiteResolver;
use crate::resolver::HeaderEngine;
use crate::rules::HeaderSet;

/// State required for header injection.
#[derive(Clone)]
pub struct InjectionState {
    pub engine: Arc<HeaderEngine>,
    pub sites: Arc<SiteResolver>,
}

pub async fn header_injection_middleware(
    State(state): State<InjectionState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let site = state.sites.resolve(req.headers());
    let path = req.uri().path().to_string();

    let headers = match site {
        Some(site) => resolve(&state.engine, path, site).await,
        None => None,
    };

    let mut response = next.run(req).await;
    if let Some(headers) = headers {
        apply_headers(response.headers_mut(), &headers);
    }
    response
}

/// Cached sites resolve inline; a miss may hit the store and runs on a blocking thread.
async fn resolve(engine: &Arc<HeaderEngine>, path: String, site: String) -> Option<HeaderSet> {
    if let Some(headers) = engine.resolve_cached(&path, &site) {
        return headers;
    }

    let engine = Arc::clone(engine);
    match tokio::task::spawn_blocking(move || engine.resolve_headers(&path, &site)).await {
        Ok(headers) => headers,
        Err(e) => {
            tracing::error!(error = %e, "Header resolution task failed");
            None
        }
    }
}

/// Set every header on `target`, replacing existing values.
/// Returns how many were applied; invalid names or values are skipped.
pub fn apply_headers(target: &mut HeaderMap, headers: &HeaderSet) -> usize {
    let mut applied = 0;
    for (name, value) in headers.iter() {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                target.insert(name, value);
                applied += 1;
            }
            _ => tracing::warn!(header = name, "Skipping header that is not valid HTTP"),
        }
    }
    applied
}

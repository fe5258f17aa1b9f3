use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::admin::AdminState;
use crate::resolver::CacheSummary;
use crate::rules::HeaderSet;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub app_key: String,
}

#[derive(Serialize)]
pub struct InvalidateResult {
    pub generation: u64,
}

#[derive(Deserialize)]
pub struct ResolveQuery {
    pub site: String,
    pub url: String,
}

#[derive(Serialize)]
pub struct ResolveResult {
    pub site: String,
    pub url: String,
    pub matched: bool,
    pub headers: HeaderSet,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        app_key: state.engine.options().app_key.clone(),
    })
}

pub async fn get_cache(State(state): State<AdminState>) -> Json<CacheSummary> {
    Json(state.engine.cache_summary())
}

pub async fn post_invalidate(State(state): State<AdminState>) -> Json<InvalidateResult> {
    tracing::info!("Cache invalidation requested via admin API");
    let generation = state.engine.invalidate();
    Json(InvalidateResult { generation })
}

pub async fn get_resolve(
    State(state): State<AdminState>,
    Query(query): Query<ResolveQuery>,
) -> Json<ResolveResult> {
    let engine = state.engine.clone();
    let (site, url) = (query.site.clone(), query.url.clone());
    let headers = tokio::task::spawn_blocking(move || engine.resolve_headers(&url, &site))
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Header resolution task failed");
            None
        });

    Json(ResolveResult {
        site: query.site,
        url: query.url,
        matched: headers.is_some(),
        headers: headers.unwrap_or_default(),
    })
}

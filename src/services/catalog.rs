use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::MediaType,
    services::{
        coordinator::Coordinator,
        upstream::{Upstream, UpstreamRequest},
    },
};

/// Proxies catalog documents from the list-rendering service
pub struct CatalogProxy {
    coordinator: Arc<Coordinator>,
    upstream: Arc<dyn Upstream>,
    list_endpoint: String,
    sort: String,
}

impl CatalogProxy {
    pub fn new(
        coordinator: Arc<Coordinator>,
        upstream: Arc<dyn Upstream>,
        list_endpoint: &str,
        sort: &str,
    ) -> Self {
        Self {
            coordinator,
            upstream,
            list_endpoint: list_endpoint.trim_end_matches('/').to_string(),
            sort: sort.to_string(),
        }
    }

    /// Fetches the catalog of `media_type` entries on `username`'s watchlist
    ///
    /// `extra` is a filter token (genre, skip count) passed through to the
    /// upstream path. The body is returned exactly as the upstream sent it.
    pub async fn fetch_catalog(
        &self,
        media_type: MediaType,
        username: &str,
        extra: Option<&str>,
    ) -> AppResult<String> {
        let list_id = self.coordinator.resolve(username).await?;
        let url = self.catalog_url(&list_id, media_type, extra);

        let body = self.upstream.get_text(UpstreamRequest::get(&url)).await?;
        if body.is_empty() {
            return Err(AppError::EmptyResponse(format!(
                "Empty list response from {}",
                url
            )));
        }

        tracing::debug!(
            username = %username,
            list_id = %list_id,
            media_type = %media_type,
            bytes = body.len(),
            "Catalog fetched"
        );

        Ok(body)
    }

    /// `<endpoint>/<list id>/<sort>/catalog/<type>/imdb-<type>-list[/<extra>].json`
    pub fn catalog_url(&self, list_id: &str, media_type: MediaType, extra: Option<&str>) -> String {
        let mut url = format!(
            "{}/{}/{}/catalog/{}/imdb-{}-list",
            self.list_endpoint, list_id, self.sort, media_type, media_type
        );
        if let Some(extra) = extra.filter(|e| !e.is_empty()) {
            url.push('/');
            url.push_str(extra);
        }
        url.push_str(".json");
        url
    }
}

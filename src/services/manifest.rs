use std::sync::Arc;

use crate::{
    cache::ManifestCache,
    error::{AppError, AppResult},
    models::{ListManifest, Manifest},
    services::{
        coordinator::Coordinator,
        upstream::{Upstream, UpstreamRequest},
    },
};

/// Name the list-rendering service reports when a list has no title of its own
pub const GENERIC_LIST_NAME: &str = "IMDB List Add-on";

/// Builds the add-on manifest, branded with the user's list name when known
pub struct ManifestBuilder {
    coordinator: Arc<Coordinator>,
    upstream: Arc<dyn Upstream>,
    cache: ManifestCache,
    template: Manifest,
    list_endpoint: String,
}

impl ManifestBuilder {
    pub fn new(
        coordinator: Arc<Coordinator>,
        upstream: Arc<dyn Upstream>,
        cache: ManifestCache,
        list_endpoint: &str,
    ) -> Self {
        Self {
            coordinator,
            upstream,
            cache,
            template: Manifest::default(),
            list_endpoint: list_endpoint.trim_end_matches('/').to_string(),
        }
    }

    /// The manifest served when personalization is not possible
    pub fn default_manifest(&self) -> &Manifest {
        &self.template
    }

    /// Returns the manifest for `username`. Never fails.
    ///
    /// Any failure along the way falls back to the default manifest, which is
    /// not cached, so later requests try to personalize again.
    pub async fn get_manifest(&self, username: &str) -> Manifest {
        if let Some(manifest) = self.cache.get(username).await {
            return manifest;
        }

        match self.personalize(username).await {
            Ok(Some(manifest)) => {
                self.cache.insert(username, manifest.clone()).await;
                tracing::info!(username = %username, name = %manifest.name, "Personalized manifest");
                manifest
            }
            Ok(None) => self.template.clone(),
            Err(e) => {
                tracing::warn!(username = %username, error = %e, "Serving default manifest");
                self.template.clone()
            }
        }
    }

    async fn personalize(&self, username: &str) -> AppResult<Option<Manifest>> {
        let list_id = self.coordinator.resolve(username).await?;
        let url = format!("{}/{}/manifest.json", self.list_endpoint, list_id);

        let body = self.upstream.get_text(UpstreamRequest::get(url)).await?;
        let list_manifest: ListManifest = serde_json::from_str(&body)
            .map_err(|e| AppError::Fetch(format!("Invalid list manifest: {}", e)))?;

        Ok(list_manifest
            .name
            .filter(|name| !name.is_empty() && name != GENERIC_LIST_NAME)
            .map(|name| self.template.personalized(username, &name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ListIdCache;
    use crate::services::{resolver::IdResolver, upstream::MockUpstream};

    fn create_test_builder(upstream: MockUpstream) -> (ManifestBuilder, ManifestCache) {
        let upstream: Arc<dyn Upstream> = Arc::new(upstream);
        let resolver = IdResolver::new(Arc::clone(&upstream), ListIdCache::new(), "https://m.imdb.com");
        let coordinator = Arc::new(Coordinator::new(Arc::new(resolver)));
        let cache = ManifestCache::new();

        let builder = ManifestBuilder::new(coordinator, upstream, cache.clone(), "https://lists.test");
        (builder, cache)
    }

    /// Mock serving a watchlist page for any user and `list_body` as the list manifest
    fn upstream_with_list(list_body: &'static str, manifest_calls: usize) -> MockUpstream {
        let mut upstream = MockUpstream::new();
        upstream
            .expect_get_text()
            .withf(|req| req.url.ends_with("/watchlist/"))
            .returning(|_| Ok(r#"<meta property="pageId" content="ls000111222">"#.to_string()));
        upstream
            .expect_get_text()
            .withf(|req| req.url == "https://lists.test/ls000111222/manifest.json")
            .times(manifest_calls)
            .returning(move |_| Ok(list_body.to_string()));
        upstream
    }

    #[tokio::test]
    async fn test_personalized_manifest() {
        let (builder, cache) = create_test_builder(upstream_with_list(r#"{"name":"My Watchlist"}"#, 1));

        let manifest = builder.get_manifest("alice").await;

        assert_eq!(manifest.id, "org.imdbwatchlistalice");
        assert_eq!(manifest.name, "My Watchlist");
        assert_eq!(manifest.catalogs.len(), 2);
        assert!(manifest.catalogs.iter().all(|c| c.name == "My Watchlist"));
        assert_eq!(cache.get("alice").await, Some(manifest));
    }

    #[tokio::test]
    async fn test_second_call_is_cache_hit() {
        // times(1) makes a second manifest fetch fail the test
        let (builder, _cache) = create_test_builder(upstream_with_list(r#"{"name":"My Watchlist"}"#, 1));

        let first = builder.get_manifest("alice").await;
        let second = builder.get_manifest("alice").await;

        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn test_generic_name_serves_default() {
        let (builder, cache) =
            create_test_builder(upstream_with_list(r#"{"name":"IMDB List Add-on"}"#, 2));

        assert_eq!(builder.get_manifest("alice").await, Manifest::default());
        // Not cached: the next request asks again
        assert_eq!(builder.get_manifest("alice").await, Manifest::default());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_missing_name_serves_default() {
        let (builder, _cache) = create_test_builder(upstream_with_list(r#"{"id":"x"}"#, 1));
        assert_eq!(builder.get_manifest("alice").await, Manifest::default());
    }

    #[tokio::test]
    async fn test_invalid_list_manifest_serves_default() {
        let (builder, _cache) = create_test_builder(upstream_with_list("<html>oops</html>", 1));
        assert_eq!(builder.get_manifest("alice").await, Manifest::default());
    }

    #[tokio::test]
    async fn test_resolution_failure_serves_default() {
        let mut upstream = MockUpstream::new();
        upstream
            .expect_get_text()
            .times(3)
            .returning(|_| Err(AppError::Fetch("connection refused".to_string())));

        let (builder, cache) = create_test_builder(upstream);

        for _ in 0..3 {
            assert_eq!(&builder.get_manifest("ghost").await, builder.default_manifest());
        }
        assert!(cache.is_empty().await);
    }
}

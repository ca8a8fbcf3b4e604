use std::sync::Arc;

use crate::cache::{ListIdCache, ManifestCache};
use crate::config::Config;
use crate::services::{CatalogProxy, Coordinator, HttpUpstream, IdResolver, ManifestBuilder, Upstream};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub catalogs: Arc<CatalogProxy>,
    pub manifests: Arc<ManifestBuilder>,
    pub list_ids: ListIdCache,
    pub personalized: ManifestCache,
}

impl AppState {
    /// Wires the services against real HTTP upstreams
    pub fn from_config(config: &Config) -> Self {
        Self::new(config, Arc::new(HttpUpstream::new()))
    }

    /// Wires the services against the given upstream
    ///
    /// Both caches start empty and are shared by every clone of the state.
    pub fn new(config: &Config, upstream: Arc<dyn Upstream>) -> Self {
        let list_ids = ListIdCache::new();
        let personalized = ManifestCache::new();

        let resolver = IdResolver::new(Arc::clone(&upstream), list_ids.clone(), &config.imdb_base_url);
        let coordinator = Arc::new(Coordinator::new(Arc::new(resolver)));

        let catalogs = CatalogProxy::new(
            Arc::clone(&coordinator),
            Arc::clone(&upstream),
            &config.list_endpoint,
            &config.list_sort,
        );
        let manifests = ManifestBuilder::new(
            coordinator,
            upstream,
            personalized.clone(),
            &config.list_endpoint,
        );

        Self {
            catalogs: Arc::new(catalogs),
            manifests: Arc::new(manifests),
            list_ids,
            personalized,
        }
    }

    /// Empties both caches
    pub async fn reset_caches(&self) {
        self.list_ids.clear().await;
        self.personalized.clear().await;
    }
}

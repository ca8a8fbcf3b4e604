use std::sync::Arc;

use reqwest::Url;
use scraper::{Html, Selector};

use crate::{
    cache::ListIdCache,
    cached,
    error::{AppError, AppResult},
    services::upstream::{Upstream, UpstreamRequest},
};

/// Every list id understood by the list-rendering service starts with this
pub const LIST_ID_PREFIX: &str = "ls";

const PAGE_ID_SELECTOR: &str = r#"meta[property="pageId"]"#;

/// Scrapes a user's public watchlist page for its internal list id
pub struct IdResolver {
    upstream: Arc<dyn Upstream>,
    cache: ListIdCache,
    imdb_base_url: String,
}

impl IdResolver {
    pub fn new(upstream: Arc<dyn Upstream>, cache: ListIdCache, imdb_base_url: &str) -> Self {
        Self {
            upstream,
            cache,
            imdb_base_url: imdb_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Returns the watchlist id for `username`, scraping IMDB on a cache miss
    ///
    /// Only validated ids are cached. Failures are not, so the next call
    /// scrapes again.
    pub async fn fetch_list_id(&self, username: &str) -> AppResult<String> {
        cached!(self.cache, username, async {
            let request = UpstreamRequest::get(self.user_url(username, &["watchlist", ""])?)
                .with_referer(&self.user_url(username, &[""])?)?;

            let body = self.upstream.get_text(request).await?;
            if body.trim().is_empty() {
                return Err(AppError::Fetch(
                    "Empty html body when requesting list id".to_string(),
                ));
            }

            let list_id = parse_list_id(&body)?;

            tracing::info!(username = %username, list_id = %list_id, "Resolved watchlist id");

            Ok::<String, AppError>(list_id)
        })
    }

    /// `<imdb base>/user/<username>/<tail..>` with the username kept as a
    /// single percent-encoded path segment
    fn user_url(&self, username: &str, tail: &[&str]) -> AppResult<String> {
        // The url crate silently drops these segments when pushing
        if matches!(username, "" | "." | "..") {
            return Err(AppError::Validation(format!("Invalid username: {:?}", username)));
        }

        let mut url = Url::parse(&self.imdb_base_url)
            .map_err(|e| AppError::Validation(format!("Invalid IMDB base url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| AppError::Validation("IMDB base url cannot be a base".to_string()))?
            .pop_if_empty()
            .push("user")
            .push(username)
            .extend(tail);

        Ok(url.into())
    }
}

/// Extracts the list id from the `pageId` meta tag of a watchlist page
pub fn parse_list_id(html: &str) -> AppResult<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(PAGE_ID_SELECTOR)
        .map_err(|e| AppError::Parse(format!("selector: {}", e)))?;

    let mut metas = document.select(&selector);
    let meta = match (metas.next(), metas.next()) {
        (Some(meta), None) => meta,
        _ => return Err(AppError::Parse("page #1".to_string())),
    };

    match meta.value().attr("content") {
        Some(list_id) if list_id.starts_with(LIST_ID_PREFIX) => Ok(list_id.to_string()),
        _ => Err(AppError::Parse("page #2".to_string())),
    }
}

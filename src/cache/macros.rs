/// A macro to simplify read-through caching against a [`MemoryCache`].
///
/// If the key is present, the cached value is returned. Otherwise the block
/// is awaited; on success its value is stored under the key and returned,
/// on failure the error is propagated and nothing is stored.
///
/// Must be used inside a function returning `Result`, since the block's error
/// is forwarded with `?`.
///
/// # Arguments
/// * `$cache`: a `MemoryCache` (or reference to one).
/// * `$key`: the `&str` key to look up and store under.
/// * `$block`: a future producing `Result<V, E>` on a cache miss.
///
/// # Example
/// ```rust,ignore
/// let list_id = cached!(self.cache, username, async move {
///     scrape_list_id(username).await
/// });
/// ```
///
/// [`MemoryCache`]: crate::cache::MemoryCache
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $block:expr) => {{
        if let Some(cached) = $cache.get($key).await {
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.insert($key, ::std::clone::Clone::clone(&value)).await;
            Ok(value)
        }
    }};
}

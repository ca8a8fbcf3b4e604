use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;

use crate::{
    error::{AppError, AppResult},
    services::resolver::IdResolver,
};

type Flight<V> = Shared<BoxFuture<'static, AppResult<V>>>;

/// Collapses concurrent work for the same key into one execution
///
/// The first caller for a key starts the work; callers arriving while it is
/// outstanding await the same shared future and receive a clone of its
/// outcome. A flight removes itself from the map as it completes, so the next
/// call after that starts fresh. Outcomes, including errors, are never kept.
pub struct SingleFlight<V> {
    in_flight: Arc<Mutex<HashMap<String, Flight<V>>>>,
}

impl<V> Default for SingleFlight<V> {
    fn default() -> Self {
        Self {
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<V> SingleFlight<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `work` for `key` unless a flight for `key` is already outstanding
    ///
    /// `work` is only called when this caller starts a new flight.
    pub async fn run<F, Fut>(&self, key: &str, work: F) -> AppResult<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<V>> + Send + 'static,
    {
        let flight = {
            let mut in_flight = self.in_flight.lock().await;
            match in_flight.get(key) {
                Some(flight) => {
                    tracing::debug!(key = %key, "Joining in-flight request");
                    flight.clone()
                }
                None => {
                    let flight = self.start(key, work());
                    in_flight.insert(key.to_string(), flight.clone());
                    flight
                }
            }
        };

        flight.await
    }

    /// Number of flights currently outstanding
    pub async fn in_flight(&self) -> usize {
        self.in_flight.lock().await.len()
    }

    fn start<Fut>(&self, key: &str, work: Fut) -> Flight<V>
    where
        Fut: Future<Output = AppResult<V>> + Send + 'static,
    {
        // Whichever waiter drives the flight to completion also retires it,
        // so a dropped first caller cannot strand a finished result.
        let in_flight = Arc::clone(&self.in_flight);
        let key = key.to_string();

        async move {
            let result = work.await;
            in_flight.lock().await.remove(&key);
            result
        }
        .boxed()
        .shared()
    }
}

/// Resolves usernames to watchlist ids with at most one scrape per username
/// in flight at any time
pub struct Coordinator {
    resolver: Arc<IdResolver>,
    flights: SingleFlight<String>,
}

impl Coordinator {
    pub fn new(resolver: Arc<IdResolver>) -> Self {
        Self {
            resolver,
            flights: SingleFlight::new(),
        }
    }

    /// Returns the watchlist id for `username`
    ///
    /// Any failure comes back as `AppError::Resolve`.
    pub async fn resolve(&self, username: &str) -> AppResult<String> {
        let resolver = Arc::clone(&self.resolver);
        let owned = username.to_string();

        self.flights
            .run(username, move || async move { resolver.fetch_list_id(&owned).await })
            .await
            .map_err(AppError::resolve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ListIdCache;
    use crate::services::upstream::MockUpstream;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_concurrent_runs_share_one_execution() {
        let flights = SingleFlight::<String>::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let runs = (0..8).map(|_| {
            let calls = Arc::clone(&calls);
            flights.run("alice", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok("ls000111222".to_string())
            })
        });

        let results = futures::future::join_all(runs).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(results.iter().all(|r| r.as_deref() == Ok("ls000111222")));
        assert_eq!(flights.in_flight().await, 0);
    }

    #[tokio::test]
    async fn test_shared_failure_is_not_kept() {
        let flights = SingleFlight::<String>::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let failing = |calls: Arc<AtomicUsize>| {
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                Err::<String, _>(AppError::Fetch("timed out".to_string()))
            }
        };

        let (first, second) = tokio::join!(
            flights.run("bob", failing(Arc::clone(&calls))),
            flights.run("bob", failing(Arc::clone(&calls))),
        );
        assert_eq!(first, Err(AppError::Fetch("timed out".to_string())));
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // The failed flight was retired, so this starts a new one
        let third = flights.run("bob", failing(Arc::clone(&calls))).await;
        assert!(third.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_distinct_keys_run_independently() {
        let flights = SingleFlight::<String>::new();

        let (a, b) = tokio::join!(
            flights.run("alice", || async { Ok("ls1".to_string()) }),
            flights.run("bob", || async { Ok("ls2".to_string()) }),
        );

        assert_eq!(a.unwrap(), "ls1");
        assert_eq!(b.unwrap(), "ls2");
    }

    #[tokio::test]
    async fn test_dropped_leader_does_not_strand_flight() {
        let flights = SingleFlight::<String>::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let work = |calls: Arc<AtomicUsize>| {
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok::<_, AppError>("ls1".to_string())
            }
        };

        // Leader gives up before the flight finishes
        let leader = tokio::time::timeout(
            Duration::from_millis(1),
            flights.run("carol", work(Arc::clone(&calls))),
        )
        .await;
        assert!(leader.is_err());
        assert_eq!(flights.in_flight().await, 1);

        // A later caller picks the same flight up and drives it home
        let follower = flights.run("carol", work(Arc::clone(&calls))).await;
        assert_eq!(follower.unwrap(), "ls1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(flights.in_flight().await, 0);
    }

    #[tokio::test]
    async fn test_coordinator_wraps_errors() {
        let mut upstream = MockUpstream::new();
        upstream
            .expect_get_text()
            .times(1)
            .returning(|_| Ok("<html><head></head></html>".to_string()));

        let resolver = IdResolver::new(Arc::new(upstream), ListIdCache::new(), "https://m.imdb.com");
        let coordinator = Coordinator::new(Arc::new(resolver));

        let err = coordinator.resolve("alice").await.unwrap_err();
        assert_eq!(
            err,
            AppError::Resolve(Box::new(AppError::Parse("page #1".to_string())))
        );
    }

    #[tokio::test]
    async fn test_coordinator_populates_cache() {
        let mut upstream = MockUpstream::new();
        upstream.expect_get_text().times(1).returning(|_| {
            Ok(r#"<meta property="pageId" content="ls000111222">"#.to_string())
        });

        let cache = ListIdCache::new();
        let resolver = IdResolver::new(Arc::new(upstream), cache.clone(), "https://m.imdb.com");
        let coordinator = Coordinator::new(Arc::new(resolver));

        assert_eq!(coordinator.resolve("alice").await.unwrap(), "ls000111222");
        assert_eq!(coordinator.resolve("alice").await.unwrap(), "ls000111222");
        assert_eq!(cache.get("alice").await, Some("ls000111222".to_string()));
    }
}

//! Keyed read cache shared by every command
//!
//! One `CacheService` is constructed at startup and passed by reference; there
//! is no module-level singleton. Entries move `Empty -> Fetching -> {Fresh |
//! Failed}`; a Fresh entry never expires unless the caller opts into
//! `refetch_after`, and a Failed entry stays failed until an explicit refetch
//! or invalidation. Concurrent readers of one key coalesce onto a single
//! in-flight transport call.

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::error::ApiError;
use crate::client::request::{ApiClient, RequestDescriptor};

/// What a query does when the backend answers 401
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Unauthorized {
    /// Propagate as an error (default)
    #[default]
    Surface,
    /// Resolve to `None` silently; callers render the signed-out state
    ReturnNone,
}

/// Per-query policy knobs, selected at the call site rather than globally
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryOptions {
    pub on_unauthorized: Unauthorized,
    /// Opt-in staleness: a Fresh entry older than this refetches on the next
    /// read. Absent means entries stay fresh for the whole session.
    pub refetch_after: Option<Duration>,
    /// Bypass whatever is cached and fetch again
    pub force_refetch: bool,
}

enum EntryState {
    Fetching,
    Fresh { value: Arc<Value>, fetched_at: Instant },
    Failed { error: ApiError },
}

pub struct CacheService {
    client: ApiClient,
    entries: Mutex<HashMap<String, EntryState>>,
    resolved: Condvar,
}

impl CacheService {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            entries: Mutex::new(HashMap::new()),
            resolved: Condvar::new(),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// GET through the cache. Returns `Ok(None)` only under the
    /// `ReturnNone` 401 policy.
    pub fn query(&self, resource: &[&str], opts: QueryOptions) -> Result<Option<Arc<Value>>, ApiError> {
        let key = resource.join("/");

        loop {
            let mut entries = self.entries.lock().unwrap();

            if matches!(entries.get(&key), Some(EntryState::Fetching)) {
                // Another caller owns the in-flight request; wait for it to
                // resolve, then re-inspect. Spurious wakeups only cost another
                // loop iteration.
                let guard = self.resolved.wait(entries).unwrap();
                drop(guard);
                continue;
            }

            match entries.get(&key) {
                Some(EntryState::Fresh { value, fetched_at }) => {
                    let stale = opts.refetch_after.is_some_and(|ttl| fetched_at.elapsed() >= ttl);
                    if !opts.force_refetch && !stale {
                        return Ok(Some(Arc::clone(value)));
                    }
                }
                Some(EntryState::Failed { error }) => {
                    if !opts.force_refetch {
                        return resolve_failure(error.clone(), opts);
                    }
                }
                _ => {}
            }

            // Become the fetcher for this key.
            entries.insert(key.clone(), EntryState::Fetching);
            drop(entries);

            log::debug!("cache miss, fetching {}", key);
            let result = self.client.request(&RequestDescriptor::get(resource));

            let mut entries = self.entries.lock().unwrap();
            let outcome = match result {
                Ok(value) => {
                    let value = Arc::new(value);
                    entries.insert(
                        key.clone(),
                        EntryState::Fresh {
                            value: Arc::clone(&value),
                            fetched_at: Instant::now(),
                        },
                    );
                    Ok(Some(value))
                }
                Err(error) => {
                    entries.insert(key.clone(), EntryState::Failed { error: error.clone() });
                    resolve_failure(error, opts)
                }
            };
            drop(entries);
            self.resolved.notify_all();
            return outcome;
        }
    }

    /// `query` plus decode into the endpoint schema
    pub fn query_as<T: DeserializeOwned>(
        &self,
        resource: &[&str],
        opts: QueryOptions,
    ) -> Result<Option<T>, ApiError> {
        match self.query(resource, opts)? {
            None => Ok(None),
            Some(value) => serde_json::from_value((*value).clone())
                .map(Some)
                .map_err(|e| ApiError::Decode {
                    resource: resource.join("/"),
                    detail: e.to_string(),
                }),
        }
    }

    /// Drop cached entries so the next read refetches. An in-flight fetch is
    /// left alone; its waiters still resolve with whatever it returns.
    pub fn invalidate(&self, keys: &[&[&str]]) {
        let mut entries = self.entries.lock().unwrap();
        for key in keys {
            let key = key.join("/");
            if matches!(entries.get(&key), Some(EntryState::Fetching)) {
                log::debug!("invalidate skipped in-flight key {}", key);
            } else if entries.remove(&key).is_some() {
                log::debug!("invalidated {}", key);
            }
        }
    }

    /// Run a mutation and invalidate the cache keys it affects. The
    /// mutation-to-query relationship is declared by the caller; there is no
    /// automatic dependency tracking.
    pub fn mutate(&self, descriptor: &RequestDescriptor, invalidates: &[&[&str]]) -> Result<Value, ApiError> {
        let value = self.client.request(descriptor)?;
        self.invalidate(invalidates);
        Ok(value)
    }
}

fn resolve_failure(error: ApiError, opts: QueryOptions) -> Result<Option<Arc<Value>>, ApiError> {
    if error.is_unauthorized() && opts.on_unauthorized == Unauthorized::ReturnNone {
        Ok(None)
    } else {
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::transport::Transport;
    use crate::client::transport::mock::FixedTransport;

    fn service(transport: Arc<dyn Transport>) -> CacheService {
        CacheService::new(ApiClient::new("http://backend.test", transport))
    }

    #[test]
    fn test_second_read_hits_cache() {
        let transport = Arc::new(FixedTransport::new(200, r#"{"open": 3}"#));
        let cache = service(transport.clone());

        let first = cache.query(&["api", "metrics"], QueryOptions::default()).unwrap();
        let second = cache.query(&["api", "metrics"], QueryOptions::default()).unwrap();

        assert_eq!(transport.call_count(), 1);
        assert_eq!(first, second);
    }

    #[test]
    fn test_concurrent_reads_coalesce() {
        let transport = Arc::new(FixedTransport::with_delay(
            200,
            r#"{"open": 3}"#,
            Duration::from_millis(50),
        ));
        let cache = Arc::new(service(transport.clone()));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || cache.query(&["api", "metrics"], QueryOptions::default()))
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(transport.call_count(), 1);
        let first = results[0].as_ref().unwrap().as_ref().unwrap();
        for result in &results {
            assert_eq!(result.as_ref().unwrap().as_ref().unwrap(), first);
        }
    }

    #[test]
    fn test_invalidate_forces_refetch() {
        let transport = Arc::new(FixedTransport::new(200, r#"[1, 2]"#));
        let cache = service(transport.clone());

        cache.query(&["api", "tickets"], QueryOptions::default()).unwrap();
        cache.invalidate(&[&["api", "tickets"]]);
        cache.query(&["api", "tickets"], QueryOptions::default()).unwrap();

        assert_eq!(transport.call_count(), 2);
    }

    #[test]
    fn test_distinct_keys_fetch_separately() {
        let transport = Arc::new(FixedTransport::new(200, "[]"));
        let cache = service(transport.clone());

        cache.query(&["api", "tickets"], QueryOptions::default()).unwrap();
        cache.query(&["api", "incidents", "active"], QueryOptions::default()).unwrap();

        assert_eq!(transport.call_count(), 2);
    }

    #[test]
    fn test_unauthorized_suppressed_per_query() {
        let transport = Arc::new(FixedTransport::new(401, r#"{"message":"Unauthorized"}"#));
        let cache = service(transport.clone());

        let silenced = cache.query(
            &["api", "user"],
            QueryOptions {
                on_unauthorized: Unauthorized::ReturnNone,
                ..Default::default()
            },
        );
        assert_eq!(silenced.unwrap(), None);

        // same cached failure, surfaced for a caller that did not opt in
        let surfaced = cache.query(&["api", "user"], QueryOptions::default());
        assert_eq!(surfaced.unwrap_err().to_string(), "401: Unauthorized");
        assert_eq!(transport.call_count(), 1);
    }

    #[test]
    fn test_failure_is_sticky_until_forced() {
        let transport = Arc::new(FixedTransport::new(500, r#"{"message":"boom"}"#));
        let cache = service(transport.clone());

        let first = cache.query(&["api", "metrics"], QueryOptions::default());
        assert_eq!(first.unwrap_err().to_string(), "500: boom");

        // repeated reads do not retry
        let second = cache.query(&["api", "metrics"], QueryOptions::default());
        assert_eq!(second.unwrap_err().to_string(), "500: boom");
        assert_eq!(transport.call_count(), 1);

        // explicit refetch does
        let forced = cache.query(
            &["api", "metrics"],
            QueryOptions {
                force_refetch: true,
                ..Default::default()
            },
        );
        assert!(forced.is_err());
        assert_eq!(transport.call_count(), 2);
    }

    #[test]
    fn test_refetch_after_staleness() {
        let transport = Arc::new(FixedTransport::new(200, r#"{"open": 3}"#));
        let cache = service(transport.clone());
        let opts = QueryOptions {
            refetch_after: Some(Duration::ZERO),
            ..Default::default()
        };

        cache.query(&["api", "metrics"], opts).unwrap();
        cache.query(&["api", "metrics"], opts).unwrap();

        // zero staleness window means every read refetches
        assert_eq!(transport.call_count(), 2);
    }

    #[test]
    fn test_mutate_invalidates_declared_keys() {
        let transport = Arc::new(FixedTransport::new(200, r#"{"id": 9}"#));
        let cache = service(transport.clone());

        cache.query(&["api", "tickets"], QueryOptions::default()).unwrap();
        assert_eq!(transport.call_count(), 1);

        let created = cache
            .mutate(
                &RequestDescriptor::post(&["api", "tickets"], serde_json::json!({"title": "vpn down"})),
                &[&["api", "tickets"]],
            )
            .unwrap();
        assert_eq!(created["id"], 9);

        // list refetches after the declared invalidation
        cache.query(&["api", "tickets"], QueryOptions::default()).unwrap();
        assert_eq!(transport.call_count(), 3);
    }

    #[test]
    fn test_query_as_decode_failure() {
        #[derive(Debug, serde::Deserialize)]
        struct Metrics {
            #[allow(dead_code)]
            open: u64,
        }

        let transport = Arc::new(FixedTransport::new(200, r#"{"open": "three"}"#));
        let cache = service(transport);

        let result = cache.query_as::<Metrics>(&["api", "metrics"], QueryOptions::default());
        assert!(matches!(result.unwrap_err(), ApiError::Decode { .. }));
    }
}

use std::{collections::HashMap, future::Future, time::Duration};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::time::Instant;
use tracing::debug;

/*----- */
// Cached response
/*----- */
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cached<V> {
    pub cached: bool,
    pub fetched_at: DateTime<Utc>,
    pub data: V,
}

#[derive(Debug)]
struct Entry<V> {
    stored_at: Instant,
    fetched_at: DateTime<Utc>,
    payload: V,
}

/*----- */
// Ttl Cache
/*----- */
// Read-through cache keyed by logical request name. The lock is never held
// across an await, so two concurrent misses may both go upstream.
#[derive(Debug)]
pub struct TtlCache<V> {
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry<V>>>,
}

impl<V> TtlCache<V>
where
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    // Only entries younger than the ttl are returned
    pub fn get(&self, key: &str) -> Option<Cached<V>> {
        let entries = self.entries.lock();
        let entry = entries.get(key)?;

        (entry.stored_at.elapsed() < self.ttl).then(|| Cached {
            cached: true,
            fetched_at: entry.fetched_at,
            data: entry.payload.clone(),
        })
    }

    pub fn insert(&self, key: &str, payload: V) -> Cached<V> {
        let fetched_at = Utc::now();
        self.entries.lock().insert(
            key.to_string(),
            Entry {
                stored_at: Instant::now(),
                fetched_at,
                payload: payload.clone(),
            },
        );

        Cached {
            cached: false,
            fetched_at,
            data: payload,
        }
    }

    // Failed fetches are passed straight through, the previous entry (fresh or
    // stale) is left untouched and never served in place of the error
    pub async fn get_or_fetch<F, Fut, E>(
        &self,
        key: &str,
        force_refresh: bool,
        fetch: F,
    ) -> Result<Cached<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if !force_refresh {
            if let Some(cached) = self.get(key) {
                debug!(key, "cache hit");
                return Ok(cached);
            }
        }

        debug!(key, force_refresh, "cache miss, fetching");
        let payload = fetch().await?;
        Ok(self.insert(key, payload))
    }
}

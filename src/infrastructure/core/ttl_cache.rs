use std::collections::HashMap;
use std::hash::Hash;
use std::sync::RwLock;
use tokio::time::{Duration, Instant};

/// Key/value cache where every entry expires a fixed time after insertion
pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, (V, Instant)>>,
    ttl: Duration,
}

// Manual Debug implementation: values may be large payloads
impl<K, V> std::fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("ttl", &self.ttl)
            .field("entries", &"<RwLock>")
            .finish()
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Returns a clone of the value if it has not expired yet
    pub fn get(&self, key: &K) -> Option<V> {
        let guard = match self.entries.read() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.get(key).and_then(|(value, inserted_at)| {
            (inserted_at.elapsed() < self.ttl).then(|| value.clone())
        })
    }

    pub fn insert(&self, key: K, value: V) {
        match self.entries.write() {
            Ok(mut guard) => {
                guard.insert(key, (value, Instant::now()));
            }
            Err(poisoned) => {
                tracing::error!("TtlCache: Lock poisoned during write, recovering");
                poisoned.into_inner().insert(key, (value, Instant::now()));
            }
        }
    }

    /// Drops expired entries, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let mut guard = match self.entries.write() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        let before = guard.len();
        let ttl = self.ttl;
        guard.retain(|_, (_, inserted_at)| inserted_at.elapsed() < ttl);
        before - guard.len()
    }

    pub fn len(&self) -> usize {
        match self.entries.read() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

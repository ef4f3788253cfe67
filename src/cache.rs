//! Per-service response cache for non-streaming completions.
//!
//! [`ResponseCache`] is a bounded least-recently-used map from a content
//! hash of (prompt, model, resolved options) to the completed text. Each
//! [`GenerationService`](crate::service::GenerationService) owns one, so
//! caches of distinct models never share entries.
//!
//! Eviction is deterministic: a read promotes the entry to
//! most-recently-used, an overwrite refreshes its position, and inserting
//! beyond capacity drops the single oldest entry. There is no TTL:
//! entries live until evicted or the process exits.
//!
//! Streaming completions are never cached; see the service layer.
//!
//! All access happens inside a short synchronous mutex section with no
//! await points, so a handler's check-then-act sequence (miss, fetch,
//! store) can only interleave with other handlers at its own await
//! points, never mid-mutation.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;

use crate::options::ResolvedOptions;
use crate::telemetry;

/// In-memory LRU cache of completed generations.
pub struct ResponseCache {
    entries: Mutex<LruCache<u64, String>>,
}

impl ResponseCache {
    /// Create a cache holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Look up a cached completion, promoting the entry on hit.
    ///
    /// Emits cache hit/miss counters labelled by model.
    pub fn get(&self, model: &str, prompt: &str, options: &ResolvedOptions) -> Option<String> {
        let key = cache_key(prompt, model, options);
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match entries.get(&key) {
            Some(value) => {
                metrics::counter!(telemetry::CACHE_HITS_TOTAL, "model" => model.to_string())
                    .increment(1);
                Some(value.clone())
            }
            None => {
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "model" => model.to_string())
                    .increment(1);
                None
            }
        }
    }

    /// Insert (or overwrite) a completion, evicting the oldest entry when
    /// the capacity is exceeded.
    pub fn insert(&self, model: &str, prompt: &str, options: &ResolvedOptions, value: String) {
        let key = cache_key(prompt, model, options);
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.put(key, value);
    }

    /// Number of entries currently cached.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Compute a cache key from prompt, model, and resolved options.
///
/// Uses `DefaultHasher` (SipHash): deterministic within a process
/// lifetime, which is sufficient for an in-memory cache.
fn cache_key(prompt: &str, model: &str, options: &ResolvedOptions) -> u64 {
    let mut hasher = DefaultHasher::new();
    prompt.hash(&mut hasher);
    model.hash(&mut hasher);
    options.hash(&mut hasher);
    hasher.finish()
}

use crate::retriever::SubstitutionCandidate;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

/// Bounded query cache with a per-entry TTL.
///
/// Avoids redundant provider calls for repeated spans within a session;
/// entries past their TTL read as absent and are evicted on access.
pub(crate) struct TtlCache {
    entries: LruCache<String, (Instant, Vec<SubstitutionCandidate>)>,
    ttl: Duration,
}

impl TtlCache {
    pub(crate) fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).expect("capacity is at least 1");
        Self {
            entries: LruCache::new(capacity),
            ttl,
        }
    }

    pub(crate) fn get(&mut self, key: &str) -> Option<Vec<SubstitutionCandidate>> {
        match self.entries.get(key) {
            Some((inserted, candidates)) if inserted.elapsed() < self.ttl => {
                Some(candidates.clone())
            }
            Some(_) => {
                self.entries.pop(key);
                None
            }
            None => None,
        }
    }

    pub(crate) fn put(&mut self, key: String, candidates: Vec<SubstitutionCandidate>) {
        self.entries.put(key, (Instant::now(), candidates));
    }
}

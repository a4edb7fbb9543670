use dashmap::DashMap;
use std::time::{Duration, Instant};

use crate::data::types::RawFixture;

/// TTL cache of fetched fixture catalogs, keyed by period. Keeps
/// repeated runs inside the TTL from re-calling the fixture provider.
pub struct FixtureCache {
    cache: DashMap<String, CachedCatalog>,
    ttl: Duration,
}

struct CachedCatalog {
    fixtures: Vec<RawFixture>,
    fetched_at: Instant,
}

impl FixtureCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: DashMap::new(),
            ttl,
        }
    }

    pub fn insert(&self, key: String, fixtures: Vec<RawFixture>) {
        self.cache.insert(
            key,
            CachedCatalog {
                fixtures,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Get a catalog if not expired (evict on read).
    pub fn get(&self, key: &str) -> Option<Vec<RawFixture>> {
        let entry = self.cache.get(key)?;
        if entry.fetched_at.elapsed() > self.ttl {
            drop(entry); // Drop the read lock before evicting
            self.cache.remove(key);
            return None;
        }
        Some(entry.fixtures.clone())
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn fixture(id: &str) -> RawFixture {
        RawFixture {
            id: id.to_string(),
            kickoff: "20:45".to_string(),
            home_team: "Lyon".to_string(),
            away_team: "Monaco".to_string(),
            outright: None,
            handicap: None,
            total_goals: None,
            btts: None,
            corners: None,
            shots: Vec::new(),
        }
    }

    #[test]
    fn test_insert_and_get() {
        let cache = FixtureCache::new(Duration::from_secs(60));
        cache.insert("today".to_string(), vec![fixture("f1")]);

        let catalog = cache.get("today").unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].id, "f1");
    }

    #[test]
    fn test_expired_entries_are_evicted() {
        let cache = FixtureCache::new(Duration::from_millis(50));
        cache.insert("today".to_string(), vec![fixture("f1")]);

        assert!(cache.get("today").is_some());

        thread::sleep(Duration::from_millis(80));

        assert!(cache.get("today").is_none());
        // Evicted on read, not just hidden.
        assert!(cache.is_empty());
    }

    #[test]
    fn test_unknown_key_misses() {
        let cache = FixtureCache::new(Duration::from_secs(60));
        assert!(cache.get("tomorrow").is_none());
    }
}

//! Time-bounded response cache with an injectable clock.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::hash::Hash;

pub const DEFAULT_TTL_MINUTES: i64 = 10;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub trait ResponseCache<K, V>: Send + Sync {
    /// Entry for `key` if it is younger than the TTL at `now`.
    fn get(&self, key: &K, now: DateTime<Utc>) -> Option<V>;
    fn insert(&mut self, key: K, value: V, now: DateTime<Utc>);
    fn remove(&mut self, key: &K) -> Option<V>;
    /// Drop every entry that has expired at `now`, returning how many were removed.
    fn purge_expired(&mut self, now: DateTime<Utc>) -> usize;
}

struct Entry<V> {
    value: V,
    stored_at: DateTime<Utc>,
}

pub struct TtlCache<K, V> {
    entries: HashMap<K, Entry<V>>,
    ttl: Duration,
}

impl<K: Eq + Hash, V> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn is_fresh(&self, stored_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now - stored_at < self.ttl
    }
}

impl<K: Eq + Hash, V> Default for TtlCache<K, V> {
    fn default() -> Self {
        Self::new(Duration::minutes(DEFAULT_TTL_MINUTES))
    }
}

impl<K, V> ResponseCache<K, V> for TtlCache<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    fn get(&self, key: &K, now: DateTime<Utc>) -> Option<V> {
        self.entries
            .get(key)
            .filter(|entry| self.is_fresh(entry.stored_at, now))
            .map(|entry| entry.value.clone())
    }

    fn insert(&mut self, key: K, value: V, now: DateTime<Utc>) {
        self.entries.insert(
            key,
            Entry {
                value,
                stored_at: now,
            },
        );
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|entry| entry.value)
    }

    fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|_, entry| now - entry.stored_at < ttl);
        before - self.entries.len()
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Clock that only moves when told to.
    pub struct FixedClock(Mutex<DateTime<Utc>>);

    impl FixedClock {
        pub fn at(now: DateTime<Utc>) -> Self {
            Self(Mutex::new(now))
        }

        pub fn advance(&self, by: Duration) {
            let mut now = self.0.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FixedClock;
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn entry_is_served_within_ttl() {
        let clock = FixedClock::at(start());
        let mut cache: TtlCache<String, u32> = TtlCache::default();
        cache.insert("28.6139,77.2090".into(), 7, clock.now());

        clock.advance(Duration::minutes(9));
        assert_eq!(cache.get(&"28.6139,77.2090".to_string(), clock.now()), Some(7));

        clock.advance(Duration::minutes(1));
        assert_eq!(cache.get(&"28.6139,77.2090".to_string(), clock.now()), None);
    }

    #[test]
    fn insert_refreshes_timestamp() {
        let clock = FixedClock::at(start());
        let mut cache = TtlCache::new(Duration::minutes(5));
        cache.insert(1, "old", clock.now());
        clock.advance(Duration::minutes(4));
        cache.insert(1, "new", clock.now());
        clock.advance(Duration::minutes(4));
        assert_eq!(cache.get(&1, clock.now()), Some("new"));

        assert_eq!(cache.remove(&1), Some("new"));
        assert_eq!(cache.get(&1, clock.now()), None);
    }

    #[test]
    fn purge_drops_only_expired() {
        let clock = FixedClock::at(start());
        let mut cache = TtlCache::new(Duration::minutes(10));
        cache.insert("a", 1, clock.now());
        clock.advance(Duration::minutes(6));
        cache.insert("b", 2, clock.now());
        clock.advance(Duration::minutes(6));

        assert_eq!(cache.purge_expired(clock.now()), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&"b", clock.now()), Some(2));
    }
}

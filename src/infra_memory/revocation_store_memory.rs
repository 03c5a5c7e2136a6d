use crate::domain_port::*;
use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Process-local revocation store. Entries are evicted lazily on lookup and
/// in bulk by [`MemoryRevocationStore::purge_expired`].
pub struct MemoryRevocationStore {
    entries: DashMap<String, DateTime<Utc>>,
    clock: Arc<dyn Clock>,
}

impl MemoryRevocationStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        MemoryRevocationStore {
            entries: DashMap::new(),
            clock,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry whose deadline has passed. Returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, deadline| *deadline > now);
        let purged = before.saturating_sub(self.entries.len());
        if purged > 0 {
            debug!(purged, "purged expired revocation entries");
        }
        purged
    }
}

#[async_trait::async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn put(&self, key: &str, ttl: Duration) -> Result<(), RevocationStoreError> {
        let ttl = TimeDelta::from_std(ttl)
            .map_err(|e| RevocationStoreError::Unavailable(e.to_string()))?;
        let deadline = self
            .clock
            .now()
            .checked_add_signed(ttl)
            .ok_or_else(|| RevocationStoreError::Unavailable("ttl out of range".to_string()))?;
        self.entries.insert(key.to_string(), deadline);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, RevocationStoreError> {
        let now = self.clock.now();
        let live = match self.entries.get(key) {
            Some(deadline) => *deadline > now,
            None => return Ok(false),
        };
        if !live {
            self.entries.remove_if(key, |_, deadline| *deadline <= now);
        }
        Ok(live)
    }

    async fn delete(&self, key: &str) -> Result<(), RevocationStoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (MemoryRevocationStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        ));
        (MemoryRevocationStore::new(clock.clone()), clock)
    }

    #[tokio::test]
    async fn entry_lives_for_its_ttl() {
        let (store, clock) = store();
        store.put("token-a", Duration::from_secs(60)).await.unwrap();

        assert!(store.exists("token-a").await.unwrap());
        assert!(!store.exists("token-b").await.unwrap());

        clock.advance(TimeDelta::milliseconds(59_999));
        assert!(store.exists("token-a").await.unwrap());

        clock.advance(TimeDelta::milliseconds(1));
        assert!(!store.exists("token-a").await.unwrap());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn delete_removes_entry() {
        let (store, _) = store();
        store.put("token-a", Duration::from_secs(60)).await.unwrap();
        store.delete("token-a").await.unwrap();
        assert!(!store.exists("token-a").await.unwrap());

        store.delete("never-written").await.unwrap();
    }

    #[tokio::test]
    async fn purge_drops_only_expired_entries() {
        let (store, clock) = store();
        store.put("short", Duration::from_secs(10)).await.unwrap();
        store.put("long", Duration::from_secs(1000)).await.unwrap();

        clock.advance(TimeDelta::seconds(11));
        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.exists("long").await.unwrap());
    }
}

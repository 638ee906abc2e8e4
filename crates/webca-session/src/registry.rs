//! Process-wide session registry.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, trace};

use crate::clock::{Clock, SystemClock};
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::record::SessionRecord;

/// Session registry keyed by session identifier.
///
/// Every read hands out an independent copy of the stored record; callers
/// persist changes with [`save`](Self::save). Concurrent saves for the same
/// identifier are last-write-wins.
///
/// Cloning the registry yields another handle to the same store.
#[derive(Clone)]
pub struct SessionRegistry {
    inner: Arc<RwLock<HashMap<String, SessionRecord>>>,
    clock: Arc<dyn Clock>,
    config: SessionConfig,
}

impl SessionRegistry {
    /// Create an empty registry using the wall clock.
    pub fn new(config: SessionConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create an empty registry with a custom time source.
    pub fn with_clock(config: SessionConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            clock,
            config,
        }
    }

    /// Get the registry configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Get the registry's time source.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Get the record for `id`, creating an empty one if absent.
    ///
    /// Refreshes the stored last-used timestamp and returns a copy.
    pub async fn get_or_create(&self, id: &str) -> SessionRecord {
        let now = self.clock.now();
        let mut inner = self.inner.write().await;

        let record = inner.entry(id.to_string()).or_insert_with(|| {
            debug!(session_id = %id, "Creating session");
            SessionRecord::with_id(id)
        });
        record.touch(now);
        trace!(session_id = %id, last_used = ?record.last_used(), "Session touched");
        record.clone()
    }

    /// Store a copy of `record`, replacing any existing entry entirely.
    ///
    /// A record without a last-used stamp (for example one built with
    /// [`SessionRecord::with_id`]) is stamped with the current time, so every
    /// stored record can be checked for expiry.
    pub async fn save(&self, record: &SessionRecord) -> Result<()> {
        let id = record.id().ok_or(Error::MissingId)?.to_string();
        let mut stored = record.clone();
        if stored.last_used().is_none() {
            stored.touch(self.clock.now());
        }

        let mut inner = self.inner.write().await;
        trace!(session_id = %id, keys = stored.len(), "Saving session");
        inner.insert(id, stored);
        Ok(())
    }

    /// Delete the entry for `id`. Absence is not an error.
    pub async fn remove(&self, id: &str) -> Option<SessionRecord> {
        let removed = self.inner.write().await.remove(id);
        if removed.is_some() {
            debug!(session_id = %id, "Session removed");
        }
        removed
    }

    /// Evict every session idle for at least `max_age`.
    ///
    /// Returns the number of evicted sessions.
    ///
    /// # Panics
    ///
    /// Panics if a stored record has no last-used timestamp.
    pub async fn sweep(&self) -> usize {
        let now = self.clock.now();
        let max_age = self.config.max_age;
        let mut inner = self.inner.write().await;

        let before = inner.len();
        inner.retain(|id, record| {
            let expired = record.is_expired(now, max_age);
            if expired {
                info!(session_id = %id, "Session has expired, removing");
            }
            !expired
        });
        let count = before - inner.len();

        if count > 0 {
            debug!(count, remaining = inner.len(), "Swept expired sessions");
        }

        count
    }

    /// Copy of the record for `id` without refreshing its timestamp.
    pub async fn peek(&self, id: &str) -> Option<SessionRecord> {
        self.inner.read().await.get(id).cloned()
    }

    /// Check if a session exists (without refreshing it).
    pub async fn contains(&self, id: &str) -> bool {
        self.inner.read().await.contains_key(id)
    }

    /// Get the current number of sessions.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the registry is empty.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// List all session identifiers.
    pub async fn ids(&self) -> Vec<String> {
        self.inner.read().await.keys().cloned().collect()
    }
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::record::SESSION_ID_KEY;
    use crate::value::{LoggedUser, SessionValue};
    use chrono::Utc;

    fn registry_with_clock() -> (SessionRegistry, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let registry = SessionRegistry::with_clock(SessionConfig::default(), clock.clone());
        (registry, clock)
    }

    #[tokio::test]
    async fn test_get_or_create_creates_empty_record() {
        let (registry, clock) = registry_with_clock();

        let record = registry.get_or_create("abc123").await;

        assert_eq!(record.id(), Some("abc123"));
        assert_eq!(record.last_used(), Some(clock.now()));
        assert_eq!(record.payload().count(), 0);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let (registry, clock) = registry_with_clock();

        let first = registry.get_or_create("abc123").await;
        clock.advance(chrono::Duration::seconds(3));
        let second = registry.get_or_create("abc123").await;

        assert_eq!(registry.len().await, 1);
        assert!(second.last_used() >= first.last_used());
        assert_eq!(second.get(SESSION_ID_KEY), first.get(SESSION_ID_KEY));
        assert_eq!(second.payload().count(), first.payload().count());
    }

    #[tokio::test]
    async fn test_lookup_refreshes_timestamp() {
        let (registry, clock) = registry_with_clock();
        let created = registry.get_or_create("abc123").await;

        clock.advance(chrono::Duration::minutes(10));
        registry.get_or_create("abc123").await;

        let stored = registry.peek("abc123").await.unwrap();
        assert_eq!(
            stored.last_used().unwrap() - created.last_used().unwrap(),
            chrono::Duration::minutes(10)
        );
    }

    #[tokio::test]
    async fn test_copy_isolation() {
        let (registry, _clock) = registry_with_clock();

        let mut mine = registry.get_or_create("abc123").await;
        mine.insert("draft", "unsaved").unwrap();

        let theirs = registry.get_or_create("abc123").await;
        assert!(theirs.get("draft").is_none());
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let (registry, _clock) = registry_with_clock();

        let mut record = registry.get_or_create("abc123").await;
        record.insert("step", 1i64).unwrap();
        record.set_logged_user(LoggedUser::new("admin", "Admin", "admin@example.com"));
        registry.save(&record).await.unwrap();

        let reloaded = registry.get_or_create("abc123").await;
        assert_eq!(reloaded.get("step"), Some(&SessionValue::Integer(1)));
        assert_eq!(reloaded.logged_user().unwrap().username, "admin");

        // Full replacement, not a merge.
        let mut replacement = reloaded.clone();
        replacement.remove("step").unwrap();
        registry.save(&replacement).await.unwrap();

        let reloaded = registry.get_or_create("abc123").await;
        assert!(reloaded.get("step").is_none());
        assert!(reloaded.logged_user().is_some());
    }

    #[tokio::test]
    async fn test_save_last_write_wins() {
        let (registry, _clock) = registry_with_clock();

        let mut a = registry.get_or_create("abc123").await;
        let mut b = registry.get_or_create("abc123").await;
        a.insert("tab", "a").unwrap();
        b.insert("tab", "b").unwrap();

        registry.save(&a).await.unwrap();
        registry.save(&b).await.unwrap();

        let stored = registry.peek("abc123").await.unwrap();
        assert_eq!(stored.get("tab").and_then(SessionValue::as_text), Some("b"));
    }

    #[tokio::test]
    async fn test_save_without_id_fails() {
        let (registry, _clock) = registry_with_clock();

        let err = registry.save(&SessionRecord::new()).await.unwrap_err();
        assert!(matches!(err, Error::MissingId));
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_remove() {
        let (registry, _clock) = registry_with_clock();

        let mut record = registry.get_or_create("abc123").await;
        record.insert("cn", "example.org").unwrap();
        registry.save(&record).await.unwrap();

        assert!(registry.remove("abc123").await.is_some());
        assert!(registry.remove("abc123").await.is_none());
        assert!(!registry.contains("abc123").await);

        let fresh = registry.get_or_create("abc123").await;
        assert!(fresh.get("cn").is_none());
    }

    #[tokio::test]
    async fn test_sweep_expiration_boundary() {
        let (registry, clock) = registry_with_clock();
        let start = clock.now();

        clock.set(start - chrono::Duration::minutes(30) - chrono::Duration::seconds(1));
        registry.get_or_create("stale").await;

        clock.set(start - chrono::Duration::minutes(29));
        registry.get_or_create("fresh").await;

        clock.set(start);
        let evicted = registry.sweep().await;

        assert_eq!(evicted, 1);
        assert!(!registry.contains("stale").await);
        assert!(registry.contains("fresh").await);
    }

    #[tokio::test]
    async fn test_sweep_empty_registry() {
        let (registry, _clock) = registry_with_clock();
        assert_eq!(registry.sweep().await, 0);
    }

    #[tokio::test]
    async fn test_save_stamps_missing_timestamp() {
        let (registry, clock) = registry_with_clock();

        registry.save(&SessionRecord::with_id("built")).await.unwrap();

        let stored = registry.peek("built").await.unwrap();
        assert_eq!(stored.last_used(), Some(clock.now()));
        assert_eq!(registry.sweep().await, 0);

        clock.advance(chrono::Duration::minutes(30));
        assert_eq!(registry.sweep().await, 1);
    }

    #[tokio::test]
    #[should_panic(expected = "has no goLastUsed timestamp")]
    async fn test_sweep_panics_on_missing_timestamp() {
        let (registry, _clock) = registry_with_clock();
        registry
            .inner
            .write()
            .await
            .insert("broken".to_string(), SessionRecord::with_id("broken"));
        registry.sweep().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_access_keeps_invariants() {
        let (registry, clock) = registry_with_clock();
        let now = clock.now();

        clock.set(now - chrono::Duration::minutes(31));
        for i in 0..4 {
            registry.get_or_create(&format!("stale{i}")).await;
        }
        clock.set(now);

        let mut writers = Vec::new();
        for task in 0..8 {
            let registry = registry.clone();
            writers.push(tokio::spawn(async move {
                let id = format!("live{}", task % 4);
                for n in 0..50i64 {
                    let mut record = registry.get_or_create(&id).await;
                    record.insert(format!("task{task}"), n).unwrap();
                    registry.save(&record).await.unwrap();
                    tokio::task::yield_now().await;
                }
            }));
        }

        let mut sweepers = Vec::new();
        for _ in 0..4 {
            let registry = registry.clone();
            sweepers.push(tokio::spawn(async move {
                let mut evicted = 0;
                for _ in 0..50 {
                    evicted += registry.sweep().await;
                    tokio::task::yield_now().await;
                }
                evicted
            }));
        }

        for writer in writers {
            writer.await.unwrap();
        }
        let mut evicted = 0;
        for sweeper in sweepers {
            evicted += sweeper.await.unwrap();
        }

        // Each stale session is evicted exactly once.
        assert_eq!(evicted, 4);

        let mut ids = registry.ids().await;
        ids.sort();
        assert_eq!(ids, vec!["live0", "live1", "live2", "live3"]);
        for id in &ids {
            let record = registry.peek(id).await.unwrap();
            assert_eq!(record.id(), Some(id.as_str()));
            assert!(record.last_used().is_some());
        }
    }
}

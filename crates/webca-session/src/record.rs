//! Session records: a keyed bag of typed values.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::value::{LoggedUser, SessionValue};

/// Reserved key holding the session identifier.
pub const SESSION_ID_KEY: &str = "goSessionId";

/// Reserved key holding the last-used timestamp.
pub const LAST_USED_KEY: &str = "goLastUsed";

/// Key under which the logged-in user is stored.
pub const LOGGED_USER_KEY: &str = "LoggedUser";

/// Check whether a key is managed by the registry rather than callers.
pub fn is_reserved(key: &str) -> bool {
    key == SESSION_ID_KEY || key == LAST_USED_KEY
}

/// Keys callers cannot reach through `insert`/`remove`: the reserved keys
/// plus the logged-in user, which has dedicated accessors.
fn is_protected(key: &str) -> bool {
    is_reserved(key) || key == LOGGED_USER_KEY
}

/// Per-session state.
///
/// Records handed out by the registry are independent copies. Changes made
/// to them stay local until passed to
/// [`SessionRegistry::save`](crate::SessionRegistry::save).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionRecord {
    values: HashMap<String, SessionValue>,
}

impl SessionRecord {
    /// Create a detached record without an identifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record carrying only the given identifier.
    pub fn with_id(id: impl Into<String>) -> Self {
        let mut values = HashMap::new();
        values.insert(SESSION_ID_KEY.to_string(), SessionValue::Text(id.into()));
        Self { values }
    }

    /// Session identifier, if assigned.
    pub fn id(&self) -> Option<&str> {
        self.values.get(SESSION_ID_KEY).and_then(SessionValue::as_text)
    }

    /// Time of the most recent registry lookup.
    pub fn last_used(&self) -> Option<DateTime<Utc>> {
        self.values
            .get(LAST_USED_KEY)
            .and_then(SessionValue::as_timestamp)
    }

    /// Stamp the record as used at `now`. The stamp never moves backwards.
    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        let stamp = match self.last_used() {
            Some(prev) if prev > now => prev,
            _ => now,
        };
        self.values
            .insert(LAST_USED_KEY.to_string(), SessionValue::Timestamp(stamp));
    }

    pub fn get(&self, key: &str) -> Option<&SessionValue> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Store a value, returning the previous one.
    ///
    /// Reserved keys and [`LOGGED_USER_KEY`] are rejected with
    /// [`Error::ReservedKey`]; use [`set_logged_user`](Self::set_logged_user)
    /// for the latter.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<SessionValue>,
    ) -> Result<Option<SessionValue>> {
        let key = key.into();
        if is_protected(&key) {
            return Err(Error::ReservedKey(key));
        }
        Ok(self.values.insert(key, value.into()))
    }

    /// Remove a value, returning it if present. Rejects the same keys as
    /// [`insert`](Self::insert).
    pub fn remove(&mut self, key: &str) -> Result<Option<SessionValue>> {
        if is_protected(key) {
            return Err(Error::ReservedKey(key.to_string()));
        }
        Ok(self.values.remove(key))
    }

    /// Iterate over caller-owned entries (reserved keys and the logged-in
    /// user excluded).
    pub fn payload(&self) -> impl Iterator<Item = (&str, &SessionValue)> {
        self.values
            .iter()
            .filter(|(k, _)| !is_protected(k))
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Logged-in user, if the session is authenticated.
    pub fn logged_user(&self) -> Option<&LoggedUser> {
        self.values.get(LOGGED_USER_KEY).and_then(SessionValue::as_user)
    }

    pub fn set_logged_user(&mut self, user: LoggedUser) {
        self.values
            .insert(LOGGED_USER_KEY.to_string(), SessionValue::User(user));
    }

    pub fn clear_logged_user(&mut self) -> Option<LoggedUser> {
        match self.values.remove(LOGGED_USER_KEY) {
            Some(SessionValue::User(u)) => Some(u),
            _ => None,
        }
    }

    /// Number of entries, reserved keys included.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether the record has been idle for at least `max_age` at `now`.
    ///
    /// # Panics
    ///
    /// Panics if the record has no last-used timestamp. Every record the
    /// registry creates is stamped, so a missing stamp is a bug elsewhere.
    pub fn is_expired(&self, now: DateTime<Utc>, max_age: std::time::Duration) -> bool {
        let Some(last_used) = self.last_used() else {
            panic!(
                "session {} has no {LAST_USED_KEY} timestamp",
                self.id().unwrap_or("<unidentified>")
            );
        };
        let idle = now.signed_duration_since(last_used);
        match chrono::Duration::from_std(max_age) {
            Ok(max_age) => idle >= max_age,
            // Out-of-range lifetimes never expire.
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_with_id() {
        let record = SessionRecord::with_id("abc123");
        assert_eq!(record.id(), Some("abc123"));
        assert_eq!(record.last_used(), None);
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_detached_record_has_no_id() {
        assert_eq!(SessionRecord::new().id(), None);
    }

    #[test]
    fn test_reserved_keys_rejected() {
        let mut record = SessionRecord::with_id("abc123");

        let err = record.insert(SESSION_ID_KEY, "other").unwrap_err();
        assert!(matches!(err, Error::ReservedKey(k) if k == SESSION_ID_KEY));

        assert!(record.insert(LAST_USED_KEY, 5i64).is_err());
        assert!(record.remove(SESSION_ID_KEY).is_err());
        assert_eq!(record.id(), Some("abc123"));
    }

    #[test]
    fn test_insert_and_remove_payload() {
        let mut record = SessionRecord::with_id("abc123");

        assert_eq!(record.insert("step", 2i64).unwrap(), None);
        assert_eq!(
            record.insert("step", 3i64).unwrap(),
            Some(SessionValue::Integer(2))
        );
        assert_eq!(record.get("step").and_then(SessionValue::as_integer), Some(3));

        assert_eq!(record.remove("step").unwrap(), Some(SessionValue::Integer(3)));
        assert_eq!(record.remove("step").unwrap(), None);
    }

    #[test]
    fn test_payload_skips_reserved() {
        let mut record = SessionRecord::with_id("abc123");
        record.touch(Utc::now());
        record.insert("cn", "example.org").unwrap();

        let keys: Vec<&str> = record.payload().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["cn"]);
    }

    #[test]
    fn test_logged_user_key_only_through_accessors() {
        let mut record = SessionRecord::with_id("abc123");
        record.set_logged_user(LoggedUser::new("admin", "Admin", "admin@example.com"));

        let err = record.insert(LOGGED_USER_KEY, "someone").unwrap_err();
        assert!(matches!(err, Error::ReservedKey(k) if k == LOGGED_USER_KEY));
        assert!(record.remove(LOGGED_USER_KEY).is_err());

        assert_eq!(record.logged_user().unwrap().username, "admin");
        assert_eq!(record.payload().count(), 0);
    }

    #[test]
    fn test_logged_user_roundtrip() {
        let mut record = SessionRecord::with_id("abc123");
        assert!(record.logged_user().is_none());

        record.set_logged_user(LoggedUser::new("admin", "Admin", "admin@example.com"));
        assert_eq!(record.logged_user().unwrap().username, "admin");

        let cleared = record.clear_logged_user();
        assert_eq!(cleared.unwrap().username, "admin");
        assert!(record.logged_user().is_none());
    }

    #[test]
    fn test_touch_never_moves_backwards() {
        let mut record = SessionRecord::with_id("abc123");
        let later = Utc::now();
        let earlier = later - chrono::Duration::seconds(10);

        record.touch(later);
        record.touch(earlier);

        assert_eq!(record.last_used(), Some(later));
    }

    #[test]
    fn test_clone_is_independent() {
        let mut original = SessionRecord::with_id("abc123");
        original.insert("draft", serde_json::json!({"cn": "a"})).unwrap();

        let mut copy = original.clone();
        copy.insert("draft", serde_json::json!({"cn": "b"})).unwrap();

        assert_eq!(
            original.get("draft").and_then(SessionValue::as_json),
            Some(&serde_json::json!({"cn": "a"}))
        );
    }

    #[test]
    fn test_expiration_boundary() {
        let now = Utc::now();
        let max_age = Duration::from_secs(30 * 60);

        let mut stale = SessionRecord::with_id("stale");
        stale.touch(now - chrono::Duration::seconds(30 * 60 + 1));
        assert!(stale.is_expired(now, max_age));

        let mut exact = SessionRecord::with_id("exact");
        exact.touch(now - chrono::Duration::seconds(30 * 60));
        assert!(exact.is_expired(now, max_age));

        let mut fresh = SessionRecord::with_id("fresh");
        fresh.touch(now - chrono::Duration::minutes(29));
        assert!(!fresh.is_expired(now, max_age));
    }

    #[test]
    #[should_panic(expected = "has no goLastUsed timestamp")]
    fn test_expiry_without_timestamp_panics() {
        let record = SessionRecord::with_id("abc123");
        record.is_expired(Utc::now(), Duration::from_secs(60));
    }
}

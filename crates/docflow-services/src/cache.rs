//! Process-wide TTL cache for read-heavy query results.
//!
//! Entries live in process memory only; the document store remains the
//! source of truth and every cached value is advisory. Expiry is checked
//! lazily on read, there is no background sweep. Writing `None` or a zero
//! TTL is the invalidation idiom.

use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use uuid::Uuid;

struct Entry {
    value: JsonValue,
    expires_at: Instant,
}

/// Keyed JSON cache, safe for concurrent use within one process. Constructed
/// once at startup and handed to the services that need it.
#[derive(Default)]
pub struct Cache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `key`. An expired or absent entry is a miss, never an error;
    /// expired entries are dropped on the way out.
    pub fn get(&self, key: &str) -> Option<JsonValue> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store `value` under `key` for `ttl`. A `None` value or zero TTL
    /// removes the entry immediately.
    pub fn set(&self, key: &str, value: Option<JsonValue>, ttl: Duration) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match value {
            Some(value) if !ttl.is_zero() && value != JsonValue::Null => {
                entries.insert(
                    key.to_string(),
                    Entry {
                        value,
                        expires_at: Instant::now() + ttl,
                    },
                );
            }
            _ => {
                entries.remove(key);
            }
        }
    }

    pub fn invalidate(&self, key: &str) {
        self.set(key, None, Duration::ZERO);
    }
}

/// Cache key for a user's file listing.
pub fn user_files_key(user_id: Uuid) -> String {
    format!("files:user:{}", user_id)
}

/// Cache key for a single file record.
pub fn file_key(file_id: Uuid) -> String {
    format!("files:id:{}", file_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_then_get_within_ttl() {
        let cache = Cache::new();
        cache.set("k", Some(json!({"a": 1})), Duration::from_secs(60));
        assert_eq!(cache.get("k"), Some(json!({"a": 1})));
    }

    #[test]
    fn test_get_after_expiry_is_a_miss() {
        let cache = Cache::new();
        cache.set("k", Some(json!(1)), Duration::from_millis(10));
        std::thread::sleep(Duration::from_millis(25));
        assert_eq!(cache.get("k"), None);
        // the expired entry is gone, not just hidden
        assert!(cache.entries.lock().unwrap().is_empty());
    }

    #[test]
    fn test_zero_ttl_invalidates_regardless_of_prior_state() {
        let cache = Cache::new();
        cache.set("k", Some(json!("v")), Duration::from_secs(60));
        cache.set("k", Some(json!("v2")), Duration::ZERO);
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn test_none_value_invalidates() {
        let cache = Cache::new();
        cache.set("k", Some(json!("v")), Duration::from_secs(60));
        cache.set("k", None, Duration::from_secs(60));
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn test_null_value_invalidates() {
        let cache = Cache::new();
        cache.set("k", Some(json!("v")), Duration::from_secs(60));
        cache.set("k", Some(JsonValue::Null), Duration::from_secs(60));
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn test_invalidate_missing_key_is_harmless() {
        let cache = Cache::new();
        cache.invalidate("never-set");
        assert_eq!(cache.get("never-set"), None);
    }

    #[test]
    fn test_key_builders_are_distinct_per_id() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_ne!(user_files_key(a), user_files_key(b));
        assert_ne!(user_files_key(a), file_key(a));
    }
}

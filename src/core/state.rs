//! Shared run state
//!
//! `SharedState` is the side channel that tools and agents of a single run
//! use to pass data to each other. The orchestrator owns it; everyone else
//! holds a clone of the `Arc` handed to them at construction time.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::error::FrameworkResult;

/// Value type stored in the shared state
///
/// Any JSON shape is accepted. Callers are responsible for knowing what they
/// stored under each key.
pub type StateValue = Value;

/// Reference to the shared state of a run, as injected into tools and agents
pub type SharedStateRef = Arc<SharedState>;

/// Run-scoped, concurrency-safe key-value store
///
/// Every operation takes the lock exactly once, so no caller can observe a
/// partially applied write. Writers to the same key race; the last one to
/// acquire the lock wins.
///
/// # Example
///
/// ```ignore
/// let state = Arc::new(SharedState::new());
/// state.set("context", "Paris is the capital of France");
///
/// match state.get_str("context") {
///     Some(context) => println!("{}", context),
///     None => println!("context has not been stored yet"),
/// }
/// ```
#[derive(Default)]
pub struct SharedState {
    entries: RwLock<HashMap<String, StateValue>>,
}

impl SharedState {
    /// Create an empty state
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Create an empty state already wrapped for sharing
    pub fn shared() -> SharedStateRef {
        Arc::new(Self::new())
    }

    /// Insert or overwrite the value stored under `key`
    pub fn set(&self, key: impl Into<String>, value: impl Into<StateValue>) {
        let key = key.into();
        tracing::trace!("[SharedState] set '{}'", key);
        self.entries.write().insert(key, value.into());
    }

    /// Get a copy of the value stored under `key`
    ///
    /// Returns `None` if the key was never set (or was removed). Absence is a
    /// normal condition, not an error.
    pub fn get(&self, key: &str) -> Option<StateValue> {
        let value = self.entries.read().get(key).cloned();
        tracing::trace!("[SharedState] get '{}' (present: {})", key, value.is_some());
        value
    }

    /// Get a string value
    ///
    /// Returns `None` if the key is absent or holds a non-string value.
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::to_string)
    }

    /// Serialize `value` and store it under `key`
    pub fn set_as<T: Serialize + ?Sized>(&self, key: impl Into<String>, value: &T) -> FrameworkResult<()> {
        let value = serde_json::to_value(value)?;
        self.set(key, value);
        Ok(())
    }

    /// Get the value under `key` deserialized as `T`
    ///
    /// Absence is `Ok(None)`. A present value that does not fit `T` is a
    /// serialization error.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> FrameworkResult<Option<T>> {
        match self.get(key) {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Atomically compute a new value for `key` from its current one
    ///
    /// `f` runs with no lock held, so it may read or write other keys of this
    /// store. If `key` changed while `f` was running, `f` is called again with
    /// the newer value. A closure that itself writes `key` therefore never
    /// settles. Returns the value that was stored.
    pub fn update<F>(&self, key: impl Into<String>, mut f: F) -> StateValue
    where
        F: FnMut(Option<&StateValue>) -> StateValue,
    {
        let key = key.into();
        loop {
            let current = self.entries.read().get(&key).cloned();
            let next = f(current.as_ref());

            let mut entries = self.entries.write();
            if entries.get(&key) == current.as_ref() {
                tracing::trace!("[SharedState] update '{}'", key);
                entries.insert(key, next.clone());
                return next;
            }
            tracing::trace!("[SharedState] update '{}' raced, retrying", key);
        }
    }

    /// Remove the value stored under `key`
    pub fn remove(&self, key: &str) -> Option<StateValue> {
        tracing::trace!("[SharedState] remove '{}'", key);
        self.entries.write().remove(key)
    }

    /// Remove every entry
    pub fn clear(&self) {
        tracing::trace!("[SharedState] clear");
        self.entries.write().clear();
    }

    /// Check if a value is stored under `key`
    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the state holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// All keys currently stored, in no particular order
    pub fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    /// Copy of every entry at this instant
    pub fn snapshot(&self) -> HashMap<String, StateValue> {
        self.entries.read().clone()
    }
}

impl fmt::Debug for SharedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedState")
            .field("count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn test_set_then_get() {
        let state = SharedState::new();
        state.set("context", "Paris is the capital of France");

        assert_eq!(
            state.get("context"),
            Some(json!("Paris is the capital of France"))
        );
        assert_eq!(
            state.get_str("context").as_deref(),
            Some("Paris is the capital of France")
        );
    }

    #[test]
    fn test_fresh_state_is_absent() {
        let state = SharedState::new();
        assert!(state.get("context").is_none());
        assert!(!state.contains("context"));
        assert!(state.is_empty());
    }

    #[test]
    fn test_overwrite() {
        let state = SharedState::new();
        state.set("k", 1);
        state.set("k", json!({"nested": [1, 2]}));

        assert_eq!(state.get("k"), Some(json!({"nested": [1, 2]})));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_repeated_set_is_idempotent() {
        let once = SharedState::new();
        once.set("k", "v");

        let twice = SharedState::new();
        twice.set("k", "v");
        twice.set("k", "v");

        assert_eq!(once.snapshot(), twice.snapshot());
    }

    #[test]
    fn test_keys_are_isolated() {
        let state = SharedState::new();
        state.set("a", "first");
        state.set("b", "second");

        assert_eq!(state.get_str("a").as_deref(), Some("first"));
        assert_eq!(state.get_str("b").as_deref(), Some("second"));
        assert!(state.get("c").is_none());
    }

    #[test]
    fn test_get_str_on_non_string() {
        let state = SharedState::new();
        state.set("count", 3);
        assert!(state.get_str("count").is_none());
        assert_eq!(state.get("count"), Some(json!(3)));
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Booking {
        city: String,
        nights: u32,
    }

    #[test]
    fn test_typed_roundtrip() {
        let state = SharedState::new();
        let booking = Booking {
            city: "Paris".into(),
            nights: 2,
        };
        state.set_as("booking", &booking).unwrap();

        let loaded: Option<Booking> = state.get_as("booking").unwrap();
        assert_eq!(loaded, Some(booking));

        let missing: Option<Booking> = state.get_as("nothing").unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_typed_get_wrong_shape() {
        let state = SharedState::new();
        state.set("booking", "not a booking");
        assert!(state.get_as::<Booking>("booking").is_err());
    }

    #[test]
    fn test_update_counter() {
        let state = SharedState::new();
        for _ in 0..3 {
            state.update("hits", |v| json!(v.and_then(|v| v.as_u64()).unwrap_or(0) + 1));
        }
        assert_eq!(state.get("hits"), Some(json!(3)));
    }

    #[test]
    fn test_update_closure_can_use_the_store() {
        let state = SharedState::shared();
        state.set("base", 40);

        let (tx, rx) = std::sync::mpsc::channel();
        let worker = state.clone();
        std::thread::spawn(move || {
            let next = worker.update("n", |_| {
                let base = worker.get("base").and_then(|v| v.as_u64()).unwrap_or(0);
                worker.set("seen_len", worker.len());
                json!(base + 2)
            });
            let _ = tx.send(next);
        });

        let next = rx
            .recv_timeout(std::time::Duration::from_secs(2))
            .expect("update did not finish");
        assert_eq!(next, json!(42));
        assert_eq!(state.get("n"), Some(json!(42)));
        assert_eq!(state.get("seen_len"), Some(json!(1)));
    }

    #[test]
    fn test_remove_and_clear() {
        let state = SharedState::new();
        state.set("a", 1);
        state.set("b", 2);

        assert_eq!(state.remove("a"), Some(json!(1)));
        assert!(state.remove("a").is_none());
        assert_eq!(state.keys(), vec!["b".to_string()]);

        state.clear();
        assert!(state.is_empty());
    }

    #[test]
    fn test_concurrent_writers_same_key() {
        let state = SharedState::shared();
        let long_a = "a".repeat(4096);
        let long_b = "b".repeat(4096);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let state = state.clone();
                let value = if i % 2 == 0 { long_a.clone() } else { long_b.clone() };
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        state.set("shared", value.as_str());
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let value = state.get_str("shared").unwrap();
        assert!(value == long_a || value == long_b);
    }

    #[test]
    fn test_concurrent_update_loses_nothing() {
        let state = SharedState::shared();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let state = state.clone();
                std::thread::spawn(move || {
                    for _ in 0..250 {
                        state.update("n", |v| json!(v.and_then(|v| v.as_u64()).unwrap_or(0) + 1));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(state.get("n"), Some(json!(1000)));
    }
}

//! Session payload

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Key under which `SessionStore::load` exposes the session id.
pub const ID_KEY: &str = "id";

type Value = Arc<dyn Any + Send + Sync>;

/// String-keyed bag of shared values attached to a session.
///
/// Values are reference counted, so cloning a payload never copies the data
/// behind it (a decrypted database, for example).
#[derive(Clone, Default)]
pub struct Payload {
    values: HashMap<String, Value>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with<T: Any + Send + Sync>(mut self, key: impl Into<String>, value: T) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.values.insert(key.into(), Arc::new(value));
    }

    /// Inserts an already shared value without wrapping it again.
    pub fn insert_shared<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: Arc<T>) {
        self.values.insert(key.into(), value);
    }

    /// Typed lookup. `None` when the key is missing or holds another type.
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<&T> {
        self.values.get(key)?.downcast_ref::<T>()
    }

    pub fn get_shared<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        self.values.get(key)?.clone().downcast::<T>().ok()
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Session id merged in by `SessionStore::load`.
    pub fn id(&self) -> Option<&str> {
        self.get::<String>(ID_KEY).map(String::as_str)
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        f.debug_struct("Payload").field("keys", &keys).finish()
    }
}

//! In-memory device key-value store.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::lock;
use crate::domain::ports::{LocalKeyValueStore, LocalStoreError};

/// String values keyed by name, lost when the process exits.
#[derive(Debug, Default)]
pub struct InMemoryKeyValueStore {
    values: Mutex<HashMap<String, String>>,
}

impl InMemoryKeyValueStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocalKeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, LocalStoreError> {
        Ok(lock(&self.values).get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError> {
        lock(&self.values).insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn set_overwrites_previous_value() {
        let store = InMemoryKeyValueStore::new();
        assert_eq!(store.get("avatarUri").await.expect("get"), None);
        store.set("avatarUri", "/a.png").await.expect("set");
        store.set("avatarUri", "/b.png").await.expect("set");
        assert_eq!(
            store.get("avatarUri").await.expect("get").as_deref(),
            Some("/b.png")
        );
    }
}

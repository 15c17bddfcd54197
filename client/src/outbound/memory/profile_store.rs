//! In-memory document store for profiles.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::lock;
use crate::domain::ports::{DocumentPath, ProfileStore, ProfileStoreError, SetOptions};

/// Documents keyed by their rendered path.
#[derive(Default)]
pub struct InMemoryProfileStore {
    documents: Mutex<HashMap<String, Map<String, Value>>>,
    offline: AtomicBool,
    writes: Mutex<usize>,
}

impl InMemoryProfileStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate losing or regaining connectivity.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        *lock(&self.writes)
    }

    fn ensure_online(&self) -> Result<(), ProfileStoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ProfileStoreError::unavailable("profile store is offline"));
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn set_document(
        &self,
        path: &DocumentPath,
        value: Value,
        options: SetOptions,
    ) -> Result<(), ProfileStoreError> {
        self.ensure_online()?;
        let Value::Object(fields) = value else {
            return Err(ProfileStoreError::rejected(format!(
                "document {path} must be an object"
            )));
        };
        let mut documents = lock(&self.documents);
        let document = documents.entry(path.to_string()).or_default();
        if options.merge {
            document.extend(fields);
        } else {
            *document = fields;
        }
        *lock(&self.writes) += 1;
        Ok(())
    }

    async fn get_document(&self, path: &DocumentPath) -> Result<Option<Value>, ProfileStoreError> {
        self.ensure_online()?;
        Ok(lock(&self.documents)
            .get(&path.to_string())
            .cloned()
            .map(Value::Object))
    }
}

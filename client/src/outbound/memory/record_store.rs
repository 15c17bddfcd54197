//! In-memory record store with live collection subscriptions.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use super::lock;
use crate::domain::ports::{
    CollectionFeed, CollectionSnapshot, RecordPath, RecordStore, RecordStoreError,
    SubscriptionToken,
};

struct Subscriber {
    collection: String,
    sender: mpsc::UnboundedSender<CollectionSnapshot>,
}

#[derive(Default)]
struct StoreState {
    collections: HashMap<String, HashMap<String, Value>>,
    subscribers: HashMap<u64, Subscriber>,
    next_token: u64,
}

impl StoreState {
    fn snapshot(&self, collection: &str) -> CollectionSnapshot {
        let entries = self
            .collections
            .get(collection)
            .map(|records| {
                records
                    .iter()
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default();
        CollectionSnapshot { entries }
    }

    /// Push the full collection to every live subscriber of `collection`.
    fn publish(&mut self, collection: &str) {
        let snapshot = self.snapshot(collection);
        self.subscribers.retain(|token, subscriber| {
            if subscriber.collection != collection {
                return true;
            }
            let delivered = subscriber.sender.send(snapshot.clone()).is_ok();
            if !delivered {
                debug!(token, "dropping subscriber with closed channel");
            }
            delivered
        });
    }
}

/// Owner-scoped collections held in process memory.
///
/// Keys are random UUIDs; snapshots list entries in hash order.
#[derive(Default)]
pub struct InMemoryRecordStore {
    state: Mutex<StoreState>,
    offline: AtomicBool,
}

impl InMemoryRecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate losing or regaining connectivity.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of subscriptions not yet released.
    pub fn active_subscriptions(&self) -> usize {
        lock(&self.state).subscribers.len()
    }

    /// Number of records stored under `collection`.
    pub fn record_count(&self, collection: &RecordPath) -> usize {
        lock(&self.state)
            .collections
            .get(&collection.to_string())
            .map_or(0, HashMap::len)
    }

    fn ensure_online(&self) -> Result<(), RecordStoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RecordStoreError::unavailable("record store is offline"));
        }
        Ok(())
    }
}

fn collection_only(path: &RecordPath) -> Result<String, RecordStoreError> {
    if path.key().is_some() {
        return Err(RecordStoreError::rejected(format!(
            "{path} names a record, not a collection"
        )));
    }
    Ok(path.to_string())
}

fn split_record(path: &RecordPath) -> Result<(String, String), RecordStoreError> {
    let key = path
        .key()
        .ok_or_else(|| RecordStoreError::rejected(format!("{path} names no record")))?;
    Ok((path.parent().to_string(), key.to_owned()))
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn create(
        &self,
        collection: &RecordPath,
        value: Value,
    ) -> Result<String, RecordStoreError> {
        self.ensure_online()?;
        let name = collection_only(collection)?;
        let key = Uuid::new_v4().to_string();
        let mut state = lock(&self.state);
        state
            .collections
            .entry(name.clone())
            .or_default()
            .insert(key.clone(), value);
        state.publish(&name);
        Ok(key)
    }

    async fn read(&self, path: &RecordPath) -> Result<Option<Value>, RecordStoreError> {
        self.ensure_online()?;
        let (collection, key) = split_record(path)?;
        let state = lock(&self.state);
        Ok(state
            .collections
            .get(&collection)
            .and_then(|records| records.get(&key))
            .cloned())
    }

    async fn update(&self, path: &RecordPath, value: Value) -> Result<(), RecordStoreError> {
        self.ensure_online()?;
        let (collection, key) = split_record(path)?;
        let mut state = lock(&self.state);
        let slot = state
            .collections
            .get_mut(&collection)
            .and_then(|records| records.get_mut(&key))
            .ok_or_else(|| RecordStoreError::missing(path.to_string()))?;
        *slot = value;
        state.publish(&collection);
        Ok(())
    }

    async fn delete(&self, path: &RecordPath) -> Result<(), RecordStoreError> {
        self.ensure_online()?;
        let (collection, key) = split_record(path)?;
        let mut state = lock(&self.state);
        let removed = state
            .collections
            .get_mut(&collection)
            .and_then(|records| records.remove(&key))
            .is_some();
        if removed {
            state.publish(&collection);
        }
        Ok(())
    }

    async fn subscribe(&self, collection: &RecordPath) -> Result<CollectionFeed, RecordStoreError> {
        self.ensure_online()?;
        let name = collection_only(collection)?;
        let (sender, snapshots) = mpsc::unbounded_channel();
        let mut state = lock(&self.state);
        sender
            .send(state.snapshot(&name))
            .map_err(|_| RecordStoreError::rejected("subscriber closed before first snapshot"))?;
        state.next_token += 1;
        let token = state.next_token;
        state.subscribers.insert(
            token,
            Subscriber {
                collection: name,
                sender,
            },
        );
        Ok(CollectionFeed {
            token: SubscriptionToken::new(token),
            snapshots,
        })
    }

    fn unsubscribe(&self, token: SubscriptionToken) {
        if lock(&self.state).subscribers.remove(&token.value()).is_some() {
            debug!(token = token.value(), "subscription released");
        }
    }
}

//! Driven port for the realtime record store.
//!
//! Records live under owner-scoped collections addressed as
//! `<collection>/<ownerId>[/<recordKey>]`. Subscriptions push the whole
//! collection on every change and must be released exactly once.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors reported by record store adapters.
    pub enum RecordStoreError {
        /// The store could not be reached.
        Unavailable { message: String } => "record store unavailable: {message}",
        /// The addressed record does not exist.
        Missing { path: String } => "record {path} does not exist",
        /// The store refused or failed the operation.
        Rejected { message: String } => "record store rejected request: {message}",
    }
}

/// Validation errors for record paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordPathError {
    /// A segment was blank.
    EmptySegment,
    /// A segment contained a `/`.
    NestedSegment(String),
}

impl fmt::Display for RecordPathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySegment => write!(f, "record path segments must not be empty"),
            Self::NestedSegment(segment) => {
                write!(f, "record path segment {segment:?} must not contain '/'")
            }
        }
    }
}

impl std::error::Error for RecordPathError {}

/// Owner-scoped collection or record address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordPath {
    collection: String,
    owner: UserId,
    key: Option<String>,
}

impl RecordPath {
    /// Address the collection `name` owned by `owner`.
    pub fn collection(name: &str, owner: &UserId) -> Result<Self, RecordPathError> {
        check_segment(name)?;
        Ok(Self {
            collection: name.to_owned(),
            owner: owner.clone(),
            key: None,
        })
    }

    /// Address the record `key` inside this collection.
    pub fn child(&self, key: &str) -> Result<Self, RecordPathError> {
        check_segment(key)?;
        Ok(Self {
            collection: self.collection.clone(),
            owner: self.owner.clone(),
            key: Some(key.to_owned()),
        })
    }

    /// Collection containing this path.
    pub fn parent(&self) -> Self {
        Self {
            collection: self.collection.clone(),
            owner: self.owner.clone(),
            key: None,
        }
    }

    /// Collection name.
    pub fn collection_name(&self) -> &str {
        &self.collection
    }

    /// Owner segment.
    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    /// Record key, `None` for a collection path.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }
}

fn check_segment(segment: &str) -> Result<(), RecordPathError> {
    if segment.trim().is_empty() {
        return Err(RecordPathError::EmptySegment);
    }
    if segment.contains('/') {
        return Err(RecordPathError::NestedSegment(segment.to_owned()));
    }
    Ok(())
}

impl fmt::Display for RecordPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.owner)?;
        if let Some(key) = &self.key {
            write!(f, "/{key}")?;
        }
        Ok(())
    }
}

/// Opaque handle identifying a standing subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionToken(u64);

impl SubscriptionToken {
    /// Wrap an adapter-assigned token value.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw token value.
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Entire content of a collection at one point in time, keyed by record key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionSnapshot {
    /// Record keys with their documents.
    pub entries: Vec<(String, Value)>,
}

/// A live subscription: its token plus the channel of pushed snapshots.
///
/// The first snapshot describes the collection at subscription time.
#[derive(Debug)]
pub struct CollectionFeed {
    /// Handle passed back to `unsubscribe`.
    pub token: SubscriptionToken,
    /// Full collection on every change.
    pub snapshots: mpsc::UnboundedReceiver<CollectionSnapshot>,
}

/// Port for keyed record persistence and live collection updates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Append `value` to `collection` under a store-assigned key.
    async fn create(&self, collection: &RecordPath, value: Value)
    -> Result<String, RecordStoreError>;

    /// Read one record.
    async fn read(&self, path: &RecordPath) -> Result<Option<Value>, RecordStoreError>;

    /// Replace an existing record.
    async fn update(&self, path: &RecordPath, value: Value) -> Result<(), RecordStoreError>;

    /// Remove a record. Removing an absent record succeeds.
    async fn delete(&self, path: &RecordPath) -> Result<(), RecordStoreError>;

    /// Start a standing subscription on `collection`.
    async fn subscribe(&self, collection: &RecordPath) -> Result<CollectionFeed, RecordStoreError>;

    /// Release a subscription. Unknown tokens are ignored.
    fn unsubscribe(&self, token: SubscriptionToken);
}

/// Fixture store that holds nothing and accepts every write.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRecordStore;

#[async_trait]
impl RecordStore for FixtureRecordStore {
    async fn create(
        &self,
        _collection: &RecordPath,
        _value: Value,
    ) -> Result<String, RecordStoreError> {
        Ok("fixture-record".to_owned())
    }

    async fn read(&self, _path: &RecordPath) -> Result<Option<Value>, RecordStoreError> {
        Ok(None)
    }

    async fn update(&self, path: &RecordPath, _value: Value) -> Result<(), RecordStoreError> {
        Err(RecordStoreError::missing(path.to_string()))
    }

    async fn delete(&self, _path: &RecordPath) -> Result<(), RecordStoreError> {
        Ok(())
    }

    async fn subscribe(&self, _collection: &RecordPath) -> Result<CollectionFeed, RecordStoreError> {
        let (sender, snapshots) = mpsc::unbounded_channel();
        // The receiver sees one empty snapshot, then a closed channel.
        drop(sender.send(CollectionSnapshot::default()));
        Ok(CollectionFeed {
            token: SubscriptionToken::new(0),
            snapshots,
        })
    }

    fn unsubscribe(&self, _token: SubscriptionToken) {}
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn owner() -> UserId {
        UserId::new("u1").expect("owner id")
    }

    #[rstest]
    fn paths_render_owner_scoped_segments(owner: UserId) {
        let collection = RecordPath::collection("services", &owner).expect("collection");
        let record = collection.child("s1").expect("record");
        assert_eq!(collection.to_string(), "services/u1");
        assert_eq!(record.to_string(), "services/u1/s1");
        assert_eq!(record.parent(), collection);
        assert_eq!(record.key(), Some("s1"));
    }

    #[rstest]
    #[case("")]
    #[case("a/b")]
    fn child_rejects_unusable_keys(owner: UserId, #[case] key: &str) {
        let collection = RecordPath::collection("services", &owner).expect("collection");
        assert!(collection.child(key).is_err());
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_subscription_delivers_one_empty_snapshot(owner: UserId) {
        let collection = RecordPath::collection("services", &owner).expect("collection");
        let mut feed = FixtureRecordStore
            .subscribe(&collection)
            .await
            .expect("subscribe");
        assert_eq!(feed.snapshots.recv().await, Some(CollectionSnapshot::default()));
        assert_eq!(feed.snapshots.recv().await, None);
    }
}

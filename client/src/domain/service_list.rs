//! Live list of the signed-in user's services.
//!
//! The record store re-delivers the whole collection on every change. Each
//! delivery is numbered as it arrives; [`ServiceListState`] only applies a
//! snapshot newer than the last one it applied, so a late delivery can never
//! overwrite fresher data. The state also diffs successive snapshots so a
//! view can update rows incrementally.
//!
//! A subscription must be released exactly once. [`ServiceListSubscription`]
//! releases on [`ServiceListSubscription::release`] or on drop, whichever
//! comes first.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc::error::TryRecvError;
use tracing::{debug, warn};

use crate::domain::ports::{CollectionFeed, CollectionSnapshot, RecordStore, SubscriptionToken};
use crate::domain::{ServiceDraft, ServiceId, ServiceRecord, UserId};

/// One delivery of the full service list.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceListSnapshot {
    delivery: u64,
    services: Vec<ServiceRecord>,
}

impl ServiceListSnapshot {
    /// Build a snapshot with an explicit delivery number.
    pub fn new(delivery: u64, services: Vec<ServiceRecord>) -> Self {
        Self { delivery, services }
    }

    /// Arrival order of this delivery; larger is newer.
    pub fn delivery(&self) -> u64 {
        self.delivery
    }

    /// Services in the delivery. No order is promised.
    pub fn services(&self) -> &[ServiceRecord] {
        &self.services
    }

    fn decode(delivery: u64, owner: &UserId, raw: CollectionSnapshot) -> Self {
        let services = raw
            .entries
            .into_iter()
            .filter_map(|(key, document)| decode_record(owner, &key, &document))
            .collect();
        Self { delivery, services }
    }
}

fn decode_record(owner: &UserId, key: &str, document: &serde_json::Value) -> Option<ServiceRecord> {
    let id = match ServiceId::new(key) {
        Ok(id) => id,
        Err(err) => {
            warn!(%owner, key, %err, "skipping service with unusable key");
            return None;
        }
    };
    match ServiceDraft::from_document(document) {
        Ok(draft) => Some(ServiceRecord::new(id, owner.clone(), draft)),
        Err(err) => {
            warn!(%owner, %id, %err, "skipping malformed service record");
            None
        }
    }
}

/// A standing subscription to the caller's services.
pub struct ServiceListSubscription {
    store: Arc<dyn RecordStore>,
    owner: UserId,
    feed: Option<CollectionFeed>,
    deliveries: u64,
}

impl fmt::Debug for ServiceListSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceListSubscription")
            .field("owner", &self.owner)
            .field("token", &self.token())
            .field("deliveries", &self.deliveries)
            .finish_non_exhaustive()
    }
}

impl ServiceListSubscription {
    /// Wrap a feed opened on `store` for `owner`.
    pub fn new(store: Arc<dyn RecordStore>, owner: UserId, feed: CollectionFeed) -> Self {
        Self {
            store,
            owner,
            feed: Some(feed),
            deliveries: 0,
        }
    }

    /// Token of the underlying subscription, `None` once released.
    pub fn token(&self) -> Option<SubscriptionToken> {
        self.feed.as_ref().map(|feed| feed.token)
    }

    /// True once the subscription was released.
    pub fn is_released(&self) -> bool {
        self.feed.is_none()
    }

    /// Wait for the next delivery.
    ///
    /// Deliveries already queued behind it are coalesced: only the newest is
    /// returned, numbered after all the ones it replaced. Returns `None` after
    /// release or when the store closes the feed.
    pub async fn next_snapshot(&mut self) -> Option<ServiceListSnapshot> {
        let feed = self.feed.as_mut()?;
        let mut latest = feed.snapshots.recv().await?;
        self.deliveries += 1;
        loop {
            match feed.snapshots.try_recv() {
                Ok(newer) => {
                    latest = newer;
                    self.deliveries += 1;
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        debug!(owner = %self.owner, delivery = self.deliveries, "service list delivered");
        Some(ServiceListSnapshot::decode(
            self.deliveries,
            &self.owner,
            latest,
        ))
    }

    /// Release the subscription. Later calls do nothing.
    pub fn release(&mut self) {
        if let Some(feed) = self.feed.take() {
            debug!(owner = %self.owner, token = feed.token.value(), "releasing service list");
            self.store.unsubscribe(feed.token);
        }
    }
}

impl Drop for ServiceListSubscription {
    fn drop(&mut self) {
        self.release();
    }
}

/// Ids that changed between two applied snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceListDiff {
    /// Services absent from the previous snapshot.
    pub added: Vec<ServiceId>,
    /// Services whose fields changed.
    pub updated: Vec<ServiceId>,
    /// Services no longer listed.
    pub removed: Vec<ServiceId>,
}

impl ServiceListDiff {
    /// True when nothing changed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }

    fn between(previous: &[ServiceRecord], next: &[ServiceRecord]) -> Self {
        let before: HashMap<&ServiceId, &ServiceRecord> =
            previous.iter().map(|record| (record.id(), record)).collect();
        let mut diff = Self::default();
        for record in next {
            match before.get(record.id()) {
                None => diff.added.push(record.id().clone()),
                Some(old) if *old != record => diff.updated.push(record.id().clone()),
                Some(_) => {}
            }
        }
        let after: HashSet<&ServiceId> = next.iter().map(ServiceRecord::id).collect();
        diff.removed = previous
            .iter()
            .filter(|record| !after.contains(record.id()))
            .map(|record| record.id().clone())
            .collect();
        diff
    }
}

/// The list as last applied by a view.
#[derive(Debug, Clone, Default)]
pub struct ServiceListState {
    last_delivery: Option<u64>,
    services: Vec<ServiceRecord>,
}

impl ServiceListState {
    /// Apply `snapshot` if it is newer than the last applied delivery.
    ///
    /// Returns the changes, or `None` when the snapshot was stale and ignored.
    pub fn apply(&mut self, snapshot: ServiceListSnapshot) -> Option<ServiceListDiff> {
        if self
            .last_delivery
            .is_some_and(|last| snapshot.delivery <= last)
        {
            debug!(
                delivery = snapshot.delivery,
                last = ?self.last_delivery,
                "ignoring stale service list"
            );
            return None;
        }
        let diff = ServiceListDiff::between(&self.services, &snapshot.services);
        self.last_delivery = Some(snapshot.delivery);
        self.services = snapshot.services;
        Some(diff)
    }

    /// True once any snapshot was applied.
    pub fn is_loaded(&self) -> bool {
        self.last_delivery.is_some()
    }

    /// Delivery number of the applied snapshot.
    pub fn last_delivery(&self) -> Option<u64> {
        self.last_delivery
    }

    /// Services of the applied snapshot.
    pub fn services(&self) -> &[ServiceRecord] {
        &self.services
    }

    /// Applied service with `id`.
    pub fn find(&self, id: &ServiceId) -> Option<&ServiceRecord> {
        self.services.iter().find(|record| record.id() == id)
    }
}

#[cfg(test)]
#[path = "service_list_tests.rs"]
mod tests;

//! Service catalogue domain service.
//!
//! Implements the [`ServiceCatalogue`] driving port on a [`RecordStore`].
//! The owner of every path is the current session identity, never a caller
//! argument.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::deadline::within;
use crate::domain::ports::{RecordPath, RecordStore, RecordStoreError, ServiceCatalogue};
use crate::domain::{
    Error, ServiceDraft, ServiceForm, ServiceId, ServiceListSubscription, ServiceRecord,
    SessionStore, UserId,
};

/// Collection holding service records.
pub const SERVICES_COLLECTION: &str = "services";

fn map_store_error(error: RecordStoreError) -> Error {
    match error {
        RecordStoreError::Unavailable { message } => {
            Error::network(format!("record store unavailable: {message}"))
        }
        RecordStoreError::Missing { path } => {
            Error::store(format!("service record {path} no longer exists"))
        }
        RecordStoreError::Rejected { message } => {
            Error::store(format!("record store error: {message}"))
        }
    }
}

/// Service catalogue backed by a record store.
#[derive(Clone)]
pub struct ServiceCatalogService<S> {
    store: Arc<S>,
    session: SessionStore,
    timeout: Duration,
}

impl<S> ServiceCatalogService<S> {
    /// Create the service.
    pub fn new(store: Arc<S>, session: SessionStore, timeout: Duration) -> Self {
        Self {
            store,
            session,
            timeout,
        }
    }
}

impl<S> ServiceCatalogService<S>
where
    S: RecordStore + 'static,
{
    fn collection(&self, operation: &'static str) -> Result<(UserId, RecordPath), Error> {
        let identity = self.session.require_identity(operation)?;
        let owner = identity.user_id().clone();
        let path = RecordPath::collection(SERVICES_COLLECTION, &owner)
            .map_err(|err| Error::store(format!("invalid services path: {err}")))?;
        Ok((owner, path))
    }

    fn record_path(
        &self,
        operation: &'static str,
        id: &ServiceId,
    ) -> Result<(UserId, RecordPath), Error> {
        let (owner, collection) = self.collection(operation)?;
        let path = collection
            .child(id.as_ref())
            .map_err(|err| Error::store(format!("invalid service path: {err}")))?;
        Ok((owner, path))
    }
}

#[async_trait]
impl<S> ServiceCatalogue for ServiceCatalogService<S>
where
    S: RecordStore + 'static,
{
    async fn add_service(&self, form: &ServiceForm) -> Result<ServiceId, Error> {
        let (_, collection) = self.collection("add_service")?;
        let draft = form.validate().map_err(Error::validation)?;
        let key = within(
            self.timeout,
            "add_service",
            self.store.create(&collection, draft.to_document()),
            map_store_error,
        )
        .await?;
        let id = ServiceId::new(key)
            .map_err(|err| Error::store(format!("store assigned an unusable key: {err}")))?;
        debug!(path = %collection, %id, "service created");
        Ok(id)
    }

    async fn get_service(&self, id: &ServiceId) -> Result<ServiceRecord, Error> {
        let (owner, path) = self.record_path("get_service", id)?;
        let document = within(
            self.timeout,
            "get_service",
            self.store.read(&path),
            map_store_error,
        )
        .await?
        .ok_or_else(|| Error::not_found(format!("service {id} not found")))?;
        let draft = ServiceDraft::from_document(&document).map_err(|err| {
            warn!(%path, %err, "stored service is malformed");
            Error::store(format!("service {id} could not be decoded: {err}"))
        })?;
        Ok(ServiceRecord::new(id.clone(), owner, draft))
    }

    async fn update_service(&self, id: &ServiceId, form: &ServiceForm) -> Result<(), Error> {
        let (_, path) = self.record_path("update_service", id)?;
        let draft = form.validate().map_err(Error::validation)?;
        within(
            self.timeout,
            "update_service",
            self.store.update(&path, draft.to_document()),
            map_store_error,
        )
        .await?;
        debug!(%path, "service updated");
        Ok(())
    }

    async fn delete_service(&self, id: &ServiceId) -> Result<(), Error> {
        let (_, path) = self.record_path("delete_service", id)?;
        within(
            self.timeout,
            "delete_service",
            self.store.delete(&path),
            map_store_error,
        )
        .await?;
        debug!(%path, "service deleted");
        Ok(())
    }

    async fn subscribe_services(&self) -> Result<ServiceListSubscription, Error> {
        let (owner, collection) = self.collection("subscribe_services")?;
        let feed = within(
            self.timeout,
            "subscribe_services",
            self.store.subscribe(&collection),
            map_store_error,
        )
        .await?;
        debug!(path = %collection, token = feed.token.value(), "service list subscribed");
        let store: Arc<dyn RecordStore> = self.store.clone();
        Ok(ServiceListSubscription::new(store, owner, feed))
    }
}

#[cfg(test)]
#[path = "service_catalog_tests.rs"]
mod tests;

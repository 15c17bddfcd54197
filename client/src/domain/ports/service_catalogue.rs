//! Driving port for owner-scoped service records.
//!
//! Every operation acts on the records of the signed-in identity. Callers
//! never pass an owner id.

use async_trait::async_trait;

use crate::domain::{Error, ServiceForm, ServiceId, ServiceListSubscription, ServiceRecord};

/// Use-case port for the service list and its forms.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ServiceCatalogue: Send + Sync {
    /// Validate and create a service, returning the store-assigned id.
    async fn add_service(&self, form: &ServiceForm) -> Result<ServiceId, Error>;

    /// Read one service.
    async fn get_service(&self, id: &ServiceId) -> Result<ServiceRecord, Error>;

    /// Validate and fully replace a service's fields.
    async fn update_service(&self, id: &ServiceId, form: &ServiceForm) -> Result<(), Error>;

    /// Remove a service.
    async fn delete_service(&self, id: &ServiceId) -> Result<(), Error>;

    /// Open a live subscription to the caller's services.
    async fn subscribe_services(&self) -> Result<ServiceListSubscription, Error>;
}

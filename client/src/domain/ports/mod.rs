//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`Authentication`, `ServiceCatalogue`, `ProfileEditor`) are
//! called by the screen controllers. Driven ports are implemented by the
//! adapters in `outbound`.

mod macros;
pub(crate) use macros::define_port_error;

mod authentication;
mod avatar_vault;
mod identity_provider;
mod local_store;
mod profile_editor;
mod profile_store;
mod record_store;
mod service_catalogue;

#[cfg(test)]
pub use authentication::MockAuthentication;
pub use authentication::Authentication;
#[cfg(test)]
pub use avatar_vault::MockAvatarVault;
pub use avatar_vault::{AvatarVault, AvatarVaultError, FixtureAvatarVault};
#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
pub use identity_provider::{
    FixtureIdentityProvider, IdentityProvider, IdentityProviderError, SessionEvents,
};
#[cfg(test)]
pub use local_store::MockLocalKeyValueStore;
pub use local_store::{FixtureLocalKeyValueStore, LocalKeyValueStore, LocalStoreError};
#[cfg(test)]
pub use profile_editor::MockProfileEditor;
pub use profile_editor::ProfileEditor;
#[cfg(test)]
pub use profile_store::MockProfileStore;
pub use profile_store::{
    DocumentPath, FixtureProfileStore, ProfileStore, ProfileStoreError, SetOptions,
};
#[cfg(test)]
pub use record_store::MockRecordStore;
pub use record_store::{
    CollectionFeed, CollectionSnapshot, FixtureRecordStore, RecordPath, RecordPathError,
    RecordStore, RecordStoreError, SubscriptionToken,
};
#[cfg(test)]
pub use service_catalogue::MockServiceCatalogue;
pub use service_catalogue::ServiceCatalogue;

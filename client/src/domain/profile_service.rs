//! Profile editor domain service.
//!
//! Implements the [`ProfileEditor`] driving port. The profile document lives
//! at `users/<userId>`; a missing document is an empty profile. Avatar
//! changes copy the picked image through the [`AvatarVault`], remember the
//! durable path on the device, and merge only the avatar into the document.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::deadline::within;
use crate::domain::ports::{
    AvatarVault, AvatarVaultError, DocumentPath, LocalKeyValueStore, LocalStoreError,
    ProfileEditor, ProfileStore, ProfileStoreError, SetOptions,
};
use crate::domain::{AvatarUri, Error, Profile, ProfileForm, SessionStore};

/// Collection holding profile documents.
pub const USERS_COLLECTION: &str = "users";
/// Device-local key remembering the last avatar path.
pub const AVATAR_URI_KEY: &str = "avatarUri";

fn map_profile_store_error(error: ProfileStoreError) -> Error {
    match error {
        ProfileStoreError::Unavailable { message } => {
            Error::network(format!("profile store unavailable: {message}"))
        }
        ProfileStoreError::Rejected { message } => {
            Error::store(format!("profile store error: {message}"))
        }
    }
}

fn map_local_store_error(error: LocalStoreError) -> Error {
    Error::store(format!("device storage failed: {error}"))
}

fn map_vault_error(error: AvatarVaultError) -> Error {
    Error::store(format!("avatar could not be saved: {error}"))
}

/// Driven ports used by [`ProfileService`].
#[derive(Clone)]
pub struct ProfilePorts {
    /// Remote profile documents.
    pub documents: Arc<dyn ProfileStore>,
    /// Device-local fallback for the avatar path.
    pub device: Arc<dyn LocalKeyValueStore>,
    /// Durable copies of picked images.
    pub avatars: Arc<dyn AvatarVault>,
}

/// Profile editor backed by the document store and device storage.
#[derive(Clone)]
pub struct ProfileService {
    ports: ProfilePorts,
    session: SessionStore,
    timeout: Duration,
}

impl ProfileService {
    /// Create the service.
    pub fn new(ports: ProfilePorts, session: SessionStore, timeout: Duration) -> Self {
        Self {
            ports,
            session,
            timeout,
        }
    }

    fn document_path(&self, operation: &'static str) -> Result<DocumentPath, Error> {
        let identity = self.session.require_identity(operation)?;
        Ok(DocumentPath::new(
            USERS_COLLECTION,
            identity.user_id().clone(),
        ))
    }
}

#[async_trait]
impl ProfileEditor for ProfileService {
    async fn load_profile(&self) -> Result<Profile, Error> {
        let path = self.document_path("load_profile")?;
        let document = within(
            self.timeout,
            "load_profile",
            self.ports.documents.get_document(&path),
            map_profile_store_error,
        )
        .await?;
        match document {
            Some(document) => Ok(Profile::from_document(&document)),
            None => {
                debug!(%path, "no profile document yet");
                Ok(Profile::default())
            }
        }
    }

    async fn save_profile(
        &self,
        form: &ProfileForm,
        avatar: Option<AvatarUri>,
    ) -> Result<Profile, Error> {
        let path = self.document_path("save_profile")?;
        let profile = form.validate(avatar).map_err(Error::validation)?;
        within(
            self.timeout,
            "save_profile",
            self.ports
                .documents
                .set_document(&path, profile.to_document(), SetOptions::REPLACE),
            map_profile_store_error,
        )
        .await?;
        debug!(%path, "profile saved");
        Ok(profile)
    }

    async fn change_avatar(&self, picked: &Path) -> Result<AvatarUri, Error> {
        let path = self.document_path("change_avatar")?;
        let avatar = within(
            self.timeout,
            "persist_avatar",
            self.ports.avatars.persist(picked),
            map_vault_error,
        )
        .await?;
        within(
            self.timeout,
            "cache_avatar",
            self.ports.device.set(AVATAR_URI_KEY, avatar.as_ref()),
            map_local_store_error,
        )
        .await?;
        within(
            self.timeout,
            "merge_avatar",
            self.ports.documents.set_document(
                &path,
                Profile::avatar_patch(&avatar),
                SetOptions::MERGE,
            ),
            map_profile_store_error,
        )
        .await?;
        debug!(%path, avatar = %avatar, "avatar changed");
        Ok(avatar)
    }

    async fn cached_avatar(&self) -> Result<Option<AvatarUri>, Error> {
        let stored = within(
            self.timeout,
            "cached_avatar",
            self.ports.device.get(AVATAR_URI_KEY),
            map_local_store_error,
        )
        .await?;
        Ok(stored.and_then(|uri| match AvatarUri::new(uri) {
            Ok(avatar) => Some(avatar),
            Err(err) => {
                warn!(%err, "ignoring unusable cached avatar");
                None
            }
        }))
    }
}

#[cfg(test)]
#[path = "profile_service_tests.rs"]
mod tests;

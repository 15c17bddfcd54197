//! Driven port that keeps durable copies of picked avatar images.
//!
//! Picker results point at temporary files; the vault copies them somewhere
//! that survives restarts and hands back the durable location.

use std::path::Path;

use async_trait::async_trait;

use crate::domain::AvatarUri;

use super::define_port_error;

define_port_error! {
    /// Errors reported by avatar vault adapters.
    pub enum AvatarVaultError {
        /// The picked file does not exist or has no usable file name.
        SourceUnreadable { path: String } => "picked image {path} cannot be read",
        /// Copying into durable storage failed.
        Io { message: String } => "avatar copy failed: {message}",
    }
}

/// Port for persisting picked images.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AvatarVault: Send + Sync {
    /// Copy `picked` into durable storage and return its durable location.
    async fn persist(&self, picked: &Path) -> Result<AvatarUri, AvatarVaultError>;
}

/// Fixture vault that reports the picked path as already durable.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAvatarVault;

#[async_trait]
impl AvatarVault for FixtureAvatarVault {
    async fn persist(&self, picked: &Path) -> Result<AvatarUri, AvatarVaultError> {
        let display = picked.display().to_string();
        AvatarUri::new(display.clone()).map_err(|_| AvatarVaultError::source_unreadable(display))
    }
}

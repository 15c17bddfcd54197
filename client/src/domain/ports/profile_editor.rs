//! Driving port for the profile editor on the home screen.

use std::path::Path;

use async_trait::async_trait;

use crate::domain::{AvatarUri, Error, Profile, ProfileForm};

/// Use-case port for reading and editing the signed-in user's profile.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileEditor: Send + Sync {
    /// Load the profile; a user without a stored document gets an empty one.
    async fn load_profile(&self) -> Result<Profile, Error>;

    /// Validate and write the whole profile, keeping `avatar` as the avatar.
    async fn save_profile(
        &self,
        form: &ProfileForm,
        avatar: Option<AvatarUri>,
    ) -> Result<Profile, Error>;

    /// Persist a picked image as the avatar.
    async fn change_avatar(&self, picked: &Path) -> Result<AvatarUri, Error>;

    /// Avatar location remembered on this device.
    async fn cached_avatar(&self) -> Result<Option<AvatarUri>, Error>;
}

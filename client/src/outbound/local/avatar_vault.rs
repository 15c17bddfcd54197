//! Durable avatar copies in a local directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;
use uuid::Uuid;

use crate::domain::AvatarUri;
use crate::domain::ports::{AvatarVault, AvatarVaultError};

/// Copies picked images into `<data_dir>/avatars`.
#[derive(Debug)]
pub struct DirAvatarVault {
    root: PathBuf,
    dir: Dir,
}

impl DirAvatarVault {
    /// Open (creating if needed) the avatar directory under `root`.
    ///
    /// # Errors
    ///
    /// Returns [`AvatarVaultError::Io`] when the directory cannot be created
    /// or opened.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, AvatarVaultError> {
        let root = root.into();
        Dir::create_ambient_dir_all(&root, ambient_authority())
            .map_err(|err| AvatarVaultError::io(format!("{}: {err}", root.display())))?;
        let dir = Dir::open_ambient_dir(&root, ambient_authority())
            .map_err(|err| AvatarVaultError::io(format!("{}: {err}", root.display())))?;
        Ok(Self { root, dir })
    }

    fn read_picked(picked: &Path) -> Result<Vec<u8>, AvatarVaultError> {
        let unreadable = || AvatarVaultError::source_unreadable(picked.display().to_string());
        let file_name = picked.file_name().ok_or_else(unreadable)?;
        let parent = picked
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let source = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|_| unreadable())?;
        source.read(file_name).map_err(|_| unreadable())
    }
}

#[async_trait]
impl AvatarVault for DirAvatarVault {
    async fn persist(&self, picked: &Path) -> Result<AvatarUri, AvatarVaultError> {
        let bytes = Self::read_picked(picked)?;
        let extension = picked
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("img");
        let name = format!("avatar-{}.{extension}", Uuid::new_v4().simple());
        self.dir
            .write(&name, &bytes)
            .map_err(|err| AvatarVaultError::io(format!("{name}: {err}")))?;
        let stored = self.root.join(&name);
        debug!(path = %stored.display(), bytes = bytes.len(), "avatar copied");
        AvatarUri::new(stored.display().to_string())
            .map_err(|err| AvatarVaultError::io(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn persisted_copy_outlives_the_picked_file() {
        let picked_dir = tempfile::tempdir().expect("picked dir");
        let data_dir = tempfile::tempdir().expect("data dir");
        let picked = picked_dir.path().join("photo.png");
        std::fs::write(&picked, b"png-bytes").expect("write picked");

        let vault = DirAvatarVault::open(data_dir.path().join("avatars")).expect("open vault");
        let avatar = vault.persist(&picked).await.expect("persist");
        drop(picked_dir);

        let stored = PathBuf::from(avatar.as_ref());
        assert!(stored.starts_with(data_dir.path()));
        assert_eq!(stored.extension().and_then(|ext| ext.to_str()), Some("png"));
        assert_eq!(std::fs::read(&stored).expect("read copy"), b"png-bytes");
    }

    #[rstest]
    #[tokio::test]
    async fn missing_source_is_unreadable() {
        let data_dir = tempfile::tempdir().expect("data dir");
        let vault = DirAvatarVault::open(data_dir.path()).expect("open vault");
        let err = vault
            .persist(&data_dir.path().join("nope.png"))
            .await
            .expect_err("missing");
        assert!(matches!(err, AvatarVaultError::SourceUnreadable { .. }));
    }
}

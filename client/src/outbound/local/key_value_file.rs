//! Device key-value store persisted as a JSON object file.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{LocalKeyValueStore, LocalStoreError};

const STATE_FILE: &str = "local-state.json";

type Entries = BTreeMap<String, String>;

/// String values in `<data_dir>/local-state.json`.
///
/// Writes go to a temporary file that is renamed over the state file.
#[derive(Debug)]
pub struct JsonFileKeyValueStore {
    root: PathBuf,
    dir: Dir,
    write_lock: Mutex<()>,
}

impl JsonFileKeyValueStore {
    /// Open (creating if needed) the data directory.
    ///
    /// # Errors
    ///
    /// Returns [`LocalStoreError::Io`] when the directory cannot be created
    /// or opened.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, LocalStoreError> {
        let root = root.into();
        Dir::create_ambient_dir_all(&root, ambient_authority())
            .map_err(|err| LocalStoreError::io(format!("{}: {err}", root.display())))?;
        let dir = Dir::open_ambient_dir(&root, ambient_authority())
            .map_err(|err| LocalStoreError::io(format!("{}: {err}", root.display())))?;
        Ok(Self {
            root,
            dir,
            write_lock: Mutex::new(()),
        })
    }

    fn load(&self) -> Result<Entries, LocalStoreError> {
        match self.dir.read_to_string(STATE_FILE) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|err| {
                LocalStoreError::corrupt(format!("{}: {err}", self.root.join(STATE_FILE).display()))
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Entries::new()),
            Err(err) => Err(LocalStoreError::io(err.to_string())),
        }
    }

    fn store(&self, entries: &Entries) -> Result<(), LocalStoreError> {
        let contents = serde_json::to_string_pretty(entries)
            .map_err(|err| LocalStoreError::io(err.to_string()))?;
        let staging = format!(".{STATE_FILE}.{}.tmp", Uuid::new_v4().simple());
        self.dir
            .write(&staging, contents.as_bytes())
            .map_err(|err| LocalStoreError::io(format!("{staging}: {err}")))?;
        if let Err(err) = self.dir.rename(&staging, &self.dir, STATE_FILE) {
            drop(self.dir.remove_file(&staging));
            return Err(LocalStoreError::io(format!("{STATE_FILE}: {err}")));
        }
        Ok(())
    }
}

#[async_trait]
impl LocalKeyValueStore for JsonFileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, LocalStoreError> {
        Ok(self.load()?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.load()?;
        entries.insert(key.to_owned(), value.to_owned());
        self.store(&entries)?;
        debug!(key, "local value stored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn values_survive_reopening() {
        let data_dir = tempfile::tempdir().expect("data dir");
        let store = JsonFileKeyValueStore::open(data_dir.path()).expect("open");
        store.set("avatarUri", "/a.png").await.expect("set");
        store.set("theme", "dark").await.expect("set");
        drop(store);

        let reopened = JsonFileKeyValueStore::open(data_dir.path()).expect("reopen");
        assert_eq!(
            reopened.get("avatarUri").await.expect("get").as_deref(),
            Some("/a.png")
        );
        assert_eq!(reopened.get("missing").await.expect("get"), None);
    }

    #[rstest]
    #[tokio::test]
    async fn garbage_state_file_is_corrupt() {
        let data_dir = tempfile::tempdir().expect("data dir");
        std::fs::write(data_dir.path().join(STATE_FILE), "not json").expect("write");
        let store = JsonFileKeyValueStore::open(data_dir.path()).expect("open");

        let err = store.get("avatarUri").await.expect_err("corrupt");
        assert!(matches!(err, LocalStoreError::Corrupt { .. }));
    }
}

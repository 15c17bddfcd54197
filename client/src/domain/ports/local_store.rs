//! Driven port for small device-local key/value state.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors reported by local key/value adapters.
    pub enum LocalStoreError {
        /// Reading or writing the backing storage failed.
        Io { message: String } => "local store i/o failed: {message}",
        /// The backing storage holds data that cannot be decoded.
        Corrupt { message: String } => "local store is corrupt: {message}",
    }
}

/// Port for string values persisted on the device.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocalKeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, LocalStoreError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError>;
}

/// Fixture store that remembers nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLocalKeyValueStore;

#[async_trait]
impl LocalKeyValueStore for FixtureLocalKeyValueStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, LocalStoreError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), LocalStoreError> {
        Ok(())
    }
}

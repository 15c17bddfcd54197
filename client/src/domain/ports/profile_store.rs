//! Driven port for the profile document store.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors reported by document store adapters.
    pub enum ProfileStoreError {
        /// The store could not be reached.
        Unavailable { message: String } => "profile store unavailable: {message}",
        /// The store refused or failed the operation.
        Rejected { message: String } => "profile store rejected request: {message}",
    }
}

/// Address of a single document, `<collection>/<documentId>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentPath {
    collection: &'static str,
    id: UserId,
}

impl DocumentPath {
    /// Address the document `id` inside `collection`.
    pub fn new(collection: &'static str, id: UserId) -> Self {
        Self { collection, id }
    }

    /// Collection name.
    pub fn collection(&self) -> &'static str {
        self.collection
    }

    /// Document id.
    pub fn id(&self) -> &UserId {
        &self.id
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// Write options for [`ProfileStore::set_document`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// Merge top-level keys into the existing document instead of replacing it.
    pub merge: bool,
}

impl SetOptions {
    /// Replace the whole document.
    pub const REPLACE: Self = Self { merge: false };
    /// Merge the given keys into the document.
    pub const MERGE: Self = Self { merge: true };
}

/// Port for whole-document reads and writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Write `value` to `path`.
    async fn set_document(
        &self,
        path: &DocumentPath,
        value: Value,
        options: SetOptions,
    ) -> Result<(), ProfileStoreError>;

    /// Read the document at `path`; `None` when it does not exist.
    async fn get_document(&self, path: &DocumentPath) -> Result<Option<Value>, ProfileStoreError>;
}

/// Fixture store with no documents that discards writes.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureProfileStore;

#[async_trait]
impl ProfileStore for FixtureProfileStore {
    async fn set_document(
        &self,
        _path: &DocumentPath,
        _value: Value,
        _options: SetOptions,
    ) -> Result<(), ProfileStoreError> {
        Ok(())
    }

    async fn get_document(&self, _path: &DocumentPath) -> Result<Option<Value>, ProfileStoreError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn document_path_renders_collection_and_id() {
        let path = DocumentPath::new("users", UserId::new("u1").expect("id"));
        assert_eq!(path.to_string(), "users/u1");
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_has_no_documents() {
        let path = DocumentPath::new("users", UserId::new("u1").expect("id"));
        let found = FixtureProfileStore
            .get_document(&path)
            .await
            .expect("fixture read");
        assert!(found.is_none());
    }
}

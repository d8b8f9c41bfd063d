//! The [`BlobStore`] trait and the value types it trades in.

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;

use crate::error::StoreError;

/// Opaque continuation token returned by a truncated listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One page of a bucket listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    pub keys: Vec<String>,
    /// Where the next page starts; only meaningful while `truncated`.
    pub next_cursor: Option<Cursor>,
    /// More keys remain after this page.
    pub truncated: bool,
}

/// A bucket known to exist. Created once at startup, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketHandle {
    name: String,
}

impl BucketHandle {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for BucketHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A raw object store.
///
/// Implementations must be safe to share across threads (`Send + Sync`) and
/// report absent objects as [`StoreError::NotFound`]; policy such as
/// idempotent delete lives in [`crate::BlobStoreGateway`], not here.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Human-readable name identifying this backend.
    fn name(&self) -> &'static str;

    /// Names of all buckets visible to the caller.
    async fn list_buckets(&self) -> Result<Vec<String>, StoreError>;

    /// Create a bucket. Fails with [`StoreError::BucketExists`] if it exists.
    async fn create_bucket(&self, bucket: &str) -> Result<(), StoreError>;

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, StoreError>;

    /// Store `body` under `key`, replacing any previous content.
    async fn put_object(&self, bucket: &str, key: &str, body: Bytes) -> Result<(), StoreError>;

    /// Succeeds when `key` exists, [`StoreError::NotFound`] otherwise.
    async fn head_object(&self, bucket: &str, key: &str) -> Result<(), StoreError>;

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), StoreError>;

    /// List up to `limit` keys in ascending order, continuing from `cursor`.
    async fn list_objects(
        &self,
        bucket: &str,
        cursor: Option<&Cursor>,
        limit: usize,
    ) -> Result<ListPage, StoreError>;
}

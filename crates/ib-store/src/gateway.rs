//! Storage policy over a raw [`BlobStore`].

use std::sync::Arc;

use bytes::Bytes;
use futures::{Stream, StreamExt, TryStreamExt};

use crate::backend::{BlobStore, BucketHandle, Cursor, ListPage};
use crate::error::StoreError;

/// Keys requested per listing page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Largest page a listing may request; S3 caps `max-keys` at the same value.
pub const MAX_PAGE_SIZE: usize = 1000;

/// Deletes in flight per purge page unless configured otherwise.
pub const DEFAULT_DELETE_CONCURRENCY: usize = 8;

/// Outcome of [`BlobStoreGateway::purge_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeSummary {
    /// Listing pages processed, including a final empty one.
    pub pages: usize,
    /// Keys acknowledged deleted (or already absent).
    pub deleted: usize,
}

enum PageState {
    Start,
    Next(Cursor),
    Done,
}

/// Shared handle to the backing store.
///
/// Cheap to clone; every clone talks to the same backend.
#[derive(Clone)]
pub struct BlobStoreGateway {
    store: Arc<dyn BlobStore>,
    page_size: usize,
    delete_concurrency: usize,
}

impl BlobStoreGateway {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self {
            store,
            page_size: DEFAULT_PAGE_SIZE,
            delete_concurrency: DEFAULT_DELETE_CONCURRENCY,
        }
    }

    /// Set the listing page size, clamped to `1..=MAX_PAGE_SIZE`.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Set how many deletes run concurrently within one purge page (minimum 1).
    pub fn with_delete_concurrency(mut self, concurrency: usize) -> Self {
        self.delete_concurrency = concurrency.max(1);
        self
    }

    /// Name of the underlying backend.
    pub fn backend(&self) -> &'static str {
        self.store.name()
    }

    /// Return the bucket called `name`, creating it if it does not exist.
    ///
    /// Safe to call repeatedly and concurrently: an existing bucket is found
    /// by listing, and losing a creation race counts as success.
    pub async fn ensure_bucket(&self, name: &str) -> Result<BucketHandle, StoreError> {
        let buckets = self.store.list_buckets().await.map_err(into_unavailable)?;

        if buckets.iter().any(|b| b == name) {
            tracing::info!(bucket = name, "Bucket already exists; reusing it");
            return Ok(BucketHandle::new(name));
        }

        match self.store.create_bucket(name).await {
            Ok(()) => {
                tracing::info!(bucket = name, backend = self.backend(), "Created bucket");
                Ok(BucketHandle::new(name))
            }
            Err(StoreError::BucketExists(_)) => {
                tracing::info!(bucket = name, "Bucket created concurrently; reusing it");
                Ok(BucketHandle::new(name))
            }
            Err(e) => Err(into_unavailable(e)),
        }
    }

    pub async fn get(&self, bucket: &BucketHandle, key: &str) -> Result<Bytes, StoreError> {
        self.store.get_object(bucket.name(), key).await
    }

    /// Store `body` at `key`, overwriting any previous content.
    pub async fn put(&self, bucket: &BucketHandle, key: &str, body: Bytes) -> Result<(), StoreError> {
        let len = body.len();
        self.store.put_object(bucket.name(), key, body).await?;
        tracing::debug!(bucket = %bucket, key, bytes = len, "Stored object");
        Ok(())
    }

    /// Delete `key`. An absent key is not an error.
    pub async fn delete(&self, bucket: &BucketHandle, key: &str) -> Result<(), StoreError> {
        match self.store.delete_object(bucket.name(), key).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => {
                tracing::debug!(bucket = %bucket, key, "Delete of absent key ignored");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn exists(&self, bucket: &BucketHandle, key: &str) -> Result<bool, StoreError> {
        match self.store.head_object(bucket.name(), key).await {
            Ok(()) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Fetch one listing page starting at `cursor`.
    pub async fn list_page(
        &self,
        bucket: &BucketHandle,
        cursor: Option<&Cursor>,
    ) -> Result<ListPage, StoreError> {
        self.store
            .list_objects(bucket.name(), cursor, self.page_size)
            .await
    }

    /// Lazily walk the bucket listing one page at a time.
    ///
    /// The stream requests a page only when polled, ends after the first page
    /// that is not truncated, and cannot be restarted.
    pub fn pages<'a>(
        &'a self,
        bucket: &'a BucketHandle,
    ) -> impl Stream<Item = Result<ListPage, StoreError>> + 'a {
        futures::stream::try_unfold(PageState::Start, move |state| async move {
            let cursor = match state {
                PageState::Done => return Ok(None),
                PageState::Start => None,
                PageState::Next(cursor) => Some(cursor),
            };

            let page = self.list_page(bucket, cursor.as_ref()).await?;
            let next = match (page.truncated, &page.next_cursor) {
                (false, _) => PageState::Done,
                (true, Some(cursor)) => PageState::Next(cursor.clone()),
                (true, None) => {
                    return Err(StoreError::Unavailable(format!(
                        "listing of {bucket} is truncated but has no continuation cursor"
                    )));
                }
            };

            Ok(Some((page, next)))
        })
    }

    /// Every key in the bucket, across all pages.
    pub async fn list_all(&self, bucket: &BucketHandle) -> Result<Vec<String>, StoreError> {
        self.pages(bucket)
            .map_ok(|page| page.keys)
            .try_concat()
            .await
    }

    /// Delete every object in the bucket.
    ///
    /// Each page is fully deleted before the next one is requested. A failure
    /// leaves the bucket partially purged; calling this again finishes the job.
    pub async fn purge_all(&self, bucket: &BucketHandle) -> Result<PurgeSummary, StoreError> {
        let mut pages = std::pin::pin!(self.pages(bucket));
        let mut summary = PurgeSummary::default();

        while let Some(page) = pages.try_next().await.map_err(into_unavailable)? {
            let deletes: Vec<_> = page.keys.iter().map(|key| self.delete(bucket, key)).collect();
            let deleted = futures::stream::iter(deletes)
                .buffer_unordered(self.delete_concurrency)
                .try_fold(0usize, |n, ()| async move { Ok(n + 1) })
                .await
                .map_err(into_unavailable)?;

            summary.pages += 1;
            summary.deleted += deleted;
            tracing::debug!(bucket = %bucket, page = summary.pages, deleted, "Purged page");
        }

        tracing::info!(
            bucket = %bucket,
            pages = summary.pages,
            deleted = summary.deleted,
            "Bucket purged"
        );
        Ok(summary)
    }
}

fn into_unavailable(err: StoreError) -> StoreError {
    match err {
        StoreError::Unavailable(_) => err,
        other => StoreError::Unavailable(other.to_string()),
    }
}

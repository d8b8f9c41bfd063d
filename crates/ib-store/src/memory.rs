//! In-process [`BlobStore`] backed by ordered maps.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;

use crate::backend::{BlobStore, Cursor, ListPage};
use crate::error::StoreError;

/// Snapshot of how many times each operation was invoked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub list_buckets: usize,
    pub create_bucket: usize,
    pub get: usize,
    pub put: usize,
    pub head: usize,
    pub delete: usize,
    pub list: usize,
}

impl CallCounts {
    /// Object-level calls (everything except bucket management).
    pub fn object_calls(&self) -> usize {
        self.get + self.put + self.head + self.delete + self.list
    }
}

#[derive(Debug, Default)]
struct Counters {
    list_buckets: AtomicUsize,
    create_bucket: AtomicUsize,
    get: AtomicUsize,
    put: AtomicUsize,
    head: AtomicUsize,
    delete: AtomicUsize,
    list: AtomicUsize,
}

fn bump(counter: &AtomicUsize) {
    counter.fetch_add(1, Ordering::Relaxed);
}

/// Ordered in-memory object store.
///
/// Listing cursors are the last key of the previous page, so pagination stays
/// correct while keys are being deleted underneath it.
#[derive(Debug, Default)]
pub struct MemoryStore {
    buckets: RwLock<BTreeMap<String, BTreeMap<String, Bytes>>>,
    counters: Counters,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-operation call counts since creation.
    pub fn calls(&self) -> CallCounts {
        let c = &self.counters;
        CallCounts {
            list_buckets: c.list_buckets.load(Ordering::Relaxed),
            create_bucket: c.create_bucket.load(Ordering::Relaxed),
            get: c.get.load(Ordering::Relaxed),
            put: c.put.load(Ordering::Relaxed),
            head: c.head.load(Ordering::Relaxed),
            delete: c.delete.load(Ordering::Relaxed),
            list: c.list.load(Ordering::Relaxed),
        }
    }

    /// Number of objects in `bucket` (0 if the bucket does not exist).
    pub fn object_count(&self, bucket: &str) -> usize {
        self.buckets.read().get(bucket).map_or(0, BTreeMap::len)
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn list_buckets(&self) -> Result<Vec<String>, StoreError> {
        bump(&self.counters.list_buckets);
        Ok(self.buckets.read().keys().cloned().collect())
    }

    async fn create_bucket(&self, bucket: &str) -> Result<(), StoreError> {
        bump(&self.counters.create_bucket);
        let mut buckets = self.buckets.write();
        if buckets.contains_key(bucket) {
            return Err(StoreError::BucketExists(bucket.to_string()));
        }
        buckets.insert(bucket.to_string(), BTreeMap::new());
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, StoreError> {
        bump(&self.counters.get);
        let buckets = self.buckets.read();
        let objects = buckets
            .get(bucket)
            .ok_or_else(|| StoreError::NoSuchBucket(bucket.to_string()))?;
        objects
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::not_found(bucket, key))
    }

    async fn put_object(&self, bucket: &str, key: &str, body: Bytes) -> Result<(), StoreError> {
        bump(&self.counters.put);
        let mut buckets = self.buckets.write();
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| StoreError::NoSuchBucket(bucket.to_string()))?;
        objects.insert(key.to_string(), body);
        Ok(())
    }

    async fn head_object(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        bump(&self.counters.head);
        let buckets = self.buckets.read();
        let objects = buckets
            .get(bucket)
            .ok_or_else(|| StoreError::NoSuchBucket(bucket.to_string()))?;
        if objects.contains_key(key) {
            Ok(())
        } else {
            Err(StoreError::not_found(bucket, key))
        }
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        bump(&self.counters.delete);
        let mut buckets = self.buckets.write();
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| StoreError::NoSuchBucket(bucket.to_string()))?;
        objects
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(bucket, key))
    }

    async fn list_objects(
        &self,
        bucket: &str,
        cursor: Option<&Cursor>,
        limit: usize,
    ) -> Result<ListPage, StoreError> {
        bump(&self.counters.list);
        let buckets = self.buckets.read();
        let objects = buckets
            .get(bucket)
            .ok_or_else(|| StoreError::NoSuchBucket(bucket.to_string()))?;

        let start = match cursor {
            Some(c) => Bound::Excluded(c.as_str().to_string()),
            None => Bound::Unbounded,
        };
        let limit = limit.max(1);
        let mut keys: Vec<String> = objects
            .range((start, Bound::Unbounded))
            .map(|(k, _)| k.clone())
            .take(limit.saturating_add(1))
            .collect();

        let truncated = keys.len() > limit;
        if truncated {
            keys.pop();
        }
        let next_cursor = if truncated {
            keys.last().map(|k| Cursor::new(k.clone()))
        } else {
            None
        };

        Ok(ListPage {
            keys,
            next_cursor,
            truncated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_with(n: usize) -> MemoryStore {
        let store = MemoryStore::new();
        store.create_bucket("b").await.unwrap();
        for i in 0..n {
            store
                .put_object("b", &format!("k{i:03}"), Bytes::from_static(b"x"))
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn get_put_overwrite() {
        let store = store_with(0).await;
        store.put_object("b", "a", Bytes::from_static(b"one")).await.unwrap();
        store.put_object("b", "a", Bytes::from_static(b"two")).await.unwrap();
        assert_eq!(store.get_object("b", "a").await.unwrap(), Bytes::from_static(b"two"));
        assert_eq!(store.object_count("b"), 1);
    }

    #[tokio::test]
    async fn absent_objects_are_not_found() {
        let store = store_with(0).await;
        assert!(store.get_object("b", "nope").await.unwrap_err().is_not_found());
        assert!(store.head_object("b", "nope").await.unwrap_err().is_not_found());
        assert!(store.delete_object("b", "nope").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn missing_bucket_is_reported() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.put_object("ghost", "k", Bytes::new()).await,
            Err(StoreError::NoSuchBucket(_))
        ));
    }

    #[tokio::test]
    async fn create_twice_is_bucket_exists() {
        let store = MemoryStore::new();
        store.create_bucket("b").await.unwrap();
        assert!(matches!(
            store.create_bucket("b").await,
            Err(StoreError::BucketExists(_))
        ));
    }

    #[tokio::test]
    async fn list_pages_exact_boundary() {
        let store = store_with(3).await;
        let page = store.list_objects("b", None, 3).await.unwrap();
        assert_eq!(page.keys.len(), 3);
        assert!(!page.truncated);
        assert!(page.next_cursor.is_none());
    }

    #[tokio::test]
    async fn list_pages_follow_cursor() {
        let store = store_with(4).await;
        let first = store.list_objects("b", None, 3).await.unwrap();
        assert_eq!(first.keys, vec!["k000", "k001", "k002"]);
        assert!(first.truncated);

        let second = store
            .list_objects("b", first.next_cursor.as_ref(), 3)
            .await
            .unwrap();
        assert_eq!(second.keys, vec!["k003"]);
        assert!(!second.truncated);
        assert_eq!(store.calls().list, 2);
    }

    #[tokio::test]
    async fn unbounded_limit_lists_everything() {
        let store = store_with(3).await;
        let page = store.list_objects("b", None, usize::MAX).await.unwrap();
        assert_eq!(page.keys.len(), 3);
        assert!(!page.truncated);
    }
}

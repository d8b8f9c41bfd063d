//! ib-store: blob store backends and the bucket gateway.
//!
//! [`BlobStore`] is the raw key/value interface a backend must provide
//! (buckets, single-object get/put/head/delete, and paginated listing with an
//! opaque cursor). Two backends ship with the crate:
//!
//! - [`MemoryStore`]: in-process, ordered, with per-operation call counters
//! - [`S3Store`]: any S3-compatible service through `aws-sdk-s3`
//!
//! [`BlobStoreGateway`] layers the storage policy on top: idempotent bucket
//! ensure, idempotent delete, a lazy page stream, and the purge loop.

mod backend;
mod error;
mod gateway;
mod memory;
mod s3;

pub use backend::{BlobStore, BucketHandle, Cursor, ListPage};
pub use error::StoreError;
pub use gateway::{
    BlobStoreGateway, PurgeSummary, DEFAULT_DELETE_CONCURRENCY, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
pub use memory::{CallCounts, MemoryStore};
pub use s3::S3Store;

/// Blob store failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    #[error("bucket not found: {0}")]
    NoSuchBucket(String),

    #[error("bucket already exists: {0}")]
    BucketExists(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn not_found(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        StoreError::NotFound {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

impl From<StoreError> for ib_core::Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { key, .. } => ib_core::Error::not_found("image", key),
            StoreError::NoSuchBucket(name) => ib_core::Error::not_found("bucket", name),
            StoreError::Unavailable(msg) => ib_core::Error::StoreUnavailable(msg),
            other => ib_core::Error::StoreUnavailable(other.to_string()),
        }
    }
}

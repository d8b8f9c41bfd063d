//! Image ingest, fetch, delete and purge.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use ib_core::{derive_keys, flat_key, Category, Error, ImageFormat, Result, ORIGINAL_PREFIX};
use ib_image::ImageOptimizer;
use ib_store::{BlobStoreGateway, BucketHandle, PurgeSummary};
use serde::Serialize;
use utoipa::ToSchema;

/// Where an ingest currently is.
///
/// `Failed` is reachable from every stage before `Done`; nothing is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStage {
    Validating,
    Optimizing,
    UploadingOriginal,
    UploadingVariant,
    Done,
    Failed,
}

impl fmt::Display for IngestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Validating => "validating",
            Self::Optimizing => "optimizing",
            Self::UploadingOriginal => "uploading_original",
            Self::UploadingVariant => "uploading_variant",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Tracks one ingest through its stages and logs every transition.
struct IngestRun<'a> {
    source_path: &'a str,
    stage: IngestStage,
}

impl<'a> IngestRun<'a> {
    fn start(source_path: &'a str) -> Self {
        tracing::debug!(source_path, stage = %IngestStage::Validating, "Ingest started");
        Self {
            source_path,
            stage: IngestStage::Validating,
        }
    }

    fn advance(&mut self, next: IngestStage) {
        tracing::debug!(
            source_path = self.source_path,
            from = %self.stage,
            to = %next,
            "Ingest stage"
        );
        self.stage = next;
    }

    fn fail(&mut self, err: Error) -> Error {
        tracing::warn!(
            source_path = self.source_path,
            stage = %self.stage,
            error = %err,
            "Ingest failed"
        );
        self.stage = IngestStage::Failed;
        err
    }
}

/// What a successful ingest stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct IngestReceipt {
    /// Key of the untouched source bytes.
    pub original_key: String,
    /// Key of the scaled variant.
    pub variant_key: String,
    /// Pass this with the category to fetch or delete the variant.
    pub reference: String,
    pub format: ImageFormat,
    /// Variant width in pixels.
    pub width: u32,
    /// Variant height in pixels.
    pub height: u32,
    pub variant_file_name: String,
}

/// An object read back from the bucket.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub key: String,
    pub bytes: Bytes,
    pub content_type: &'static str,
}

/// Stateless coordinator for image operations on one bucket.
pub struct ImageService {
    gateway: Arc<BlobStoreGateway>,
    bucket: Arc<BucketHandle>,
    optimizer: ImageOptimizer,
}

impl ImageService {
    pub fn new(
        gateway: Arc<BlobStoreGateway>,
        bucket: BucketHandle,
        optimizer: ImageOptimizer,
    ) -> Self {
        Self {
            gateway,
            bucket: Arc::new(bucket),
            optimizer,
        }
    }

    /// The bucket every operation targets.
    pub fn bucket(&self) -> &BucketHandle {
        &self.bucket
    }

    /// Name of the backing store.
    pub fn backend(&self) -> &'static str {
        self.gateway.backend()
    }

    /// Store `body` as the original for `source_path` and a quarter-scale
    /// variant under `category`.
    ///
    /// The original is uploaded before the variant. If the variant upload
    /// fails the original stays in the bucket; ingesting the same path again
    /// overwrites both objects.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] for a bad category or an empty body
    /// - [`Error::UnsupportedFormat`] when the extension is not jpg, jpeg or png
    /// - [`Error::Optimize`] when the body cannot be decoded or scaled
    /// - [`Error::Upload`] when either object cannot be written
    pub async fn ingest(
        &self,
        category: &str,
        source_path: &str,
        body: Bytes,
    ) -> Result<IngestReceipt> {
        let mut run = IngestRun::start(source_path);
        match self.run_ingest(&mut run, category, source_path, body).await {
            Ok(receipt) => Ok(receipt),
            Err(e) => Err(run.fail(e)),
        }
    }

    async fn run_ingest(
        &self,
        run: &mut IngestRun<'_>,
        category: &str,
        source_path: &str,
        body: Bytes,
    ) -> Result<IngestReceipt> {
        let (category, format) = validate_ingest(category, source_path, &body)?;
        let keys = derive_keys(category.as_str(), source_path);

        run.advance(IngestStage::Optimizing);
        let optimizer = self.optimizer.clone();
        let source = body.clone();
        let path = source_path.to_string();
        let tag = category.to_string();
        let variant = tokio::task::spawn_blocking(move || {
            optimizer.optimize(&source, format, &path, &tag)
        })
        .await
        .map_err(|e| Error::Internal(format!("optimizer task failed: {e}")))??;

        run.advance(IngestStage::UploadingOriginal);
        self.gateway
            .put(&self.bucket, &keys.original_key, body)
            .await
            .map_err(|e| Error::upload(&keys.original_key, e.to_string()))?;

        run.advance(IngestStage::UploadingVariant);
        self.gateway
            .put(&self.bucket, &keys.variant_key, variant.bytes)
            .await
            .map_err(|e| Error::upload(&keys.variant_key, e.to_string()))?;

        run.advance(IngestStage::Done);
        tracing::info!(
            original = %keys.original_key,
            variant = %keys.variant_key,
            width = variant.width,
            height = variant.height,
            "Image ingested"
        );

        Ok(IngestReceipt {
            reference: keys.reference().to_string(),
            original_key: keys.original_key,
            variant_key: keys.variant_key,
            format,
            width: variant.width,
            height: variant.height,
            variant_file_name: variant.file_name,
        })
    }

    /// Re-ingest an image whose original is already stored.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when no original exists for `source_path`, plus
    /// everything [`ImageService::ingest`] can return.
    pub async fn update(
        &self,
        category: &str,
        source_path: &str,
        body: Bytes,
    ) -> Result<IngestReceipt> {
        let (category, _) = validate_ingest(category, source_path, &body)?;
        let keys = derive_keys(category.as_str(), source_path);

        if !self.gateway.exists(&self.bucket, &keys.original_key).await? {
            return Err(Error::not_found("image", &keys.original_key));
        }

        self.ingest(category.as_str(), source_path, body).await
    }

    /// Read the object at `category/reference`.
    ///
    /// `category` may be `original` to read back a stored source.
    pub async fn fetch(&self, category: &str, reference: &str) -> Result<FetchedImage> {
        let key = lookup_key(category, reference)?;
        let bytes = self.gateway.get(&self.bucket, &key).await?;

        let content_type = ImageFormat::from_path(reference)
            .map(|f| f.content_type())
            .unwrap_or("application/octet-stream");

        tracing::debug!(%key, bytes = bytes.len(), "Image fetched");
        Ok(FetchedImage {
            key,
            bytes,
            content_type,
        })
    }

    /// Delete the object at `category/reference`.
    ///
    /// Absent objects are not an error, and neither is a category that could
    /// never have been ingested: the key simply does not exist.
    pub async fn delete(&self, category: &str, reference: &str) -> Result<()> {
        let key = flat_key(category, reference);
        self.gateway.delete(&self.bucket, &key).await?;
        tracing::info!(%key, "Image deleted");
        Ok(())
    }

    /// Delete every object in the bucket.
    pub async fn purge(&self) -> Result<PurgeSummary> {
        Ok(self.gateway.purge_all(&self.bucket).await?)
    }

    /// Every key in the bucket.
    pub async fn list(&self) -> Result<Vec<String>> {
        Ok(self.gateway.list_all(&self.bucket).await?)
    }
}

fn validate_ingest(category: &str, source_path: &str, body: &[u8]) -> Result<(Category, ImageFormat)> {
    let format = ImageFormat::from_path(source_path)?;
    let category = Category::parse(category)?;
    if body.is_empty() {
        return Err(Error::Validation("image body is empty".into()));
    }
    Ok((category, format))
}

fn lookup_key(category: &str, reference: &str) -> Result<String> {
    if category != ORIGINAL_PREFIX {
        Category::parse(category)?;
    }
    if reference.is_empty() {
        return Err(Error::Validation("reference is empty".into()));
    }
    Ok(flat_key(category, reference))
}

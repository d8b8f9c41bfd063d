//! [`BlobStore`] over any S3-compatible service.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use aws_sdk_s3::Client;
use bytes::Bytes;
use ib_core::config::S3Config;

use crate::backend::{BlobStore, Cursor, ListPage};
use crate::error::StoreError;

/// S3 rejects `LocationConstraint` for its default region.
const DEFAULT_REGION: &str = "us-east-1";

/// S3 caps `max-keys` at 1000.
const MAX_KEYS: usize = 1000;

/// Object store backed by `aws-sdk-s3`.
///
/// Credentials come from the standard AWS provider chain (environment,
/// profile, instance metadata).
#[derive(Debug, Clone)]
pub struct S3Store {
    client: Client,
    region: Option<String>,
}

impl S3Store {
    /// Build a client from configuration.
    pub async fn from_config(config: &S3Config) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(ref region) = config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(config.force_path_style);
        if let Some(ref endpoint) = config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        let region = shared.region().map(|r| r.to_string());
        tracing::info!(
            region = region.as_deref().unwrap_or("unset"),
            endpoint = config.endpoint.as_deref().unwrap_or("aws"),
            "S3 client configured"
        );

        Self {
            client: Client::from_conf(builder.build()),
            region,
        }
    }
}

fn unavailable(op: &str, err: impl std::error::Error) -> StoreError {
    StoreError::Unavailable(format!("{op}: {}", DisplayErrorContext(err)))
}

#[async_trait]
impl BlobStore for S3Store {
    fn name(&self) -> &'static str {
        "s3"
    }

    async fn list_buckets(&self) -> Result<Vec<String>, StoreError> {
        let resp = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|e| unavailable("ListBuckets", e))?;

        Ok(resp
            .buckets()
            .iter()
            .filter_map(|b| b.name().map(str::to_string))
            .collect())
    }

    async fn create_bucket(&self, bucket: &str) -> Result<(), StoreError> {
        let mut req = self.client.create_bucket().bucket(bucket);
        if let Some(region) = self.region.as_deref().filter(|r| *r != DEFAULT_REGION) {
            req = req.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(region))
                    .build(),
            );
        }

        match req.send().await {
            Ok(_) => Ok(()),
            Err(e) => {
                let exists = e.as_service_error().is_some_and(|se| {
                    se.is_bucket_already_owned_by_you() || se.is_bucket_already_exists()
                });
                if exists {
                    Err(StoreError::BucketExists(bucket.to_string()))
                } else {
                    Err(unavailable("CreateBucket", e))
                }
            }
        }
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, StoreError> {
        let resp = match self.client.get_object().bucket(bucket).key(key).send().await {
            Ok(resp) => resp,
            Err(e) if e.as_service_error().is_some_and(|se| se.is_no_such_key()) => {
                return Err(StoreError::not_found(bucket, key));
            }
            Err(e) => return Err(unavailable("GetObject", e)),
        };

        let body = resp
            .body
            .collect()
            .await
            .map_err(|e| unavailable("GetObject body", e))?;
        Ok(body.into_bytes())
    }

    async fn put_object(&self, bucket: &str, key: &str, body: Bytes) -> Result<(), StoreError> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| unavailable("PutObject", e))?;
        Ok(())
    }

    async fn head_object(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        match self.client.head_object().bucket(bucket).key(key).send().await {
            Ok(_) => Ok(()),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => {
                Err(StoreError::not_found(bucket, key))
            }
            Err(e) => Err(unavailable("HeadObject", e)),
        }
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| unavailable("DeleteObject", e))?;
        Ok(())
    }

    async fn list_objects(
        &self,
        bucket: &str,
        cursor: Option<&Cursor>,
        limit: usize,
    ) -> Result<ListPage, StoreError> {
        let max_keys = limit.clamp(1, MAX_KEYS) as i32;
        let resp = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .max_keys(max_keys)
            .set_continuation_token(cursor.map(|c| c.as_str().to_string()))
            .send()
            .await
            .map_err(|e| unavailable("ListObjectsV2", e))?;

        let keys = resp
            .contents()
            .iter()
            .filter_map(|obj| obj.key().map(str::to_string))
            .collect();

        Ok(ListPage {
            keys,
            next_cursor: resp.next_continuation_token().map(Cursor::new),
            truncated: resp.is_truncated().unwrap_or(false),
        })
    }
}

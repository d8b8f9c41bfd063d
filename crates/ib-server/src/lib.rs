//! ib-server: HTTP API for imagebucket.
//!
//! This crate wires the other ib-* crates into a running server:
//!
//! - builds the configured blob store and ensures the bucket exists
//! - serves the image routes, health check and OpenAPI docs with Axum
//! - shuts down gracefully on Ctrl+C or SIGTERM

pub mod context;
pub mod error;
pub mod middleware;
pub mod router;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use ib_core::config::{Config, StorageBackend};
use ib_image::ImageOptimizer;
use ib_service::ImageService;
use ib_store::{BlobStore, BlobStoreGateway, MemoryStore, S3Store};

use crate::context::AppContext;

/// Build the [`ImageService`] described by `config`.
///
/// Connects to the configured backend and ensures the bucket exists, so the
/// returned service is ready to take requests.
pub async fn build_service(config: &Config) -> ib_core::Result<ImageService> {
    let store: Arc<dyn BlobStore> = match config.storage.backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::S3 => Arc::new(S3Store::from_config(&config.s3).await),
    };

    let gateway = Arc::new(
        BlobStoreGateway::new(store)
            .with_page_size(config.storage.page_size)
            .with_delete_concurrency(config.storage.delete_concurrency),
    );
    let bucket = gateway.ensure_bucket(&config.storage.bucket).await?;
    tracing::info!(backend = gateway.backend(), bucket = %bucket, "Bucket ready");

    let optimizer = match config.images.staging_dir {
        Some(ref dir) => ImageOptimizer::with_staging_dir(dir),
        None => ImageOptimizer::new(),
    };

    Ok(ImageService::new(gateway, bucket, optimizer))
}

/// Start the imagebucket server.
///
/// Returns when a shutdown signal is received.
pub async fn start(config: Config) -> ib_core::Result<()> {
    for warning in config.validate() {
        tracing::warn!("Config warning: {warning}");
    }

    let service = build_service(&config).await?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| ib_core::Error::Config(format!("Invalid server address: {e}")))?;

    let ctx = AppContext::new(service);
    let app = router::build_router(ctx);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ib_core::Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    tracing::info!("Starting server on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ib_core::Error::Internal(format!("Server error: {e}")))?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn build_service_over_memory_backend() {
        let mut config = Config::default();
        config.storage.bucket = "assets".into();

        let service = build_service(&config).await.unwrap();
        assert_eq!(service.backend(), "memory");
        assert_eq!(service.bucket().name(), "assets");
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_host_is_config_error() {
        let mut config = Config::default();
        config.server.host = "not a host".into();

        let err = start(config).await.unwrap_err();
        assert!(matches!(err, ib_core::Error::Config(_)));
    }
}

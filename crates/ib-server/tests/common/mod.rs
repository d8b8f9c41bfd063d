//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which builds an [`AppContext`] over a fresh
//! [`MemoryStore`]. The [`TestHarness::with_server`] constructor starts Axum
//! on a random port for HTTP-level testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use ib_core::config::Config;
use ib_image::ImageOptimizer;
use ib_server::context::AppContext;
use ib_server::router::build_router;
use ib_service::ImageService;
use ib_store::{BlobStoreGateway, MemoryStore};
use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};

/// Test harness wrapping an [`AppContext`] backed by an in-memory store.
pub struct TestHarness {
    pub ctx: AppContext,
    pub store: Arc<MemoryStore>,
    pub addr: SocketAddr,
}

impl TestHarness {
    /// Start a server with default configuration on a random port.
    pub async fn with_server() -> Self {
        Self::with_server_config(Config::default()).await
    }

    /// Start a server with a custom configuration on a random port.
    pub async fn with_server_config(config: Config) -> Self {
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(
            BlobStoreGateway::new(store.clone())
                .with_page_size(config.storage.page_size)
                .with_delete_concurrency(config.storage.delete_concurrency),
        );
        let bucket = gateway
            .ensure_bucket(&config.storage.bucket)
            .await
            .expect("failed to ensure bucket");
        let service = ImageService::new(gateway, bucket, ImageOptimizer::new());

        let ctx = AppContext::new(service);
        let app = build_router(ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self { ctx, store, addr }
    }

    /// Absolute URL for `path` on the running server.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// POST raw bytes to the ingest route.
    pub async fn ingest(&self, category: &str, source_path: &str, body: Vec<u8>) -> reqwest::Response {
        reqwest::Client::new()
            .post(self.url(&format!("/api/images/{category}")))
            .query(&[("path", source_path)])
            .body(body)
            .send()
            .await
            .expect("ingest request failed")
    }
}

/// A solid-colour JPEG of the given size.
pub fn jpeg(w: u32, h: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([200, 100, 50])));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Jpeg)
        .expect("jpeg encode");
    out.into_inner()
}

/// A translucent PNG of the given size.
pub fn png(w: u32, h: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([0, 0, 255, 128])));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .expect("png encode");
    out.into_inner()
}

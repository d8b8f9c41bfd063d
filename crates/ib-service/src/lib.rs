//! ib-service: image operations over a bucket.
//!
//! [`ImageService`] ties the key derivation from `ib-core`, the variant
//! optimizer from `ib-image` and the gateway from `ib-store` together. It
//! holds no mutable state of its own and is shared across request handlers
//! behind an `Arc`.

mod service;

pub use service::{FetchedImage, ImageService, IngestReceipt, IngestStage};

//! Shared application context.
//!
//! [`AppContext`] is handed to every route handler through Axum state. It is
//! cheap to clone: the service sits behind an `Arc` and is never mutated
//! after startup.

use std::sync::Arc;

use ib_service::ImageService;

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppContext {
    pub service: Arc<ImageService>,
}

impl AppContext {
    pub fn new(service: ImageService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

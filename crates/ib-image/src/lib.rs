//! ib-image: the variant optimizer.
//!
//! Decodes a JPG or PNG, scales it to a quarter of its size per side with an
//! area-averaging (box) filter, and re-encodes it in the same format. The
//! transform is CPU-only; callers on an async runtime should run it on a
//! blocking thread.

mod encode;
mod error;
mod optimizer;
mod resize;

pub use encode::JPEG_QUALITY;
pub use error::OptimizeError;
pub use optimizer::{scaled_dimensions, ImageOptimizer, OptimizedImage, VARIANT_SCALE};

//! The variant optimizer: decode, quarter-scale, re-encode.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use ib_core::ImageFormat;

use crate::encode::{decode_image, encode_image};
use crate::error::OptimizeError;
use crate::resize::box_resize;

/// Per-side scale factor applied to every variant.
pub const VARIANT_SCALE: f64 = 0.25;

/// A scaled derivative, owned by the ingest that produced it.
#[derive(Debug, Clone)]
pub struct OptimizedImage {
    /// `<source stem>_<variant tag>.<ext>`.
    pub file_name: String,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub bytes: Bytes,
}

/// Variant dimensions for a source of `width` x `height`.
pub fn scaled_dimensions(width: u32, height: u32) -> (u32, u32) {
    let scale = |side: u32| (f64::from(side) * VARIANT_SCALE).floor() as u32;
    (scale(width), scale(height))
}

/// Produces scaled variants.
///
/// With a staging directory configured, each encoded variant is written to a
/// fresh temporary directory under it and read back before returning; the
/// temporary directory is removed when the call returns, on success or error.
#[derive(Debug, Clone, Default)]
pub struct ImageOptimizer {
    staging_dir: Option<PathBuf>,
}

impl ImageOptimizer {
    /// Create an optimizer that works entirely in memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an optimizer that stages encoded variants under `dir`.
    pub fn with_staging_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            staging_dir: Some(dir.into()),
        }
    }

    /// Scale `source` (declared as `format`) to a quarter per side.
    ///
    /// # Errors
    ///
    /// [`OptimizeError::Decode`] when `source` is not a valid `format` image,
    /// [`OptimizeError::Encode`] when the scaled image is empty or cannot be
    /// encoded or staged.
    pub fn optimize(
        &self,
        source: &[u8],
        format: ImageFormat,
        source_path: &str,
        variant_tag: &str,
    ) -> Result<OptimizedImage, OptimizeError> {
        let img = decode_image(source, format)?;
        let (width, height) = scaled_dimensions(img.width(), img.height());

        tracing::debug!(
            source_w = img.width(),
            source_h = img.height(),
            width,
            height,
            %format,
            "scaling variant"
        );

        let resized = box_resize(&img, width, height)?;
        let encoded = encode_image(&resized, format)?;
        let file_name = variant_file_name(source_path, variant_tag, format);

        let bytes = match self.staging_dir {
            Some(ref dir) => stage(dir, &file_name, &encoded)?,
            None => Bytes::from(encoded),
        };

        Ok(OptimizedImage {
            file_name,
            format,
            width,
            height,
            bytes,
        })
    }
}

fn variant_file_name(source_path: &str, variant_tag: &str, format: ImageFormat) -> String {
    let stem = Path::new(source_path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{stem}_{variant_tag}.{}", format.extension())
}

fn stage(dir: &Path, file_name: &str, encoded: &[u8]) -> Result<Bytes, OptimizeError> {
    let staging = tempfile::Builder::new()
        .prefix("ib-variant-")
        .tempdir_in(dir)
        .map_err(|e| OptimizeError::Encode(format!("failed to create staging dir: {e}")))?;

    let path = staging.path().join(file_name);
    std::fs::write(&path, encoded)
        .map_err(|e| OptimizeError::Encode(format!("failed to stage {}: {e}", path.display())))?;
    let staged = std::fs::read(&path)
        .map_err(|e| OptimizeError::Encode(format!("failed to read {}: {e}", path.display())))?;

    Ok(Bytes::from(staged))
}

//! Unified error type for imagebucket.
//!
//! All crates funnel their failures into [`Error`], which carries enough context
//! for API handlers to derive an HTTP status code via [`Error::http_status`].

use std::fmt;

/// Which half of the optimizer failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizeStage {
    /// The source bytes were not a valid image of the declared format.
    Decode,
    /// The scaled image could not be produced or encoded.
    Encode,
}

impl fmt::Display for OptimizeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode => write!(f, "decode"),
            Self::Encode => write!(f, "encode"),
        }
    }
}

/// Unified error type covering all failure modes in imagebucket.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The file extension does not map to a supported image format.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Request data failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Producing the scaled variant failed.
    #[error("Optimize error [{stage}]: {message}")]
    Optimize {
        /// Decode or encode.
        stage: OptimizeStage,
        /// Human-readable error description.
        message: String,
    },

    /// Writing an object to the store failed.
    #[error("Upload error [{key}]: {message}")]
    Upload {
        /// The object key that could not be written.
        key: String,
        /// Human-readable error description.
        message: String,
    },

    /// The requested entity could not be found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "image", "bucket").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// The backing store could not be reached or rejected the call.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Configuration could not be loaded or is invalid.
    #[error("Config error: {0}")]
    Config(String),

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::UnsupportedFormat(_) => 415,
            Error::Validation(_) => 400,
            Error::Optimize { .. } => 422,
            Error::Upload { .. } => 502,
            Error::NotFound { .. } => 404,
            Error::StoreUnavailable(_) => 502,
            Error::Config(_) => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Short machine-readable code used in JSON error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Error::UnsupportedFormat(_) => "unsupported_format",
            Error::Validation(_) => "validation_error",
            Error::Optimize { .. } => "optimize_error",
            Error::Upload { .. } => "upload_error",
            Error::NotFound { .. } => "not_found",
            Error::StoreUnavailable(_) => "store_unavailable",
            Error::Config(_) => "config_error",
            Error::Internal(_) => "internal_error",
        }
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`Error::Optimize`].
    pub fn optimize(stage: OptimizeStage, message: impl Into<String>) -> Self {
        Error::Optimize {
            stage,
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Upload`].
    pub fn upload(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Upload {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_format_display() {
        let err = Error::UnsupportedFormat("gif".into());
        assert_eq!(err.to_string(), "Unsupported format: gif");
        assert_eq!(err.http_status(), 415);
        assert_eq!(err.code(), "unsupported_format");
    }

    #[test]
    fn optimize_display() {
        let err = Error::optimize(OptimizeStage::Decode, "bad header");
        assert_eq!(err.to_string(), "Optimize error [decode]: bad header");
        assert_eq!(err.http_status(), 422);
    }

    #[test]
    fn upload_display() {
        let err = Error::upload("original/abcd/x.jpg", "connection reset");
        assert_eq!(
            err.to_string(),
            "Upload error [original/abcd/x.jpg]: connection reset"
        );
        assert_eq!(err.http_status(), 502);
    }

    #[test]
    fn not_found_display() {
        let err = Error::not_found("image", "thumb/abcd.jpg");
        assert_eq!(err.to_string(), "image not found: thumb/abcd.jpg");
        assert_eq!(err.http_status(), 404);
        assert_eq!(err.code(), "not_found");
    }

    #[test]
    fn store_unavailable_display() {
        let err = Error::StoreUnavailable("timeout".into());
        assert_eq!(err.to_string(), "Store unavailable: timeout");
        assert_eq!(err.http_status(), 502);
    }

    #[test]
    fn validation_and_internal_status() {
        assert_eq!(Error::Validation("x".into()).http_status(), 400);
        assert_eq!(Error::Config("x".into()).http_status(), 500);
        assert_eq!(Error::Internal("x".into()).http_status(), 500);
    }
}

use ib_core::error::OptimizeStage;

/// Variant optimizer failure.
#[derive(Debug, thiserror::Error)]
pub enum OptimizeError {
    #[error("decode failed: {0}")]
    Decode(String),

    #[error("encode failed: {0}")]
    Encode(String),
}

impl From<OptimizeError> for ib_core::Error {
    fn from(err: OptimizeError) -> Self {
        match err {
            OptimizeError::Decode(msg) => ib_core::Error::optimize(OptimizeStage::Decode, msg),
            OptimizeError::Encode(msg) => ib_core::Error::optimize(OptimizeStage::Encode, msg),
        }
    }
}

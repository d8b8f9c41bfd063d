//! ib-core: shared errors, configuration, media types, and key derivation.
//!
//! This crate is the foundational dependency for all other ib-* crates. It
//! owns the unified [`Error`] type, the JSON [`config::Config`], the closed
//! [`ImageFormat`] enum, validated [`Category`] tags, and the pure object-key
//! derivation used when storing originals and their downscaled variants.

pub mod config;
pub mod error;
pub mod keys;
pub mod media;

// Re-export the most commonly used items at the crate root.
pub use error::{Error, Result};
pub use keys::{derive_keys, flat_key, DerivedKeys};
pub use media::*;

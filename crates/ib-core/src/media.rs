//! Media-domain types: the closed image format enum and validated category tags.
//!
//! Formats serialize in lowercase and implement `Display` manually for a
//! consistent string representation, matching how they appear in object keys
//! and file extensions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// ImageFormat
// ---------------------------------------------------------------------------

/// Image formats accepted at ingest.
///
/// Adding a format means extending this enum and the optimizer's
/// decode/encode match; there is no string dispatch past this point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpg,
    Png,
}

impl ImageFormat {
    /// Map a bare extension (no dot, any case) to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    /// Extract the extension after the last `.` of `path` and map it.
    ///
    /// Returns [`Error::UnsupportedFormat`] when there is no extension or it
    /// is not one of the supported formats.
    pub fn from_path(path: &str) -> Result<Self> {
        let ext = path
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty() && !ext.contains('/'))
            .ok_or_else(|| Error::UnsupportedFormat(format!("no file extension in '{path}'")))?;

        Self::from_extension(ext).ok_or_else(|| {
            Error::UnsupportedFormat(format!(
                "'.{ext}' is not supported; upload JPG or PNG"
            ))
        })
    }

    /// Canonical file extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpg => "jpg",
            Self::Png => "png",
        }
    }

    /// MIME type served for objects of this format.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Jpg => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Jpg => write!(f, "jpg"),
            Self::Png => write!(f, "png"),
        }
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Prefix reserved for untouched originals.
pub const ORIGINAL_PREFIX: &str = "original";

const MAX_CATEGORY_LEN: usize = 64;

/// A validated category tag, used as the variant key prefix.
///
/// Categories are ASCII alphanumerics, `-` and `_`, at most 64 characters,
/// and never equal to [`ORIGINAL_PREFIX`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Category(String);

impl Category {
    /// Validate and wrap a category tag.
    pub fn parse(tag: &str) -> Result<Self> {
        if tag.is_empty() {
            return Err(Error::Validation("category is empty".into()));
        }
        if tag.len() > MAX_CATEGORY_LEN {
            return Err(Error::Validation(format!(
                "category is too long (max {MAX_CATEGORY_LEN})"
            )));
        }
        if !tag
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(Error::Validation(format!(
                "invalid characters in category '{tag}'"
            )));
        }
        if tag.eq_ignore_ascii_case(ORIGINAL_PREFIX) {
            return Err(Error::Validation(format!(
                "'{ORIGINAL_PREFIX}' is reserved and cannot be used as a category"
            )));
        }
        Ok(Self(tag.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Category {
    type Error = Error;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.0
    }
}

impl AsRef<str> for Category {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

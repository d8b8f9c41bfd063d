//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from JSON and carries the
//! server, storage, S3, and image sub-configs. Every section defaults sensibly
//! so a completely empty `{}` file is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::{Category, Error};

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub s3: S3Config,
    pub images: ImageConfig,
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str).map_err(|e| Error::Config(format!("config parse error: {e}")))
    }

    /// Load configuration from a file path, failing if it cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_json(&contents)
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0; a random port will be assigned".into());
        }

        if self.storage.bucket.is_empty() {
            warnings.push("storage.bucket is empty".into());
        }

        if self.storage.page_size == 0 {
            warnings.push("storage.page_size is 0; listings will fetch one key per page".into());
        }

        if self.storage.delete_concurrency == 0 {
            warnings.push("storage.delete_concurrency is 0; deletes will run one at a time".into());
        }

        if Category::parse(&self.images.default_category).is_err() {
            warnings.push(format!(
                "images.default_category '{}' is not a valid category",
                self.images.default_category
            ));
        }

        if self.storage.backend == StorageBackend::S3 {
            if self.s3.region.is_none() && self.s3.endpoint.is_none() {
                warnings.push(
                    "s3 backend selected without region or endpoint; the AWS default chain decides"
                        .into(),
                );
            }
        } else if self.s3.endpoint.is_some() {
            warnings.push("s3.endpoint is set but storage.backend is not \"s3\"".into());
        }

        if let Some(ref dir) = self.images.staging_dir {
            if !dir.exists() {
                warnings.push(format!(
                    "images.staging_dir {} does not exist",
                    dir.display()
                ));
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
        }
    }
}

/// Which blob store implementation backs the bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// In-process store; contents are lost on exit.
    #[default]
    Memory,
    /// Any S3-compatible object store.
    S3,
}

/// Bucket and listing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Bucket ensured at startup and used for every request.
    pub bucket: String,
    /// Maximum keys per listing page.
    pub page_size: usize,
    /// Deletes in flight while purging one page.
    pub delete_concurrency: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            bucket: "images".into(),
            page_size: 1000,
            delete_concurrency: 8,
        }
    }
}

/// S3 client settings. Credentials come from the standard AWS provider chain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct S3Config {
    pub region: Option<String>,
    /// Custom endpoint for S3-compatible services (MinIO, R2, ...).
    pub endpoint: Option<String>,
    pub force_path_style: bool,
}

/// Image ingest settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// When set, encoded variants are staged in a temporary directory here.
    pub staging_dir: Option<PathBuf>,
    /// Category used by the CLI when none is given.
    pub default_category: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            staging_dir: None,
            default_category: "thumb".into(),
        }
    }
}

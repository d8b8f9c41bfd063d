//! Object-key derivation.
//!
//! Ingest stores every image under two sharded keys built from the source
//! path. The path is cut into fixed 4-character chunks (path separators are
//! not special); the first two chunks that are a full 4 characters and hold
//! no `.` become pseudo-directories in front of the flattened path:
//!
//! ```
//! use ib_core::derive_keys;
//!
//! let keys = derive_keys("thumb", "abcd1234.jpg");
//! assert_eq!(keys.original_key, "original/abcd/1234/abcd1234.jpg");
//! assert_eq!(keys.variant_key, "thumb/abcd/1234/abcd1234.jpg");
//! assert_eq!(keys.file_token, "abcd");
//! ```
//!
//! Fetch and delete use the independent [`flat_key`] scheme instead.

use crate::media::ORIGINAL_PREFIX;

/// Width of a shard chunk, in characters.
pub const CHUNK_LEN: usize = 4;

/// Maximum number of shard directories placed in front of the path.
pub const MAX_SHARDS: usize = 2;

/// Keys derived for one `(category, source_path)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedKeys {
    /// Where the untouched source bytes are stored.
    pub original_key: String,
    /// Where the scaled derivative is stored.
    pub variant_key: String,
    /// First chunk of the source path, unmodified.
    pub file_token: String,
    suffix: String,
}

impl DerivedKeys {
    /// The shared suffix without its leading `/`.
    ///
    /// Passing this as the reference to a flat-key fetch under the same
    /// category addresses the variant object.
    pub fn reference(&self) -> &str {
        self.suffix.trim_start_matches('/')
    }
}

/// Derive the original and variant keys for a source path.
pub fn derive_keys(category: &str, source_path: &str) -> DerivedKeys {
    let chars: Vec<char> = source_path.chars().collect();
    let chunks: Vec<String> = chars
        .chunks(CHUNK_LEN)
        .map(|chunk| chunk.iter().collect())
        .collect();

    let file_token = chunks.first().cloned().unwrap_or_default();

    let mut suffix = String::with_capacity(source_path.len() + 2 * (CHUNK_LEN + 1) + 1);
    for shard in chunks
        .iter()
        .filter(|c| c.chars().count() == CHUNK_LEN && !c.contains('.'))
        .take(MAX_SHARDS)
    {
        suffix.push('/');
        suffix.push_str(&flatten(shard));
    }
    suffix.push('/');
    suffix.push_str(&flatten(source_path));

    DerivedKeys {
        original_key: format!("{ORIGINAL_PREFIX}{suffix}"),
        variant_key: format!("{category}{suffix}"),
        file_token,
        suffix,
    }
}

/// Key used by fetch and delete: `category/reference`, no sharding.
pub fn flat_key(category: &str, reference: &str) -> String {
    format!("{category}/{reference}")
}

fn flatten(segment: &str) -> String {
    segment.replace('/', "_")
}

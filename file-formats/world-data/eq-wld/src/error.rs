//! Error types for WLD parsing and graph building.

use thiserror::Error;

/// Errors that can occur while reading or writing WLD data.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error while reading or writing
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream does not start with the WLD header bytes
    #[error("invalid wld header: expected [02 3d 50 54], found {found:02x?}")]
    InvalidHeader {
        /// Bytes found at the start of the stream
        found: [u8; 4],
    },

    /// The version field is neither the old-world nor the new-world value
    #[error("unknown wld version {0:#010x}")]
    UnsupportedVersion(u32),

    /// A name reference points outside the string table
    #[error("name not found at offset {offset}")]
    NameNotFound {
        /// Byte offset into the string table
        offset: u32,
    },

    /// A fragment declares a payload larger than the stream-level maximum
    #[error("fragment {index} size {size} exceeds stream maximum {max}")]
    FragmentTooLarge {
        /// 1-based fragment index
        index: usize,
        /// Declared payload size
        size: u32,
        /// Maximum fragment size from the stream header
        max: u32,
    },

    /// A fragment payload could not be decoded
    #[error("fragment {index} ({kind}): {reason}")]
    InvalidFragment {
        /// 1-based fragment index
        index: usize,
        /// Fragment type tag
        kind: &'static str,
        /// Description of the failure
        reason: String,
    },

    /// A fragment references an index that has not been decoded yet, or one
    /// of the wrong kind
    #[error("fragment {index} references {expected} {target}, which does not exist")]
    DanglingRef {
        /// 1-based index of the referencing fragment
        index: usize,
        /// Kind of entity the reference was expected to resolve to
        expected: &'static str,
        /// The raw reference value
        target: i32,
    },

    /// An entity referenced by tag during encode is not present in the graph
    #[error("{referrer} refers to {kind} {tag:?}, which does not exist")]
    MissingEntity {
        /// Tag of the referencing entity
        referrer: String,
        /// Kind of the missing entity
        kind: &'static str,
        /// Tag that failed to resolve
        tag: String,
    },
}

/// Result type alias for WLD operations
pub type Result<T> = std::result::Result<T, Error>;

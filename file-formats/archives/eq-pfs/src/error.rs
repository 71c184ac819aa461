//! Error types for the PFS archive library

use std::io;
use thiserror::Error;

/// Result type alias for PFS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for PFS operations
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid PFS format or corrupted archive
    #[error("Invalid PFS format: {0}")]
    InvalidFormat(String),

    /// Unsupported PFS version
    #[error("Unsupported PFS version: 0x{0:08X}")]
    UnsupportedVersion(u32),

    /// File not found in archive
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Directory entry points at data the stream does not contain
    #[error("Directory error: {0}")]
    Directory(String),

    /// Compression/decompression error
    #[error("Compression error: {0}")]
    Compression(String),
}

impl Error {
    /// Creates an invalid format error with context
    pub fn invalid_format<S: Into<String>>(message: S) -> Self {
        Self::InvalidFormat(message.into())
    }

    /// Creates a compression error with context
    pub fn compression<S: Into<String>>(message: S) -> Self {
        Self::Compression(message.into())
    }
}

//! Error types for the EQG format library

use std::io;
use thiserror::Error;

/// Result type alias for EQG operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for EQG format operations
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Magic bytes did not match the expected format
    #[error("Invalid magic {found:?}, expected {expected:?}")]
    InvalidMagic {
        /// Expected magic string
        expected: &'static str,
        /// What the stream actually contained
        found: String,
    },

    /// Version with no known field layout
    #[error("Unsupported {format} version {version}")]
    UnsupportedVersion {
        /// Format short name
        format: &'static str,
        /// Version read from the header
        version: u32,
    },

    /// Name-table offset with no entry
    #[error("Name not found at offset {0}")]
    NameNotFound(u32),

    /// Structurally invalid record
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

impl Error {
    /// Creates an invalid record error with context
    pub fn invalid_record<S: Into<String>>(message: S) -> Self {
        Self::InvalidRecord(message.into())
    }
}

//! Error types for the exporters.

use thiserror::Error;

/// Errors raised while exporting model data
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// glTF document serialization failure
    #[error("glTF serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Texture decode or re-encode failure
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// A texture with an extension no converter handles
    #[error("unsupported texture extension in '{0}'")]
    UnsupportedTexture(String),

    /// A triangle references a vertex index past the vertex list
    #[error("triangle references vertex {index} but only {count} vertices exist")]
    VertexOutOfRange { index: u32, count: usize },
}

/// Result type for export operations
pub type Result<T> = std::result::Result<T, Error>;

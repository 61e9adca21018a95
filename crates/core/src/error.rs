//! Error types for content validation, layout, and deck rendering.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can abort the presentation pipeline.
///
/// A missing image is deliberately absent from this list: image search
/// misses and exhausted downloads degrade the layout instead of failing it.
#[derive(Error, Debug)]
pub enum Error {
    /// The generated content could not be parsed into a content tree.
    #[error("Malformed presentation content: {0}")]
    MalformedContent(String),

    /// The generation collaborator returned an error message instead of content.
    #[error("{0}")]
    GenerationFailure(String),

    /// The deck file could not be written.
    #[error("Failed to render presentation: {0}")]
    RenderFailure(String),

    /// Failed to read or write a file.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML error (for PPTX).
    #[error("XML error: {0}")]
    XmlError(String),
}

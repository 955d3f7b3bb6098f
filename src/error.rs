//! Error types for the render pipeline.
//!
//! [`RenderError`] is terminal for a render attempt. [`SignatureError`] never
//! escapes the pipeline: a failed signature is logged and the invoice is laid
//! out without one.

/// Result type alias for render operations.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Errors that abort a render.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The output channel could not be opened, written or flushed.
    #[error("output error: {0}")]
    Io(#[from] std::io::Error),

    /// The flow engine rejected the document tree.
    #[error("layout failed: {0}")]
    Layout(String),

    /// The PDF encoder failed.
    #[error("PDF encoding failed: {0}")]
    Encode(String),

    /// Invoice or layout JSON could not be parsed.
    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<taffy::TaffyError> for RenderError {
    fn from(e: taffy::TaffyError) -> Self {
        RenderError::Layout(e.to_string())
    }
}

/// Reasons a signature image could not be resolved.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    /// Network download failed or timed out.
    #[error("failed to fetch signature from {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// Remote reference given but the crate was built without `fetch`.
    #[error("remote signature {0} requires the `fetch` feature")]
    FetchDisabled(String),

    /// Local file could not be read.
    #[error("failed to read signature file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Malformed `data:` URI.
    #[error("invalid data URI: {0}")]
    DataUri(String),

    /// Bytes are not a decodable PNG/JPEG image.
    #[error("failed to decode signature image: {0}")]
    Decode(#[from] image::ImageError),
}

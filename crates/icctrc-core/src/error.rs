//! Top-level error types for icctrc-core

use thiserror::Error;

use crate::icc::IccError;

/// Result type for icctrc-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while opening a profile or decoding pixels.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Failed to parse the ICC profile itself.
    #[error("profile parse error: {0}")]
    Parse(#[from] IccError),

    /// I/O error while reading a profile from a caller-provided source.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

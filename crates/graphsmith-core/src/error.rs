//! Error types for core operations

use thiserror::Error;

/// Result alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised by core components.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Chunker was constructed with invalid parameters.
    ///
    /// Raised before any processing begins; chunk parameters are never
    /// silently clamped.
    #[error("Invalid chunk configuration: {0}")]
    InvalidChunkConfig(String),
}

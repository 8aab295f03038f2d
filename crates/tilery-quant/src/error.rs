//! Error types for tilery-quant

use thiserror::Error;

/// Errors from quantization and dithering
#[derive(Debug, Error)]
pub enum QuantError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] tilery_core::Error),

    /// Quantizing an empty histogram
    #[error("empty histogram: no colors to quantize")]
    EmptyHistogram,

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

/// Result type for quantization operations
pub type QuantResult<T> = Result<T, QuantError>;

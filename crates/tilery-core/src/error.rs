//! Error types for tilery-core
//!
//! Provides a unified error type for the core data structures. Each variant
//! captures the limit that was violated and the value that violated it, so
//! callers can report failures without re-deriving context.

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid image dimensions
    #[error("invalid image dimensions: {width}x{height}")]
    InvalidDimension { width: u32, height: u32 },

    /// Pixel buffer length does not match the declared dimensions
    #[error("pixel count mismatch: expected {expected}, got {actual}")]
    PixelCountMismatch { expected: usize, actual: usize },

    /// Palette grew past its slot budget (len + offset > 256)
    #[error("palette full: {len} colors at offset {offset} exceed 256 slots")]
    PaletteFull { len: usize, offset: u16 },

    /// Palette index offset alone exceeds the slot budget
    #[error("invalid palette offset: {0} >= 256")]
    InvalidOffset(u16),

    /// Palette bank grew past its 16-color budget
    #[error("palette bank {bank} full: {len} colors exceed 16 slots")]
    BankFull { bank: u8, len: usize },

    /// Nearest-color search against an empty palette
    #[error("empty palette: no colors to search")]
    EmptyPalette,

    /// Index out of bounds
    #[error("index out of bounds: {index} >= {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;

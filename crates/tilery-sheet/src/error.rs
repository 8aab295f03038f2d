//! Sheet error types

use thiserror::Error;

/// Errors from sprite validation and sheet allocation.
#[derive(Debug, Error)]
pub enum SheetError {
    /// The tile-unit dimensions match no hardware sprite shape.
    #[error("{name}: {width}x{height} tiles is not a valid sprite shape")]
    BadSpriteShape { name: String, width: u32, height: u32 },

    /// A sprite needs at least one frame.
    #[error("{name}: sprite has no frames")]
    NoFrames { name: String },

    /// Sheets exist in two fixed tile-unit sizes.
    #[error("sprite sheet must be 16x32 or 32x32 tiles, got {width}x{height}")]
    BadSheetSize { width: u32, height: u32 },

    /// No free block chain can produce the requested size.
    #[error("{name}: no room in the sheet for a {width}x{height}-tile block")]
    SheetFull { name: String, width: u32, height: u32 },

    /// The 1D tile space ran out.
    #[error("{name}: linear tile space exhausted, needs {got} of {limit} tiles")]
    LinearFull { name: String, limit: u32, got: u32 },
}

pub type SheetResult<T> = Result<T, SheetError>;

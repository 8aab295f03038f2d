//! Error types for tile and map construction

use thiserror::Error;

/// Errors from tile extraction, tileset building and map assembly.
///
/// Capacity failures carry the source image name, the limit and the
/// observed value; shape failures carry the offending dimensions.
#[derive(Error, Debug)]
pub enum TileError {
    /// Core data-structure error.
    #[error(transparent)]
    Core(#[from] tilery_core::Error),

    /// Quantization error.
    #[error(transparent)]
    Quant(#[from] tilery_quant::QuantError),

    /// Unique tile count passed the hardware ceiling.
    #[error("{name}: {got} unique tiles exceed the {limit}-tile ceiling")]
    TileOverflow {
        name: String,
        limit: usize,
        got: usize,
    },

    /// Combined distinct colors across all tile palettes passed the
    /// hardware palette budget.
    #[error("{name}: {got} distinct colors exceed the {limit}-color budget")]
    CombinedColors {
        name: String,
        limit: usize,
        got: usize,
    },

    /// A frame does not divide into bordered 8x8 tiles.
    #[error("{name}: {width}x{height} does not divide into tiles with a {border}px border")]
    BadFrameSize {
        name: String,
        width: u32,
        height: u32,
        border: u32,
    },

    /// A map frame is not one of the hardware-valid sizes.
    #[error("{name}: {width}x{height} is not a valid map size")]
    BadMapSize {
        name: String,
        width: u32,
        height: u32,
    },

    /// An affine map cell needs a mirrored tile, which affine cells cannot
    /// encode.
    #[error("{name}: affine maps cannot express mirrored tiles")]
    AffineFlip { name: String },
}

/// Result alias for tile operations.
pub type TileResult<T> = Result<T, TileError>;

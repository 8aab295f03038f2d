//! Pipeline error type
//!
//! [`CompileError`] wraps every downstream failure and adds the driver's
//! own. Each error resolves through [`CompileError::class`] to one of
//! three classes: configuration errors, capacity errors (the ones `force`
//! downgrades to warnings), and shape errors, which no flag overrides.

use thiserror::Error;

use tilery_quant::QuantError;
use tilery_sheet::SheetError;
use tilery_tiles::TileError;

/// Broad category of a compilation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Rejected settings or inputs; nothing was compiled.
    Configuration,
    /// A hardware budget ran out. `force` turns these into warnings.
    Capacity,
    /// Dimensions the hardware cannot represent at all.
    Shape,
}

/// Errors from pipeline runs.
#[derive(Error, Debug)]
pub enum CompileError {
    /// Rejected configuration or inputs.
    #[error("configuration: {0}")]
    Config(String),

    /// A sprite frame does not divide into 8x8 tiles.
    #[error("{name}: frames are {width}x{height}px, not whole 8x8 tiles")]
    RaggedFrame {
        name: String,
        width: u32,
        height: u32,
    },

    /// Frames of one sprite disagree on size.
    #[error("{name}: frame {frame} is {got_width}x{got_height}px, expected {width}x{height}px")]
    MixedFrames {
        name: String,
        frame: usize,
        width: u32,
        height: u32,
        got_width: u32,
        got_height: u32,
    },

    /// Core data-structure error.
    #[error(transparent)]
    Core(#[from] tilery_core::Error),

    /// Quantization error.
    #[error(transparent)]
    Quant(#[from] QuantError),

    /// Tileset or map error.
    #[error(transparent)]
    Tiles(#[from] TileError),

    /// Sprite or sheet error.
    #[error(transparent)]
    Sheet(#[from] SheetError),
}

/// Result type alias for pipeline operations.
pub type CompileResult<T> = Result<T, CompileError>;

impl CompileError {
    /// The class this failure falls into.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Config(_) => ErrorClass::Configuration,
            Self::RaggedFrame { .. } | Self::MixedFrames { .. } => ErrorClass::Shape,
            Self::Core(e) => core_class(e),
            Self::Quant(e) => quant_class(e),
            Self::Tiles(e) => tiles_class(e),
            Self::Sheet(e) => sheet_class(e),
        }
    }
}

fn core_class(e: &tilery_core::Error) -> ErrorClass {
    use tilery_core::Error;
    match e {
        Error::InvalidDimension { .. } | Error::PixelCountMismatch { .. } => ErrorClass::Shape,
        Error::PaletteFull { .. } | Error::BankFull { .. } => ErrorClass::Capacity,
        Error::InvalidOffset(_)
        | Error::EmptyPalette
        | Error::IndexOutOfBounds { .. }
        | Error::InvalidParameter(_) => ErrorClass::Configuration,
    }
}

fn quant_class(e: &QuantError) -> ErrorClass {
    match e {
        QuantError::Core(inner) => core_class(inner),
        QuantError::EmptyHistogram | QuantError::InvalidParameters(_) => ErrorClass::Configuration,
    }
}

fn tiles_class(e: &TileError) -> ErrorClass {
    match e {
        TileError::Core(inner) => core_class(inner),
        TileError::Quant(inner) => quant_class(inner),
        TileError::TileOverflow { .. } | TileError::CombinedColors { .. } => ErrorClass::Capacity,
        TileError::BadFrameSize { .. } | TileError::BadMapSize { .. } | TileError::AffineFlip { .. } => {
            ErrorClass::Shape
        }
    }
}

fn sheet_class(e: &SheetError) -> ErrorClass {
    match e {
        SheetError::SheetFull { .. } | SheetError::LinearFull { .. } => ErrorClass::Capacity,
        SheetError::BadSpriteShape { .. } => ErrorClass::Shape,
        SheetError::NoFrames { .. } | SheetError::BadSheetSize { .. } => ErrorClass::Configuration,
    }
}

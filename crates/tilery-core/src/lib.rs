//! Tilery Core - Color and palette data structures
//!
//! This crate provides the fundamental types shared by every stage of the
//! asset compiler:
//!
//! - [`Color`] / [`Color16`] / [`ColorLab`] - working, hardware and
//!   perceptual color representations
//! - [`Palette`] - up to 256 hardware colors with an index offset
//! - [`PaletteBank`] / [`BankSet`] - the sixteen 16-color 4bpp palettes
//! - [`SearchCache`] + [`nearest`] - memoized nearest-color search
//! - [`Raster`] / [`IndexRaster`] - RGBA input and quantized index buffers
//! - [`PaletteHandle`] / [`TilesetHandle`] / [`SheetHandle`] - integer
//!   handles into the pipeline's resource tables
//! - [`Warning`] - accumulated non-fatal diagnostics
//!
//! Everything here is a plain value: no interior mutability, no shared
//! ownership. Caches and statistics live in side tables owned by callers.

pub mod bank;
pub mod color;
pub mod error;
pub mod handle;
pub mod palette;
pub mod raster;
pub mod search;
pub mod warning;

// Types
pub use bank::{BANK_COUNT, BANK_SIZE, BankSet, MergePlan, PaletteBank};
pub use color::{Color, Color16, ColorLab, WEIGHT_A, WEIGHT_B, WEIGHT_L};
pub use error::{Error, Result};
pub use handle::{PaletteHandle, SheetHandle, TilesetHandle};
pub use palette::{MAX_SLOTS, Palette};
pub use raster::{IndexRaster, Raster};
pub use search::{EntryStats, PaletteMatch, SearchCache};
pub use warning::{Warning, WarningKind};

// Functions
pub use color::{color_distance_sq, is_transparent};
pub use search::{nearest, nearest_slot};

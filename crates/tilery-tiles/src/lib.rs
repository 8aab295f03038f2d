//! Tile extraction, deduplication and maps for tilery
//!
//! This crate turns quantized frames into console-ready tile data:
//!
//! - **Tiles**: 8x8 pixel and index tiles with the four mirror
//!   orientations
//! - **Tilesets**: order-preserving dedup with dense ids from 1 and a
//!   synthetic null tile at id 0, holding one shared palette (8bpp) or
//!   sixteen banks (4bpp)
//! - **Bank allocation**: the 4bpp pipeline quantizes each tile locally,
//!   then merges tile palettes into hardware banks, lossily when it must
//! - **Maps**: text and affine background cell grids over a tileset
//! - **Serialization**: little-endian hardware byte layouts
//!
//! Color math, palettes and banks come from `tilery-core`; quantization
//! from `tilery-quant`.

pub mod error;
pub mod map;
pub mod serial;
pub mod tile;
pub mod tileset;

// Types
pub use error::{TileError, TileResult};
pub use map::{AFFINE_SIZES, MapKind, SCREEN_BLOCK_CELLS, TEXT_SIZES, TileMap};
pub use tile::{Flip, ImageTile, TILE_PIXELS, TILE_SIDE, Tile};
pub use tileset::{
    AFFINE_TILE_LIMIT, BankAssignment, LocalTile, TEXT_TILE_LIMIT, TileBuild, TileGrid, TileRef,
    Tileset, TilesetOptions, TilesetPalettes,
};

// Functions
pub use map::{build_map, text_cell};
pub use serial::{
    bank_palette_bytes, map_bytes, pack_tile_4bpp, palette_bytes, raw_frame_bytes, tileset_bytes,
};
pub use tileset::{assign_bank, build_4bpp, build_8bpp, quantize_tile};

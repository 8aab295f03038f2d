//! Hardware byte emission
//!
//! Everything little-endian, matching the console's native layouts:
//! 4bpp tiles pack two pixels per byte with the left pixel in the low
//! nibble (32 bytes per tile), 8bpp tiles one pixel per byte (64 bytes),
//! text map cells as u16 in screen-block order, affine cells as u8
//! row-major, palettes as consecutive u16 color values.

use tilery_core::{BANK_SIZE, BankSet, Color16, Raster};

use crate::map::{MapKind, SCREEN_BLOCK_CELLS, TileMap};
use crate::tile::TILE_PIXELS;
use crate::tileset::{Tileset, TilesetPalettes};

/// Pack an 8x8 index buffer as 4bpp, low nibble first.
pub fn pack_tile_4bpp(indices: &[u8; TILE_PIXELS]) -> [u8; TILE_PIXELS / 2] {
    let mut out = [0u8; TILE_PIXELS / 2];
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = (indices[2 * i] & 0xF) | ((indices[2 * i + 1] & 0xF) << 4);
    }
    out
}

/// Serialize every tile of a tileset in id order.
pub fn tileset_bytes(tileset: &Tileset) -> Vec<u8> {
    let mut out = Vec::new();
    match tileset.palettes() {
        TilesetPalettes::Banked(_) => {
            out.reserve(tileset.len() * TILE_PIXELS / 2);
            for tile in tileset.tiles() {
                out.extend_from_slice(&pack_tile_4bpp(tile.indices()));
            }
        }
        TilesetPalettes::Shared(_) => {
            out.reserve(tileset.len() * TILE_PIXELS);
            for tile in tileset.tiles() {
                out.extend_from_slice(tile.indices());
            }
        }
    }
    out
}

/// Serialize a map. Text maps emit u16 cells one 32x32-cell screen block
/// at a time, blocks left to right then top to bottom; affine maps emit
/// u8 cells linearly.
pub fn map_bytes(map: &TileMap) -> Vec<u8> {
    match map.kind() {
        MapKind::Text => {
            let mut out = Vec::with_capacity(map.cells().len() * 2);
            let blocks_x = map.width() / SCREEN_BLOCK_CELLS;
            let blocks_y = map.height() / SCREEN_BLOCK_CELLS;
            for block_y in 0..blocks_y {
                for block_x in 0..blocks_x {
                    for y in 0..SCREEN_BLOCK_CELLS {
                        for x in 0..SCREEN_BLOCK_CELLS {
                            let cx = block_x * SCREEN_BLOCK_CELLS + x;
                            let cy = block_y * SCREEN_BLOCK_CELLS + y;
                            let cell = map.cells()[(cy * map.width() + cx) as usize];
                            out.extend_from_slice(&cell.to_le_bytes());
                        }
                    }
                }
            }
            out
        }
        MapKind::Affine => map.cells().iter().map(|&cell| cell as u8).collect(),
    }
}

/// Serialize colors as consecutive u16 hardware values.
pub fn palette_bytes(colors: &[Color16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(colors.len() * 2);
    for color in colors {
        out.extend_from_slice(&color.bits().to_le_bytes());
    }
    out
}

/// Serialize all sixteen banks as one 256-entry palette, each bank padded
/// to its 16-slot boundary with zero entries.
pub fn bank_palette_bytes(banks: &BankSet) -> Vec<u8> {
    let mut out = Vec::with_capacity(BANK_SIZE * banks.banks().len() * 2);
    for bank in banks.banks() {
        out.extend_from_slice(&palette_bytes(bank.colors()));
        for _ in bank.len()..BANK_SIZE {
            out.extend_from_slice(&0u16.to_le_bytes());
        }
    }
    out
}

/// Serialize a full frame as row-major u16 hardware colors.
pub fn raw_frame_bytes(raster: &Raster) -> Vec<u8> {
    let mut out = Vec::with_capacity(raster.pixels().len() * 2);
    for color in raster.to_color16() {
        out.extend_from_slice(&color.bits().to_le_bytes());
    }
    out
}

//! Compiled artifacts
//!
//! [`Artifact`] is the closed set of things a pipeline run can emit. Every
//! variant serializes to the console's little-endian binary layout through
//! the one [`Artifact::to_bytes`] entry point; consumers link the returned
//! buffers into a ROM as they are.

use tilery_core::{IndexRaster, Palette, Raster};
use tilery_sheet::{Placement, Sprite};
use tilery_tiles::{
    TILE_PIXELS, TILE_SIDE, TileMap, Tileset, map_bytes, pack_tile_4bpp, palette_bytes,
    raw_frame_bytes, tileset_bytes,
};

use crate::config::BitDepth;

/// One compiled sprite: its identity plus its quantized frames.
#[derive(Debug, Clone)]
pub struct SpriteData {
    /// Shape, frame count, palette bank and placement.
    pub sprite: Sprite,
    /// One index raster per animation frame. 4bpp frames hold bank-local
    /// slots, 8bpp frames hold absolute palette indices.
    pub frames: Vec<IndexRaster>,
    /// Depth the frames were quantized at.
    pub depth: BitDepth,
}

/// A packed sheet: the blitted canvas plus the sprites on it.
#[derive(Debug, Clone)]
pub struct SheetData {
    /// The sheet surface with every placed sprite's first frame blitted at
    /// its block.
    pub canvas: IndexRaster,
    /// Every sprite handed to the packer, placed or not.
    pub sprites: Vec<SpriteData>,
    /// Depth of the canvas indices.
    pub depth: BitDepth,
}

/// Everything a pipeline run can produce.
#[derive(Debug, Clone)]
pub enum Artifact {
    /// A 16bpp bitmap frame, no tiles involved.
    RawImage(Raster),
    /// A palette run as loaded into palette RAM.
    Palette(Palette),
    /// A deduplicated tile store.
    Tileset(Tileset),
    /// A background cell grid.
    Map(TileMap),
    /// One sprite's frames, back to back.
    Sprite(SpriteData),
    /// A sheet canvas followed by placement records.
    SpriteSheet(SheetData),
}

impl Artifact {
    /// Serialize to the console's binary layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::RawImage(raster) => raw_frame_bytes(raster),
            Self::Palette(palette) => palette_bytes(palette.colors()),
            Self::Tileset(tileset) => tileset_bytes(tileset),
            Self::Map(map) => map_bytes(map),
            Self::Sprite(data) => sprite_bytes(data),
            Self::SpriteSheet(data) => sheet_bytes(data),
        }
    }
}

/// Per-sprite placement record appended after a sheet's tile data, 8 bytes
/// little-endian: tile offset (u16), OBJ shape and size packed as
/// `shape << 2 | size` (u8), palette bank (u8, 0xFF when unassigned), frame
/// count (u16), tiles per frame (u16). An unplaced sprite has no record.
pub fn placement_record(sprite: &Sprite, tiles_per_row: u32) -> Option<[u8; 8]> {
    let offset = match sprite.placement()? {
        Placement::Sheet(block) => block.y * tiles_per_row + block.x,
        Placement::Linear(start) => start,
    };
    let shape = sprite.shape();
    let mut record = [0u8; 8];
    record[..2].copy_from_slice(&(offset as u16).to_le_bytes());
    record[2] = ((shape.obj_shape() as u8) << 2) | shape.obj_size();
    record[3] = sprite.bank().unwrap_or(0xFF);
    record[4..6].copy_from_slice(&(sprite.frames() as u16).to_le_bytes());
    record[6..8].copy_from_slice(&(sprite.frame_tiles() as u16).to_le_bytes());
    Some(record)
}

fn sprite_bytes(data: &SpriteData) -> Vec<u8> {
    let mut out = Vec::new();
    for frame in &data.frames {
        frame_tile_bytes(frame, data.depth, &mut out);
    }
    out
}

fn sheet_bytes(data: &SheetData) -> Vec<u8> {
    let mut out = Vec::new();
    frame_tile_bytes(&data.canvas, data.depth, &mut out);
    let tiles_per_row = data.canvas.width() / TILE_SIDE;
    for sprite in &data.sprites {
        if let Some(record) = placement_record(&sprite.sprite, tiles_per_row) {
            out.extend_from_slice(&record);
        }
    }
    out
}

/// Emit a raster's 8x8 tiles row-major, packed for `depth`. Pixels past
/// the last whole tile boundary are ignored.
fn frame_tile_bytes(frame: &IndexRaster, depth: BitDepth, out: &mut Vec<u8>) {
    for ty in 0..frame.height() / TILE_SIDE {
        for tx in 0..frame.width() / TILE_SIDE {
            let mut indices = [0u8; TILE_PIXELS];
            for y in 0..TILE_SIDE {
                for x in 0..TILE_SIDE {
                    if let Some(index) = frame.get(tx * TILE_SIDE + x, ty * TILE_SIDE + y) {
                        indices[(y * TILE_SIDE + x) as usize] = index;
                    }
                }
            }
            match depth {
                BitDepth::Four => out.extend_from_slice(&pack_tile_4bpp(&indices)),
                BitDepth::Eight => out.extend_from_slice(&indices),
            }
        }
    }
}

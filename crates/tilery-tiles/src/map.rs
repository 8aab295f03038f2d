//! Background maps
//!
//! A [`TileMap`] references a tileset cell by cell. Text maps use 16-bit
//! cells carrying tile id, flip bits and bank; affine maps use 8-bit cells
//! carrying a tile id only, which also means they cannot express mirrored
//! tiles and are limited to 256 tiles.

use crate::error::{TileError, TileResult};
use crate::tile::{Flip, TILE_SIDE};
use crate::tileset::{AFFINE_TILE_LIMIT, TileGrid, TileRef};

/// Valid text map sizes in pixels.
pub const TEXT_SIZES: [(u32, u32); 4] = [(256, 256), (512, 256), (256, 512), (512, 512)];
/// Valid affine map sizes in pixels.
pub const AFFINE_SIZES: [(u32, u32); 4] = [(128, 128), (256, 256), (512, 512), (1024, 1024)];
/// Cells per screen block edge; text maps serialize block by block.
pub const SCREEN_BLOCK_CELLS: u32 = 32;

/// Background addressing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapKind {
    /// Regular background: u16 cells, screen-block layout.
    Text,
    /// Rotation/scaling background: u8 cells, linear layout.
    Affine,
}

/// Pack one cell of a text map: tile id in bits 0-9, horizontal and
/// vertical flip in bits 10-11, bank in bits 12-15.
pub fn text_cell(cell: TileRef) -> u16 {
    (cell.id & 0x3FF)
        | (u16::from(cell.flip.horizontal) << 10)
        | (u16::from(cell.flip.vertical) << 11)
        | ((u16::from(cell.bank) & 0xF) << 12)
}

/// A built background map.
#[derive(Debug, Clone)]
pub struct TileMap {
    kind: MapKind,
    width: u32,
    height: u32,
    cells: Vec<u16>,
}

impl TileMap {
    /// Addressing mode.
    #[inline]
    pub fn kind(&self) -> MapKind {
        self.kind
    }

    /// Width in cells.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in cells.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Cells in row-major order. Affine cells only use the low 8 bits.
    #[inline]
    pub fn cells(&self) -> &[u16] {
        &self.cells
    }

    /// Cell at `(x, y)`.
    #[inline]
    pub fn cell(&self, x: u32, y: u32) -> Option<u16> {
        if x < self.width && y < self.height {
            Some(self.cells[(y * self.width + x) as usize])
        } else {
            None
        }
    }
}

/// Assemble a map from a match grid.
///
/// # Errors
///
/// [`TileError::BadMapSize`] when the grid is not a hardware-valid size
/// for `kind`; for affine maps, [`TileError::AffineFlip`] when a cell
/// needs a mirrored tile and [`TileError::TileOverflow`] when a cell
/// references a tile past id 255.
pub fn build_map(kind: MapKind, grid: &TileGrid, name: &str) -> TileResult<TileMap> {
    let pixels = (grid.width() * TILE_SIDE, grid.height() * TILE_SIDE);
    let valid = match kind {
        MapKind::Text => &TEXT_SIZES,
        MapKind::Affine => &AFFINE_SIZES,
    };
    if !valid.contains(&pixels) {
        return Err(TileError::BadMapSize {
            name: name.to_string(),
            width: pixels.0,
            height: pixels.1,
        });
    }

    let mut cells = Vec::with_capacity(grid.cells().len());
    for &cell in grid.cells() {
        match kind {
            MapKind::Text => cells.push(text_cell(cell)),
            MapKind::Affine => {
                if cell.flip != Flip::NONE {
                    return Err(TileError::AffineFlip {
                        name: name.to_string(),
                    });
                }
                if cell.id as usize >= AFFINE_TILE_LIMIT {
                    return Err(TileError::TileOverflow {
                        name: name.to_string(),
                        limit: AFFINE_TILE_LIMIT,
                        got: cell.id as usize + 1,
                    });
                }
                cells.push(cell.id);
            }
        }
    }
    Ok(TileMap {
        kind,
        width: grid.width(),
        height: grid.height(),
        cells,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_of(width: u32, height: u32, cell: TileRef) -> TileGrid {
        TileGrid::new(width, height, vec![cell; (width * height) as usize]).unwrap()
    }

    fn plain(id: u16) -> TileRef {
        TileRef {
            id,
            bank: 0,
            flip: Flip::NONE,
        }
    }

    #[test]
    fn test_text_cell_packs_fields() {
        let cell = TileRef {
            id: 0x155,
            bank: 3,
            flip: Flip {
                horizontal: true,
                vertical: false,
            },
        };
        assert_eq!(text_cell(cell), 0x155 | (1 << 10) | (3 << 12));
        let flipped = TileRef {
            id: 1,
            bank: 15,
            flip: Flip {
                horizontal: false,
                vertical: true,
            },
        };
        assert_eq!(text_cell(flipped), 1 | (1 << 11) | (15 << 12));
    }

    #[test]
    fn test_text_map_accepts_hardware_sizes() {
        let map = build_map(MapKind::Text, &grid_of(64, 32, plain(5)), "bg").unwrap();
        assert_eq!((map.width(), map.height()), (64, 32));
        assert_eq!(map.cell(63, 31), Some(5));
        assert!(matches!(
            build_map(MapKind::Text, &grid_of(16, 16, plain(0)), "bg"),
            Err(TileError::BadMapSize {
                width: 128,
                height: 128,
                ..
            })
        ));
    }

    #[test]
    fn test_affine_map_validates_cells() {
        let map = build_map(MapKind::Affine, &grid_of(16, 16, plain(9)), "bg").unwrap();
        assert_eq!(map.kind(), MapKind::Affine);
        assert_eq!(map.cells()[0], 9);

        assert!(matches!(
            build_map(MapKind::Affine, &grid_of(16, 16, plain(256)), "bg"),
            Err(TileError::TileOverflow {
                limit: AFFINE_TILE_LIMIT,
                got: 257,
                ..
            })
        ));

        let flipped = TileRef {
            id: 1,
            bank: 0,
            flip: Flip {
                horizontal: true,
                vertical: false,
            },
        };
        assert!(matches!(
            build_map(MapKind::Affine, &grid_of(16, 16, flipped), "bg"),
            Err(TileError::AffineFlip { .. })
        ));
    }

    #[test]
    fn test_affine_rejects_text_only_sizes() {
        // 512x256 is a valid text size but not a valid affine size
        assert!(build_map(MapKind::Text, &grid_of(64, 32, plain(0)), "bg").is_ok());
        assert!(matches!(
            build_map(MapKind::Affine, &grid_of(64, 32, plain(0)), "bg"),
            Err(TileError::BadMapSize { .. })
        ));
    }
}

//! Sprite sheets and packing
//!
//! A sheet is a fixed canvas of 16x32 or 32x32 tile units managed as buddy
//! blocks: free space lives in per-size pools seeded with 8x8 blocks, and a
//! missing size is carved out of the smallest free block that contains it.
//! Packing places sprites largest first, so big footprints claim space
//! before fragmentation sets in.

use std::cmp::Reverse;

use log::{info, warn};
use tilery_core::{Warning, WarningKind};

use crate::block::{BLOCK_SIDES, BLOCK_SIZE_COUNT, Block, BlockSize};
use crate::error::{SheetError, SheetResult};
use crate::sprite::{Placement, Sprite};

/// Valid sheet sizes in tile units.
pub const SHEET_SIZES: [(u32, u32); 2] = [(16, 32), (32, 32)];

/// A sheet canvas with its free pools and placed blocks.
#[derive(Debug, Clone)]
pub struct SpriteSheet {
    width: u32,
    height: u32,
    free: [Vec<(u32, u32)>; BLOCK_SIZE_COUNT],
    placed: Vec<Block>,
}

impl SpriteSheet {
    /// Empty sheet with every tile free.
    ///
    /// # Errors
    ///
    /// [`SheetError::BadSheetSize`] for dimensions outside [`SHEET_SIZES`].
    pub fn new(width: u32, height: u32) -> SheetResult<Self> {
        if !SHEET_SIZES.contains(&(width, height)) {
            return Err(SheetError::BadSheetSize { width, height });
        }
        let mut sheet = Self {
            width,
            height,
            free: std::array::from_fn(|_| Vec::new()),
            placed: Vec::new(),
        };
        let seed = BlockSize {
            width: 8,
            height: 8,
        };
        for y in (0..height).step_by(8) {
            for x in (0..width).step_by(8) {
                sheet.free[seed.index()].push((x, y));
            }
        }
        Ok(sheet)
    }

    /// Width in tile units.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in tile units.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total tile capacity.
    #[inline]
    pub fn capacity(&self) -> u32 {
        self.width * self.height
    }

    /// Tiles covered by placed blocks.
    pub fn used_tiles(&self) -> u32 {
        self.placed.iter().map(|b| b.tiles()).sum()
    }

    /// Tiles still sitting in free pools.
    pub fn free_tiles(&self) -> u32 {
        let mut total = 0;
        for &w in &BLOCK_SIDES {
            for &h in &BLOCK_SIDES {
                let size = BlockSize {
                    width: w,
                    height: h,
                };
                total += size.tiles() * self.free[size.index()].len() as u32;
            }
        }
        total
    }

    /// Placed blocks in allocation order.
    #[inline]
    pub fn placed(&self) -> &[Block] {
        &self.placed
    }

    /// Allocate one block of exactly `size`.
    ///
    /// An exact-size free block is used when available, topmost-leftmost
    /// first; otherwise the smallest free block that contains the size is
    /// split down to it, pooling the off-cut halves. `None` when no free
    /// block chain can produce the size.
    pub fn allocate(&mut self, size: BlockSize) -> Option<Block> {
        if let Some((x, y)) = self.take_free(size) {
            let block = Block { x, y, size };
            self.placed.push(block);
            return Some(block);
        }
        for parent in size.parents() {
            let Some((x, y)) = self.take_free(parent) else {
                continue;
            };
            let mut block = Block {
                x,
                y,
                size: parent,
            };
            while let Some((kept, buddy)) = block.split_toward(size) {
                self.free[buddy.size.index()].push((buddy.x, buddy.y));
                block = kept;
            }
            self.placed.push(block);
            return Some(block);
        }
        None
    }

    fn take_free(&mut self, size: BlockSize) -> Option<(u32, u32)> {
        let pool = &mut self.free[size.index()];
        let best = pool
            .iter()
            .enumerate()
            .min_by_key(|&(_, &(x, y))| (y, x))?
            .0;
        Some(pool.remove(best))
    }
}

/// Place every sprite in the sheet, largest first.
///
/// Sort order: frame area descending, ties by width + height descending so
/// elongated shapes go before squares of the same area, remaining ties in
/// input order. Placements land on the sprites themselves.
///
/// # Errors
///
/// [`SheetError::SheetFull`] on the first sprite that does not fit, unless
/// `force`, which records a warning and leaves that sprite unplaced.
pub fn pack_sprites(
    sheet: &mut SpriteSheet,
    sprites: &mut [Sprite],
    force: bool,
) -> SheetResult<Vec<Warning>> {
    let mut order: Vec<usize> = (0..sprites.len()).collect();
    order.sort_by_key(|&i| {
        let shape = sprites[i].shape();
        (
            Reverse(shape.tiles()),
            Reverse(shape.width() + shape.height()),
        )
    });

    let mut warnings = Vec::new();
    for i in order {
        let shape = sprites[i].shape();
        match sheet.allocate(shape.block_size()) {
            Some(block) => sprites[i].set_placement(Placement::Sheet(block)),
            None => {
                if !force {
                    return Err(SheetError::SheetFull {
                        name: sprites[i].name().to_string(),
                        width: shape.width(),
                        height: shape.height(),
                    });
                }
                let warning = Warning::for_image(
                    sprites[i].name(),
                    WarningKind::SpriteUnplaced {
                        width: shape.width(),
                        height: shape.height(),
                    },
                );
                warn!("{warning}");
                warnings.push(warning);
            }
        }
    }
    info!(
        "sheet: {}/{} tiles used by {} blocks",
        sheet.used_tiles(),
        sheet.capacity(),
        sheet.placed().len()
    );
    Ok(warnings)
}

/// Sequential tile space for 1D sprite mapping.
#[derive(Debug, Clone)]
pub struct LinearLayout {
    capacity: u32,
    cursor: u32,
}

impl LinearLayout {
    /// Empty layout over `capacity` tile slots.
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            cursor: 0,
        }
    }

    /// Total tile capacity.
    #[inline]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Tiles handed out so far.
    #[inline]
    pub fn used(&self) -> u32 {
        self.cursor
    }

    /// Claim the next `tiles` consecutive slots, returning the first.
    pub fn allocate(&mut self, tiles: u32) -> Option<u32> {
        if self.cursor + tiles > self.capacity {
            return None;
        }
        let start = self.cursor;
        self.cursor += tiles;
        Some(start)
    }
}

/// Lay sprites out as a flat 1D tile array, in input order.
///
/// Each sprite claims `frames * tiles_per_frame` consecutive slots; there
/// is no sorting and no fitting, only the capacity check.
///
/// # Errors
///
/// [`SheetError::LinearFull`] on the first sprite past the capacity, unless
/// `force`, which records a warning and leaves that sprite unplaced.
pub fn pack_linear(
    layout: &mut LinearLayout,
    sprites: &mut [Sprite],
    force: bool,
) -> SheetResult<Vec<Warning>> {
    let mut warnings = Vec::new();
    for sprite in sprites.iter_mut() {
        match layout.allocate(sprite.total_tiles()) {
            Some(start) => sprite.set_placement(Placement::Linear(start)),
            None => {
                if !force {
                    return Err(SheetError::LinearFull {
                        name: sprite.name().to_string(),
                        limit: layout.capacity(),
                        got: layout.used() + sprite.total_tiles(),
                    });
                }
                let shape = sprite.shape();
                let warning = Warning::for_image(
                    sprite.name(),
                    WarningKind::SpriteUnplaced {
                        width: shape.width(),
                        height: shape.height(),
                    },
                );
                warn!("{warning}");
                warnings.push(warning);
            }
        }
    }
    info!(
        "linear: {}/{} tiles used by {} sprites",
        layout.used(),
        layout.capacity(),
        sprites.len()
    );
    Ok(warnings)
}

//! Hardware sprite shapes
//!
//! OBJ entries address their size as a (shape, size) pair: square, wide or
//! tall, each in four steps. Of the sixteen width/height combinations over
//! {1, 2, 4, 8} tiles, twelve are real hardware shapes; the four extreme
//! 8:1 aspect ratios do not exist.

use crate::block::{Block, BlockSize};
use crate::error::{SheetError, SheetResult};

/// OBJ attribute shape field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjShape {
    Square = 0,
    Horizontal = 1,
    Vertical = 2,
}

/// A valid sprite footprint in tile units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteShape {
    width: u32,
    height: u32,
}

impl SpriteShape {
    /// Validate tile-unit dimensions against the hardware shape table.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        let valid = matches!(
            (width, height),
            (1, 1)
                | (2, 2)
                | (4, 4)
                | (8, 8)
                | (2, 1)
                | (4, 1)
                | (4, 2)
                | (8, 4)
                | (1, 2)
                | (1, 4)
                | (2, 4)
                | (4, 8)
        );
        valid.then_some(Self { width, height })
    }

    /// Width in tile units.
    #[inline]
    pub fn width(self) -> u32 {
        self.width
    }

    /// Height in tile units.
    #[inline]
    pub fn height(self) -> u32 {
        self.height
    }

    /// Tiles per frame.
    #[inline]
    pub fn tiles(self) -> u32 {
        self.width * self.height
    }

    /// OBJ attribute shape field.
    pub fn obj_shape(self) -> ObjShape {
        if self.width == self.height {
            ObjShape::Square
        } else if self.width > self.height {
            ObjShape::Horizontal
        } else {
            ObjShape::Vertical
        }
    }

    /// OBJ attribute size field, 0-3 within the shape's family.
    pub fn obj_size(self) -> u8 {
        match (self.width, self.height) {
            (1, 1) | (2, 1) | (1, 2) => 0,
            (2, 2) | (4, 1) | (1, 4) => 1,
            (4, 4) | (4, 2) | (2, 4) => 2,
            _ => 3,
        }
    }

    /// The sheet block footprint of one frame. Every valid sprite shape is
    /// also a valid block size.
    pub fn block_size(self) -> BlockSize {
        BlockSize {
            width: self.width,
            height: self.height,
        }
    }
}

/// Where a sprite's tiles live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// 2D mapping: one block in a sprite sheet. Frames stream into the
    /// block at runtime, so multi-frame sprites still occupy one block.
    Sheet(Block),
    /// 1D mapping: the first of `frames * tiles_per_frame` consecutive
    /// tile slots.
    Linear(u32),
}

/// One sprite: a named shape with a frame count, its palette bank once
/// assigned, and its placement once packed.
#[derive(Debug, Clone)]
pub struct Sprite {
    name: String,
    shape: SpriteShape,
    frames: u32,
    bank: Option<u8>,
    placement: Option<Placement>,
}

impl Sprite {
    /// Create an unplaced sprite.
    ///
    /// # Errors
    ///
    /// [`SheetError::BadSpriteShape`] for dimensions outside the hardware
    /// table, [`SheetError::NoFrames`] for a zero frame count.
    pub fn new(name: impl Into<String>, width: u32, height: u32, frames: u32) -> SheetResult<Self> {
        let name = name.into();
        let Some(shape) = SpriteShape::new(width, height) else {
            return Err(SheetError::BadSpriteShape {
                name,
                width,
                height,
            });
        };
        if frames == 0 {
            return Err(SheetError::NoFrames { name });
        }
        Ok(Self {
            name,
            shape,
            frames,
            bank: None,
            placement: None,
        })
    }

    /// Sprite name, used in errors, warnings and logs.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The footprint shape.
    #[inline]
    pub fn shape(&self) -> SpriteShape {
        self.shape
    }

    /// Animation frame count, at least 1.
    #[inline]
    pub fn frames(&self) -> u32 {
        self.frames
    }

    /// Tiles per frame.
    #[inline]
    pub fn frame_tiles(&self) -> u32 {
        self.shape.tiles()
    }

    /// Tiles across all frames.
    #[inline]
    pub fn total_tiles(&self) -> u32 {
        self.frames * self.shape.tiles()
    }

    /// Assigned palette bank, if any (4bpp only).
    #[inline]
    pub fn bank(&self) -> Option<u8> {
        self.bank
    }

    /// Record the palette bank this sprite renders with.
    pub fn set_bank(&mut self, bank: u8) {
        self.bank = Some(bank);
    }

    /// Placement, once packed.
    #[inline]
    pub fn placement(&self) -> Option<Placement> {
        self.placement
    }

    pub(crate) fn set_placement(&mut self, placement: Placement) {
        self.placement = Some(placement);
    }
}

//! Sprite sheets for tilery
//!
//! This crate lays hardware sprites out in OBJ tile memory:
//!
//! - **Shapes**: the twelve valid OBJ footprints with their attribute
//!   shape/size encodings
//! - **Blocks**: buddy-allocated rectangles over a 16x32 or 32x32 tile
//!   canvas, split on demand from larger free blocks
//! - **Packing**: largest-first placement of a sprite batch, or a flat 1D
//!   layout for sequential character mapping
//!
//! Pixel data never passes through here: sprites are named footprints, and
//! placements are tile-unit coordinates for the pipeline to blit against.

pub mod block;
pub mod error;
pub mod sheet;
pub mod sprite;

// Types
pub use block::{BLOCK_SIDES, BLOCK_SIZE_COUNT, Block, BlockSize};
pub use error::{SheetError, SheetResult};
pub use sheet::{LinearLayout, SHEET_SIZES, SpriteSheet};
pub use sprite::{ObjShape, Placement, Sprite, SpriteShape};

// Functions
pub use sheet::{pack_linear, pack_sprites};

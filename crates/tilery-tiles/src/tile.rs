//! 8x8 tiles
//!
//! [`ImageTile`] is a raw 8x8 pixel cut from a source frame; [`Tile`] is
//! its quantized counterpart holding palette indices. Both support the four
//! hardware mirror orientations, which drive mirror-aware deduplication and
//! the flip bits in map cells.

use tilery_core::{Color, Error, Raster, Result};

/// Tile edge length in pixels.
pub const TILE_SIDE: u32 = 8;
/// Pixels per tile.
pub const TILE_PIXELS: usize = (TILE_SIDE * TILE_SIDE) as usize;

/// One of the four mirror orientations a tile can be observed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Flip {
    pub horizontal: bool,
    pub vertical: bool,
}

impl Flip {
    /// No mirroring.
    pub const NONE: Flip = Flip {
        horizontal: false,
        vertical: false,
    };

    /// All four orientations, identity first. Lookup tables are filled in
    /// this order, so an ambiguous match (a symmetric tile) always resolves
    /// to the earliest orientation.
    pub const ALL: [Flip; 4] = [
        Flip::NONE,
        Flip {
            horizontal: true,
            vertical: false,
        },
        Flip {
            horizontal: false,
            vertical: true,
        },
        Flip {
            horizontal: true,
            vertical: true,
        },
    ];

    /// The orientation of applying `self` after `other`. Mirror flips are
    /// involutions, so composition is per-axis exclusive or.
    #[inline]
    pub fn compose(self, other: Flip) -> Flip {
        Flip {
            horizontal: self.horizontal ^ other.horizontal,
            vertical: self.vertical ^ other.vertical,
        }
    }
}

/// Buffer offset of `(x, y)` seen through a mirror orientation.
#[inline]
fn flipped_offset(x: u32, y: u32, flip: Flip) -> usize {
    let fx = if flip.horizontal { TILE_SIDE - 1 - x } else { x };
    let fy = if flip.vertical { TILE_SIDE - 1 - y } else { y };
    (fy * TILE_SIDE + fx) as usize
}

/// Raw 8x8 pixel tile cut from a source frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageTile {
    pixels: [Color; TILE_PIXELS],
}

impl ImageTile {
    /// Cut the 8x8 tile whose top-left corner is at pixel `(x0, y0)`.
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfBounds`] when the tile does not fit the frame.
    pub fn from_raster(raster: &Raster, x0: u32, y0: u32) -> Result<Self> {
        let mut pixels = [Color::with_alpha(0, 0, 0, 0); TILE_PIXELS];
        for y in 0..TILE_SIDE {
            for x in 0..TILE_SIDE {
                pixels[(y * TILE_SIDE + x) as usize] =
                    raster.get(x0 + x, y0 + y).ok_or(Error::IndexOutOfBounds {
                        index: ((y0 + y) * raster.width() + x0 + x) as usize,
                        len: raster.pixels().len(),
                    })?;
            }
        }
        Ok(Self { pixels })
    }

    /// Pixel at tile-local `(x, y)`.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * TILE_SIDE + x) as usize]
    }

    /// All pixels in row-major order.
    #[inline]
    pub fn pixels(&self) -> &[Color; TILE_PIXELS] {
        &self.pixels
    }

    /// The tile seen through a mirror orientation.
    pub fn flipped(&self, flip: Flip) -> Self {
        let mut pixels = [Color::with_alpha(0, 0, 0, 0); TILE_PIXELS];
        for y in 0..TILE_SIDE {
            for x in 0..TILE_SIDE {
                pixels[(y * TILE_SIDE + x) as usize] = self.pixels[flipped_offset(x, y, flip)];
            }
        }
        Self { pixels }
    }

    /// Symmetry-aware equality: the first orientation of `self` that matches
    /// `other` exactly, or `None`.
    pub fn mirror_match(&self, other: &Self) -> Option<Flip> {
        Flip::ALL
            .into_iter()
            .find(|&flip| self.flipped(flip).pixels == other.pixels)
    }
}

/// Quantized 8x8 tile: palette indices plus the bank it was matched into.
#[derive(Debug, Clone)]
pub struct Tile {
    indices: [u8; TILE_PIXELS],
    bank: Option<u8>,
}

impl Tile {
    /// Tile over an explicit index buffer, bank unassigned.
    pub fn new(indices: [u8; TILE_PIXELS]) -> Self {
        Self {
            indices,
            bank: None,
        }
    }

    /// The synthetic all-zero tile reserved as id 0.
    pub fn null() -> Self {
        Self::new([0; TILE_PIXELS])
    }

    /// Index at tile-local `(x, y)`.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.indices[(y * TILE_SIDE + x) as usize]
    }

    /// All indices in row-major order. Dedup identity is equality of this
    /// buffer.
    #[inline]
    pub fn indices(&self) -> &[u8; TILE_PIXELS] {
        &self.indices
    }

    /// Assigned palette bank, if any.
    #[inline]
    pub fn bank(&self) -> Option<u8> {
        self.bank
    }

    /// Record the bank this tile was matched into.
    pub fn set_bank(&mut self, bank: u8) {
        self.bank = Some(bank);
    }

    /// Rewrite every index through `slots`, mapping local palette order to
    /// bank slot order. Must run before the tile enters a dedup set: two
    /// tiles are the same hardware tile only after normalization.
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfBounds`] if an index has no slot mapping.
    pub fn use_palette(&mut self, slots: &[u8]) -> Result<()> {
        for index in &mut self.indices {
            *index = *slots
                .get(*index as usize)
                .ok_or(Error::IndexOutOfBounds {
                    index: *index as usize,
                    len: slots.len(),
                })?;
        }
        Ok(())
    }

    /// The tile seen through a mirror orientation.
    pub fn flipped(&self, flip: Flip) -> Self {
        let mut indices = [0u8; TILE_PIXELS];
        for y in 0..TILE_SIDE {
            for x in 0..TILE_SIDE {
                indices[(y * TILE_SIDE + x) as usize] = self.indices[flipped_offset(x, y, flip)];
            }
        }
        Self {
            indices,
            bank: self.bank,
        }
    }
}

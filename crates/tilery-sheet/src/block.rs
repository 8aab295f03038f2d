//! Buddy blocks
//!
//! Sheet space is managed in rectangular blocks whose tile-unit sides come
//! from the fixed set {1, 2, 4, 8}. A missing size is carved out of the
//! smallest free block that contains it, halving one dimension at a time;
//! the off-cut halves go back to the free pools.

/// Valid block side lengths in tile units.
pub const BLOCK_SIDES: [u32; 4] = [1, 2, 4, 8];

/// Number of distinct block sizes.
pub const BLOCK_SIZE_COUNT: usize = BLOCK_SIDES.len() * BLOCK_SIDES.len();

/// One of the sixteen valid block sizes, in tile units.
///
/// Crate code only builds sizes whose sides are in [`BLOCK_SIDES`]: halving
/// a valid side stays valid, and the sprite shape table is a subset of the
/// size table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockSize {
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl BlockSize {
    /// Validate tile-unit dimensions against the fixed side set.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        if BLOCK_SIDES.contains(&width) && BLOCK_SIDES.contains(&height) {
            Some(Self { width, height })
        } else {
            None
        }
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

    /// Tile count.
    #[inline]
    pub fn tiles(self) -> u32 {
        self.width * self.height
    }

    /// Dense index for per-size pools, unique in `0..BLOCK_SIZE_COUNT`.
    #[inline]
    pub(crate) fn index(self) -> usize {
        (self.width.trailing_zeros() * 4 + self.height.trailing_zeros()) as usize
    }

    /// True when a block of this size can be cut down to `target`.
    #[inline]
    pub fn contains(self, target: BlockSize) -> bool {
        self.width >= target.width && self.height >= target.height
    }

    /// Sizes a block of this size can be carved from, in the order the
    /// allocator tries them: smallest area first, then most square, then
    /// narrowest.
    pub fn parents(self) -> Vec<BlockSize> {
        let mut sizes: Vec<BlockSize> = BLOCK_SIDES
            .iter()
            .flat_map(|&w| BLOCK_SIDES.iter().map(move |&h| BlockSize { width: w, height: h }))
            .filter(|&s| s != self && s.contains(self))
            .collect();
        sizes.sort_by_key(|s| (s.tiles(), s.width + s.height, s.width));
        sizes
    }
}

/// A placed or free block: a size at a tile-unit position in a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub x: u32,
    pub y: u32,
    pub size: BlockSize,
}

impl Block {
    /// Tile count.
    #[inline]
    pub fn tiles(self) -> u32 {
        self.size.tiles()
    }

    /// True when the two blocks share at least one tile.
    pub fn overlaps(self, other: Block) -> bool {
        self.x < other.x + other.size.width
            && other.x < self.x + self.size.width
            && self.y < other.y + other.size.height
            && other.y < self.y + self.size.height
    }

    /// One subdivision step toward `target`: the width is halved while it
    /// exceeds the target's, then the height. Returns the half keeping this
    /// block's origin plus the buddy, or `None` at the target size.
    pub(crate) fn split_toward(self, target: BlockSize) -> Option<(Block, Block)> {
        if self.size == target {
            return None;
        }
        if self.size.width > target.width {
            let half = BlockSize {
                width: self.size.width / 2,
                height: self.size.height,
            };
            Some((
                Block { size: half, ..self },
                Block {
                    x: self.x + half.width,
                    size: half,
                    ..self
                },
            ))
        } else {
            let half = BlockSize {
                width: self.size.width,
                height: self.size.height / 2,
            };
            Some((
                Block { size: half, ..self },
                Block {
                    y: self.y + half.height,
                    size: half,
                    ..self
                },
            ))
        }
    }
}

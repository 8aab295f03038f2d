//! Integer handles for pipeline-owned resources
//!
//! Palettes, tilesets and sprite sheets are each owned once by the pipeline
//! output and referenced by index everywhere else. The newtypes below keep
//! those indices from being mixed up; they carry no lifetime and no
//! ownership.

use std::fmt;

/// Index of a palette in the pipeline's palette table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PaletteHandle(u32);

/// Index of a tileset in the pipeline's tileset table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TilesetHandle(u32);

/// Index of a sprite sheet in the pipeline's sheet table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SheetHandle(u32);

macro_rules! handle_impls {
    ($name:ident, $label:literal) => {
        impl $name {
            /// Wrap a table index.
            #[inline]
            pub const fn new(index: u32) -> Self {
                Self(index)
            }

            /// The table index this handle points at.
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, " #{}"), self.0)
            }
        }
    };
}

handle_impls!(PaletteHandle, "palette");
handle_impls!(TilesetHandle, "tileset");
handle_impls!(SheetHandle, "sheet");

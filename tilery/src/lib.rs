//! Tilery - tile and sprite asset compiler for GBA-class hardware
//!
//! Tilery turns RGBA images into the binary data a tiled 2D console
//! consumes: palettes, deduplicated tilesets, background maps and packed
//! sprite sheets.
//!
//! # Overview
//!
//! A compilation run is driven by a [`Pipeline`] built from one immutable
//! [`CompileConfig`]:
//!
//! - Color quantization (weighted median cut, optional error diffusion)
//! - Shared 256-color palettes at 8bpp, sixteen 16-color banks at 4bpp
//! - Tile extraction with mirror-aware deduplication
//! - Text and affine background maps
//! - Sprite sheets with block packing, or flat 1D layouts
//! - Little-endian serialization through [`Artifact::to_bytes`]
//!
//! # Example
//!
//! ```
//! use tilery::{Color, CompileConfig, MapKind, Pipeline, Raster};
//!
//! // A single-color 256x256 backdrop compiles to a two-color palette
//! // (transparent key plus content) and one unique tile.
//! let pixels = vec![Color::new(40, 90, 160); 256 * 256];
//! let frame = Raster::from_pixels(256, 256, pixels).unwrap();
//!
//! let mut pipeline = Pipeline::new(CompileConfig::default()).unwrap();
//! let output = pipeline
//!     .compile_map("backdrop", MapKind::Text, &[frame])
//!     .unwrap();
//!
//! assert_eq!(output.maps.len(), 1);
//! assert_eq!(pipeline.palette(output.palette).unwrap().len(), 2);
//! // The null tile plus the one content tile
//! assert_eq!(pipeline.tileset(output.tileset).unwrap().len(), 2);
//! ```

pub mod artifact;
pub mod config;
pub mod error;
pub mod pipeline;

// Re-export core types (primary data structures used everywhere)
pub use tilery_core::*;

// Re-export domain crates as modules to avoid name conflicts
pub use tilery_quant as quant;
pub use tilery_sheet as sheet;
pub use tilery_tiles as tiles;

// Types
pub use artifact::{Artifact, SheetData, SpriteData};
pub use config::{BitDepth, CompileConfig, ObjectMapping};
pub use error::{CompileError, CompileResult, ErrorClass};
pub use pipeline::{MapOutput, Pipeline, SheetOutput, SpriteRequest};

// Conveniences pulled up from the domain crates
pub use tilery_sheet::Sprite;
pub use tilery_tiles::{MapKind, TileMap, Tileset};

// Functions
pub use artifact::placement_record;

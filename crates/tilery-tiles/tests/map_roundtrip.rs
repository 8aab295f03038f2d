//! Map construction round trips
//!
//! A map plus its tileset must reproduce the quantized frame exactly,
//! including mirrored matches; affine maps encode linearly without flips.

use tilery_core::{Color, Color16, Palette, SearchCache};
use tilery_quant::{Histogram, QuantizeOptions, RemapOptions, build_palette, remap_raster};
use tilery_tiles::{
    AFFINE_TILE_LIMIT, MapKind, TilesetOptions, build_4bpp, build_8bpp, build_map, map_bytes,
};

const KEY: Color = Color::new(255, 0, 255);

/// Quantize a frame against its own exact palette, dithering off.
fn index_frame(frame: &tilery_core::Raster) -> (tilery_core::IndexRaster, Palette) {
    let mut histogram = Histogram::new();
    histogram.add_raster_keyed(frame, KEY);
    let build = build_palette(&histogram, KEY, 0, &QuantizeOptions::default()).unwrap();
    let palette =
        Palette::from_colors(build.colors.iter().map(|&c| Color16::from_color(c)), 0).unwrap();
    let mut cache = SearchCache::new();
    let indexed = remap_raster(
        frame,
        &palette,
        &mut cache,
        &RemapOptions {
            transparent: Some(KEY),
            transparent_index: 0,
            dither: None,
        },
    )
    .unwrap();
    (indexed, palette)
}

// ========================================================================
// Test: text map round trip with mirrored tiles
// ========================================================================

#[test]
fn text_map_round_trips_with_mirrors() {
    let solids = [
        Color::new(16, 16, 16),
        Color::new(64, 64, 64),
        Color::new(128, 128, 128),
        Color::new(240, 240, 240),
    ];
    let mut frame = tilery_test::tiled(256, 256, |tx, ty| solids[((tx + ty) % 4) as usize]);
    // An asymmetric tile and its horizontal mirror in the top row
    let pattern = tilery_test::from_fn(8, 8, |x, y| Color::new((x * 30) as u8, (y * 30) as u8, 0));
    let mirrored = tilery_test::mirrored_tile(&pattern, 0, 0, true, false);
    tilery_test::paste_tile(&mut frame, 0, 0, &pattern);
    tilery_test::paste_tile(&mut frame, 1, 0, &mirrored);

    let (indexed, palette) = index_frame(&frame);
    let build = build_8bpp(
        &[indexed.clone()],
        palette,
        &TilesetOptions {
            name: "bg".to_string(),
            ..TilesetOptions::default()
        },
    )
    .unwrap();
    assert!(build.warnings.is_empty());

    // The mirror pair shares one tile with opposite horizontal flips.
    let grid = &build.grids[0];
    let a = grid.cell(0, 0).unwrap();
    let b = grid.cell(1, 0).unwrap();
    assert_eq!(a.id, b.id);
    assert!(a.flip.horizontal != b.flip.horizontal);
    assert_eq!(a.flip.vertical, b.flip.vertical);

    // Pixel-exact reconstruction from (tileset, grid).
    let rebuilt = build.tileset.render_grid(grid).unwrap();
    assert_eq!(rebuilt, indexed);

    // The map serializes one screen block: 32x32 u16 cells.
    let map = build_map(MapKind::Text, grid, "bg").unwrap();
    let bytes = map_bytes(&map);
    assert_eq!(bytes.len(), 32 * 32 * 2);
    let first = u16::from_le_bytes([bytes[0], bytes[1]]);
    let second = u16::from_le_bytes([bytes[2], bytes[3]]);
    assert_eq!(first & 0x3FF, a.id);
    assert_eq!(second & 0x3FF, a.id);
    assert_ne!(first & (3 << 10), second & (3 << 10));
}

// ========================================================================
// Test: 4bpp bank assignments surface in the map's high nibble
// ========================================================================

#[test]
fn text_map_carries_palette_banks() {
    // Two 15-color tiles with identical index layouts but disjoint color
    // sets: they land in different banks yet deduplicate to one tile.
    let tile_pixel = |set: u8, i: u32| {
        let n = i.min(14) as u8;
        Color::new(n * 16, set * 100, 64)
    };
    let frame = tilery_test::from_fn(256, 256, |x, y| {
        let set = u8::from(x >= 128);
        tile_pixel(set, (y % 8) * 8 + (x % 8))
    });

    let build = build_4bpp(
        &[frame],
        KEY,
        &TilesetOptions {
            name: "banked".to_string(),
            ..TilesetOptions::default()
        },
    )
    .unwrap();
    assert!(build.warnings.is_empty());
    assert_eq!(build.tileset.len(), 2);

    let grid = &build.grids[0];
    let left = grid.cell(0, 0).unwrap();
    let right = grid.cell(16, 0).unwrap();
    assert_eq!(left.id, right.id);
    assert_eq!(left.bank, 0);
    assert_eq!(right.bank, 1);

    let map = build_map(MapKind::Text, grid, "banked").unwrap();
    assert_eq!(map.cell(0, 0).unwrap() >> 12, 0);
    assert_eq!(map.cell(16, 0).unwrap() >> 12, 1);
    assert_eq!(map.cell(0, 0).unwrap() & 0x3FF, map.cell(16, 0).unwrap() & 0x3FF);
}

// ========================================================================
// Test: affine maps build without flips and serialize linearly
// ========================================================================

#[test]
fn affine_map_serializes_tile_ids() {
    let solids = [
        Color::new(32, 0, 0),
        Color::new(0, 32, 0),
        Color::new(0, 0, 32),
    ];
    let frame = tilery_test::tiled(128, 128, |tx, ty| solids[((tx * 3 + ty) % 3) as usize]);
    let (indexed, palette) = index_frame(&frame);
    let build = build_8bpp(
        &[indexed.clone()],
        palette,
        &TilesetOptions {
            name: "floor".to_string(),
            mirror: false,
            tile_limit: AFFINE_TILE_LIMIT,
            ..TilesetOptions::default()
        },
    )
    .unwrap();

    let map = build_map(MapKind::Affine, &build.grids[0], "floor").unwrap();
    let bytes = map_bytes(&map);
    assert_eq!(bytes.len(), 16 * 16);
    // Every cell id stays under the affine ceiling and references a tile.
    for &byte in &bytes {
        assert!((byte as usize) < build.tileset.len());
    }
    let rebuilt = build.tileset.render_grid(&build.grids[0]).unwrap();
    assert_eq!(rebuilt, indexed);
}

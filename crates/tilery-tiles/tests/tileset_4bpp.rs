//! 4bpp tileset builds across many banks
//!
//! Exercises the staged pipeline end to end: per-tile quantization, the
//! combined color budget, bank allocation order, lossy degradation and
//! normalized-tile dedup.

use tilery_core::{BANK_SIZE, Color, WarningKind};
use tilery_tiles::{TileError, TilesetOptions, build_4bpp};

const KEY: Color = Color::new(255, 0, 255);

/// Distinct hardware colors indexed by `n`; none collide with `KEY`.
fn palette_color(n: usize) -> Color {
    Color::new(
        ((n % 16) * 16) as u8,
        (((n / 16) % 16) * 16) as u8,
        (96 + (n / 256) * 8) as u8,
    )
}

/// A frame of `tiles` side-by-side 8x8 tiles, where tile `t` uses the 15
/// distinct colors `t*15 .. t*15+15`.
fn many_palette_frame(tiles: usize) -> tilery_core::Raster {
    tilery_test::from_fn((tiles * 8) as u32, 8, |x, y| {
        let tile = (x / 8) as usize;
        let i = (y * 8 + x % 8) as usize;
        palette_color(tile * 15 + i.min(14))
    })
}

fn options() -> TilesetOptions {
    TilesetOptions {
        name: "sheet".to_string(),
        ..TilesetOptions::default()
    }
}

// ========================================================================
// Test: bank allocation fills the sixteen banks in id order
// ========================================================================

#[test]
fn sixteen_full_tiles_claim_sixteen_banks() {
    let frame = many_palette_frame(16);
    let build = build_4bpp(&[frame], KEY, &options()).unwrap();

    assert!(build.warnings.is_empty());
    let grid = &build.grids[0];
    for t in 0..16u32 {
        assert_eq!(grid.cell(t, 0).unwrap().bank, t as u8, "tile {t}");
    }
    // Every tile shares one index pattern; the bank difference lives in
    // the cells, not in the tile store.
    assert_eq!(build.tileset.len(), 2);

    let banks = build.tileset.banks().unwrap();
    for bank in banks.banks() {
        assert_eq!(bank.len(), BANK_SIZE);
        // Transparent seeds slot 0 everywhere
        assert_eq!(bank.colors()[0], tilery_core::Color16::from_color(KEY));
    }
}

// ========================================================================
// Test: a seventeenth full tile degrades lossily, with a warning
// ========================================================================

#[test]
fn overflowing_banks_degrade_with_warning() {
    let frame = many_palette_frame(17);
    let build = build_4bpp(&[frame], KEY, &options()).unwrap();

    assert_eq!(build.warnings.len(), 1);
    match &build.warnings[0].kind {
        WarningKind::LossyBankMerge { dropped, error, .. } => {
            assert_eq!(*dropped, 15);
            assert!(*error > 0.0);
        }
        other => panic!("expected a lossy merge warning, got {other:?}"),
    }

    // Capacity invariants hold even after the lossy merge.
    let banks = build.tileset.banks().unwrap();
    for bank in banks.banks() {
        assert!(bank.len() <= BANK_SIZE);
    }
    for tile in build.tileset.tiles() {
        assert!(tile.indices().iter().all(|&i| (i as usize) < BANK_SIZE));
    }
}

// ========================================================================
// Test: the combined color budget fails fast, force degrades it
// ========================================================================

#[test]
fn combined_color_budget_checked_before_allocation() {
    let frame = many_palette_frame(18);
    let err = build_4bpp(&[frame.clone()], KEY, &options()).unwrap_err();
    match err {
        TileError::CombinedColors { limit, got, name } => {
            assert_eq!(limit, 256);
            assert_eq!(got, 271);
            assert_eq!(name, "sheet");
        }
        other => panic!("expected the color budget to fail, got {other:?}"),
    }

    let mut forced = options();
    forced.force = true;
    let build = build_4bpp(&[frame], KEY, &forced).unwrap();
    assert!(
        build
            .warnings
            .iter()
            .any(|w| matches!(w.kind, WarningKind::CombinedColors { got: 271, .. }))
    );
    // Tiles 17 and 18 both merge lossily after the banks fill up.
    let lossy = build
        .warnings
        .iter()
        .filter(|w| matches!(w.kind, WarningKind::LossyBankMerge { .. }))
        .count();
    assert_eq!(lossy, 2);
}

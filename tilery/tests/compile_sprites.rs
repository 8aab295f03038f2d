//! End-to-end sprite compilation: shared and banked palettes, 2D sheet
//! packing, 1D layouts, and the capacity and shape failure modes.

use tilery::sheet::Placement;
use tilery::{
    BitDepth, Color, Color16, CompileConfig, ErrorClass, ObjectMapping, Pipeline, SpriteRequest,
    WarningKind,
};
use tilery_test::{from_fn, solid};

fn four_bpp() -> CompileConfig {
    CompileConfig {
        depth: BitDepth::Four,
        ..CompileConfig::default()
    }
}

/// 8x8 frame cycling through `colors` pixel by pixel.
fn cycle_frame(colors: &[Color]) -> tilery::Raster {
    from_fn(8, 8, |x, y| colors[((y * 8 + x) as usize) % colors.len()])
}

// ==== Shared-palette (8bpp) sprites ====

#[test]
fn shared_sprites_share_one_palette_and_a_canvas() {
    let red = Color::new(248, 0, 0);
    let blue = Color::new(0, 0, 248);
    let requests = vec![
        SpriteRequest::new("hero", vec![solid(16, 16, red), solid(16, 16, red)]),
        SpriteRequest::new("dot", vec![solid(8, 8, blue)]),
    ];

    let mut pipeline = Pipeline::new(CompileConfig::default()).unwrap();
    let output = pipeline.compile_sprites(&requests).unwrap();

    let palette = pipeline.palette(output.palette).unwrap();
    assert_eq!(palette.len(), 3); // key, red, blue
    assert!(output.sheet.is_some());

    // Output order follows request order even though packing sorts by size
    assert_eq!(output.sprites[0].sprite.name(), "hero");
    assert_eq!(output.sprites[1].sprite.name(), "dot");
    assert_eq!(output.sprites[0].sprite.frames(), 2);

    // The largest sprite claims the top-left block
    let Some(Placement::Sheet(hero)) = output.sprites[0].sprite.placement() else {
        panic!("hero unplaced");
    };
    assert_eq!((hero.x, hero.y), (0, 0));

    // The canvas shows frame 0 of each placed sprite at its block
    let canvas = output.canvas.as_ref().unwrap();
    assert_eq!(canvas.get(0, 0), Some(1));
    let Some(Placement::Sheet(dot)) = output.sprites[1].sprite.placement() else {
        panic!("dot unplaced");
    };
    assert_eq!(canvas.get(dot.x * 8, dot.y * 8), Some(2));
    assert!(!hero.overlaps(dot));
}

#[test]
fn offset_sprites_hold_absolute_indices() {
    let config = CompileConfig {
        palette_size: 16,
        palette_offset: 240,
        ..CompileConfig::default()
    };
    let requests = vec![SpriteRequest::new(
        "glyph",
        vec![solid(8, 8, Color::new(8, 16, 24))],
    )];

    let mut pipeline = Pipeline::new(config).unwrap();
    let output = pipeline.compile_sprites(&requests).unwrap();

    // One content color at local slot 0, absolute slot 240
    assert_eq!(pipeline.palette(output.palette).unwrap().len(), 1);
    let frame = &output.sprites[0].frames[0];
    assert!(frame.indices().iter().all(|&i| i == 240));
}

// ==== Banked (4bpp) sprites ====

#[test]
fn banked_sprites_fill_banks_and_reuse_containing_ones() {
    let reds: Vec<Color> = (0u8..15).map(|i| Color::new((i + 1) * 16, 0, 0)).collect();
    let greens: Vec<Color> = (0u8..15).map(|i| Color::new(0, (i + 1) * 16, 0)).collect();
    let requests = vec![
        SpriteRequest::new("ember", vec![cycle_frame(&reds)]),
        SpriteRequest::new("leaf", vec![cycle_frame(&greens)]),
        SpriteRequest::new("spark", vec![cycle_frame(&reds[..4])]),
    ];

    let mut pipeline = Pipeline::new(four_bpp()).unwrap();
    let output = pipeline.compile_sprites(&requests).unwrap();

    // Disjoint sets take fresh banks; a subset reuses the bank holding it
    assert_eq!(output.sprites[0].sprite.bank(), Some(0));
    assert_eq!(output.sprites[1].sprite.bank(), Some(1));
    assert_eq!(output.sprites[2].sprite.bank(), Some(0));

    // Local colors keep their first-appearance slots above the key
    let ember = &output.sprites[0].frames[0];
    assert_eq!(ember.get(0, 0), Some(1));
    assert_eq!(ember.get(1, 0), Some(2));
    assert!(ember.indices().iter().all(|&i| i < 16));
    let spark = &output.sprites[2].frames[0];
    assert_eq!(spark.get(0, 0), Some(1));

    // The flattened palette interleaves the banks at 16-slot boundaries
    let palette = pipeline.palette(output.palette).unwrap();
    assert_eq!(palette.len(), 256);
    assert_eq!(palette.get(1), Some(Color16::from_color(reds[0])));
    assert_eq!(palette.get(17), Some(Color16::from_color(greens[0])));
    assert!(pipeline.warnings().is_empty());
}

#[test]
fn seventeenth_color_set_merges_lossily() {
    // Sixteen sprites with fifteen fresh colors each fill every bank
    let color = |k: u32| Color::new(((k % 31 + 1) * 8) as u8, ((k / 31 + 1) * 8) as u8, 0);
    let mut requests = Vec::new();
    for i in 0..17u32 {
        let colors: Vec<Color> = (0..15).map(|j| color(i * 15 + j)).collect();
        requests.push(SpriteRequest::new(format!("s{i}"), vec![cycle_frame(&colors)]));
    }

    let mut pipeline = Pipeline::new(four_bpp()).unwrap();
    let output = pipeline.compile_sprites(&requests).unwrap();

    for (i, data) in output.sprites.iter().take(16).enumerate() {
        assert_eq!(data.sprite.bank(), Some(i as u8));
    }
    // The overflow sprite still compiles, approximated into some bank
    let last = &output.sprites[16];
    assert!(last.sprite.bank().is_some());
    assert!(last.frames[0].indices().iter().all(|&i| i < 16));
    assert!(last.sprite.placement().is_some());

    let warnings = pipeline.take_warnings();
    assert!(warnings
        .iter()
        .any(|w| matches!(w.kind, WarningKind::LossyBankMerge { dropped, .. } if dropped > 0)));
}

// ==== 1D mapping ====

#[test]
fn linear_mapping_places_frames_back_to_back() {
    let config = CompileConfig {
        mapping: ObjectMapping::OneDimensional,
        ..CompileConfig::default()
    };
    let requests = vec![
        SpriteRequest::new(
            "walk",
            vec![
                solid(16, 16, Color::new(200, 100, 50)),
                solid(16, 16, Color::new(100, 200, 50)),
                solid(16, 16, Color::new(50, 100, 200)),
            ],
        ),
        SpriteRequest::new("blip", vec![solid(8, 8, Color::new(0, 248, 248)); 2]),
    ];

    let mut pipeline = Pipeline::new(config).unwrap();
    let output = pipeline.compile_sprites(&requests).unwrap();

    assert!(output.sheet.is_none());
    assert!(output.canvas.is_none());
    // Input order, each sprite reserving frames x tiles_per_frame slots
    assert_eq!(
        output.sprites[0].sprite.placement(),
        Some(Placement::Linear(0))
    );
    assert_eq!(
        output.sprites[1].sprite.placement(),
        Some(Placement::Linear(12))
    );
}

// ==== Capacity and shape failures ====

#[test]
fn sheet_overflow_is_fatal_unless_forced() {
    // Nine 8x8-tile sprites over a 16x32-tile sheet that fits eight
    let big = |i: u8| {
        SpriteRequest::new(
            format!("boss{i}"),
            vec![solid(64, 64, Color::new(8 * (i + 1), 0, 0))],
        )
    };
    let requests: Vec<SpriteRequest> = (0..9).map(big).collect();

    let mut strict = Pipeline::new(CompileConfig::default()).unwrap();
    let err = strict.compile_sprites(&requests).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Capacity);

    let mut forced = Pipeline::new(CompileConfig {
        force: true,
        ..CompileConfig::default()
    })
    .unwrap();
    let output = forced.compile_sprites(&requests).unwrap();
    let placed = output
        .sprites
        .iter()
        .filter(|s| s.sprite.placement().is_some())
        .count();
    assert_eq!(placed, 8);
    // Same-size ties keep input order, so the last request is the one out
    assert!(output.sprites[8].sprite.placement().is_none());
    assert!(forced
        .warnings()
        .iter()
        .any(|w| matches!(w.kind, WarningKind::SpriteUnplaced { width: 8, height: 8 })));
}

#[test]
fn sprite_shape_and_frame_checks() {
    let color = Color::new(10, 20, 30);
    let mut pipeline = Pipeline::new(CompileConfig::default()).unwrap();

    // 3x1 tiles is not a hardware sprite shape
    let err = pipeline
        .compile_sprites(&[SpriteRequest::new("wide", vec![solid(24, 8, color)])])
        .unwrap_err();
    assert_eq!(err.class(), ErrorClass::Shape);

    // Frames must divide into whole tiles
    let err = pipeline
        .compile_sprites(&[SpriteRequest::new("ragged", vec![solid(12, 8, color)])])
        .unwrap_err();
    assert_eq!(err.class(), ErrorClass::Shape);

    // Frames must agree on size
    let err = pipeline
        .compile_sprites(&[SpriteRequest::new(
            "mixed",
            vec![solid(16, 16, color), solid(8, 8, color)],
        )])
        .unwrap_err();
    assert_eq!(err.class(), ErrorClass::Shape);

    // No frames and no requests are configuration errors
    let err = pipeline
        .compile_sprites(&[SpriteRequest::new("empty", Vec::new())])
        .unwrap_err();
    assert_eq!(err.class(), ErrorClass::Configuration);
    let err = pipeline.compile_sprites(&[]).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Configuration);
}

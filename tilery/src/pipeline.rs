//! Pipeline driver
//!
//! A [`Pipeline`] owns the arenas compiled resources live in (palettes,
//! tilesets, sheets) and hands out integer handles into them. Two entry
//! points do the work:
//!
//! - [`Pipeline::compile_map`]: background frames in, palette plus tileset
//!   plus one cell map per frame out
//! - [`Pipeline::compile_sprites`]: sprite frame stacks in, palette or
//!   banks plus placed sprites out, on a 2D sheet or a flat 1D layout
//!
//! Warnings from every stage accumulate on the pipeline and drain through
//! [`Pipeline::take_warnings`].

use log::{info, warn};

use tilery_core::{
    BANK_COUNT, BANK_SIZE, BankSet, Color, Color16, IndexRaster, Palette, PaletteHandle, Raster,
    SearchCache, SheetHandle, TilesetHandle, Warning, WarningKind, is_transparent, nearest_slot,
};
use tilery_quant::{Histogram, QuantizeOptions, RemapOptions, build_palette, remap_raster};
use tilery_sheet::{
    LinearLayout, Placement, SheetError, Sprite, SpriteSheet, pack_linear, pack_sprites,
};
use tilery_tiles::{
    AFFINE_TILE_LIMIT, MapKind, TEXT_TILE_LIMIT, TILE_SIDE, TileBuild, TileGrid, TileMap, Tileset,
    TilesetOptions, TilesetPalettes, assign_bank, build_4bpp, build_8bpp, build_map,
};

use crate::artifact::{Artifact, SheetData, SpriteData};
use crate::config::{BitDepth, CompileConfig, ObjectMapping};
use crate::error::{CompileError, CompileResult};

/// A named stack of equal-size RGBA frames to compile as one sprite.
#[derive(Debug, Clone)]
pub struct SpriteRequest {
    pub name: String,
    pub frames: Vec<Raster>,
}

impl SpriteRequest {
    pub fn new(name: impl Into<String>, frames: Vec<Raster>) -> Self {
        Self {
            name: name.into(),
            frames,
        }
    }
}

/// Output of a map compilation.
#[derive(Debug)]
pub struct MapOutput {
    /// The full hardware palette for this run.
    pub palette: PaletteHandle,
    /// The deduplicated tileset.
    pub tileset: TilesetHandle,
    /// One cell map per input frame.
    pub maps: Vec<TileMap>,
    /// One match grid per input frame, kept for reconstruction.
    pub grids: Vec<TileGrid>,
}

/// Output of a sprite compilation.
#[derive(Debug)]
pub struct SheetOutput {
    /// The full hardware palette for this run.
    pub palette: PaletteHandle,
    /// The packed sheet, present under 2D mapping.
    pub sheet: Option<SheetHandle>,
    /// Sheet surface with every placed sprite's first frame blitted in,
    /// present under 2D mapping.
    pub canvas: Option<IndexRaster>,
    /// Compiled sprites in request order.
    pub sprites: Vec<SpriteData>,
}

/// Drives compilation runs and owns their shared resources.
#[derive(Debug)]
pub struct Pipeline {
    config: CompileConfig,
    palettes: Vec<Palette>,
    tilesets: Vec<Tileset>,
    sheets: Vec<SpriteSheet>,
    warnings: Vec<Warning>,
}

impl Pipeline {
    /// Create a pipeline for one validated configuration.
    ///
    /// # Errors
    ///
    /// Configuration errors for settings outside the ranges documented on
    /// [`CompileConfig`].
    pub fn new(config: CompileConfig) -> CompileResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            palettes: Vec::new(),
            tilesets: Vec::new(),
            sheets: Vec::new(),
            warnings: Vec::new(),
        })
    }

    /// The configuration this pipeline runs under.
    #[inline]
    pub fn config(&self) -> &CompileConfig {
        &self.config
    }

    /// Palette behind a handle.
    #[inline]
    pub fn palette(&self, handle: PaletteHandle) -> Option<&Palette> {
        self.palettes.get(handle.index())
    }

    /// Tileset behind a handle.
    #[inline]
    pub fn tileset(&self, handle: TilesetHandle) -> Option<&Tileset> {
        self.tilesets.get(handle.index())
    }

    /// Sheet behind a handle.
    #[inline]
    pub fn sheet(&self, handle: SheetHandle) -> Option<&SpriteSheet> {
        self.sheets.get(handle.index())
    }

    /// Warnings accumulated so far.
    #[inline]
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Drain the accumulated warnings.
    pub fn take_warnings(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings)
    }

    fn add_palette(&mut self, palette: Palette) -> PaletteHandle {
        let handle = PaletteHandle::new(self.palettes.len() as u32);
        self.palettes.push(palette);
        handle
    }

    fn add_tileset(&mut self, tileset: Tileset) -> TilesetHandle {
        let handle = TilesetHandle::new(self.tilesets.len() as u32);
        self.tilesets.push(tileset);
        handle
    }

    fn add_sheet(&mut self, sheet: SpriteSheet) -> SheetHandle {
        let handle = SheetHandle::new(self.sheets.len() as u32);
        self.sheets.push(sheet);
        handle
    }

    /// Compile background frames into a palette, a tileset and one cell
    /// map per frame.
    ///
    /// # Errors
    ///
    /// Configuration errors for no frames or an affine map at 4bpp; shape
    /// errors for frame sizes the hardware has no map for; capacity errors
    /// past the tile ceiling, unless `force`.
    pub fn compile_map(
        &mut self,
        name: &str,
        kind: MapKind,
        frames: &[Raster],
    ) -> CompileResult<MapOutput> {
        if frames.is_empty() {
            return Err(CompileError::Config(format!("{name}: no frames to compile")));
        }
        if kind == MapKind::Affine && self.config.depth != BitDepth::Eight {
            return Err(CompileError::Config(format!(
                "{name}: affine maps take 8-bit cells and need an 8bpp tileset"
            )));
        }

        let options = TilesetOptions {
            name: name.to_string(),
            // Affine cells cannot encode flips.
            mirror: kind == MapKind::Text && self.config.mirror,
            tile_limit: match kind {
                MapKind::Text => TEXT_TILE_LIMIT,
                MapKind::Affine => AFFINE_TILE_LIMIT,
            },
            border: self.config.tile_border,
            force: self.config.force,
        };

        let build = match self.config.depth {
            BitDepth::Eight => {
                let palette = self.build_shared_palette(frames)?;
                let remap = self.remap_options();
                let mut cache = SearchCache::new();
                let mut indexed = Vec::with_capacity(frames.len());
                for frame in frames {
                    indexed.push(remap_raster(frame, &palette, &mut cache, &remap)?);
                }
                build_8bpp(&indexed, palette, &options)?
            }
            BitDepth::Four => build_4bpp(frames, self.config.transparent, &options)?,
        };
        let TileBuild {
            tileset,
            grids,
            warnings,
        } = build;
        self.warnings.extend(warnings);

        let palette = match tileset.palettes() {
            TilesetPalettes::Shared(palette) => palette.clone(),
            TilesetPalettes::Banked(banks) => flatten_banks(banks)?,
        };

        let mut maps = Vec::with_capacity(grids.len());
        for grid in &grids {
            maps.push(build_map(kind, grid, name)?);
        }
        info!(
            "{name}: {} tiles, {} map(s) at {}bpp",
            tileset.len(),
            maps.len(),
            self.config.depth.bits()
        );

        Ok(MapOutput {
            palette: self.add_palette(palette),
            tileset: self.add_tileset(tileset),
            maps,
            grids,
        })
    }

    /// Compile sprites into a shared palette (8bpp) or the sixteen banks
    /// (4bpp), then place them in object VRAM per the configured mapping.
    ///
    /// Each sprite is placed once; its frames share the placement and
    /// stream into the same tiles at runtime. Under 2D mapping the
    /// returned canvas shows every placed sprite's first frame.
    ///
    /// # Errors
    ///
    /// Configuration errors for an empty request list or empty frame
    /// stacks; shape errors for frame sizes outside the hardware sprite
    /// table; capacity errors when object VRAM runs out, unless `force`.
    pub fn compile_sprites(&mut self, requests: &[SpriteRequest]) -> CompileResult<SheetOutput> {
        if requests.is_empty() {
            return Err(CompileError::Config("no sprites to compile".to_string()));
        }
        for request in requests {
            check_frames(request)?;
        }

        let (palette, pairs) = match self.config.depth {
            BitDepth::Eight => self.shared_palette_sprites(requests)?,
            BitDepth::Four => self.banked_sprites(requests)?,
        };
        let (mut placed, frames): (Vec<Sprite>, Vec<Vec<IndexRaster>>) =
            pairs.into_iter().unzip();

        let (width, height) = sheet_size(self.config.depth);
        let (sheet, canvas) = match self.config.mapping {
            ObjectMapping::TwoDimensional => {
                let mut sheet = SpriteSheet::new(width, height)?;
                let warnings = pack_sprites(&mut sheet, &mut placed, self.config.force)?;
                self.warnings.extend(warnings);
                let canvas = blit_canvas(&sheet, &placed, &frames)?;
                (Some(self.add_sheet(sheet)), Some(canvas))
            }
            ObjectMapping::OneDimensional => {
                let mut layout = LinearLayout::new(width * height);
                let warnings = pack_linear(&mut layout, &mut placed, self.config.force)?;
                self.warnings.extend(warnings);
                (None, None)
            }
        };

        let depth = self.config.depth;
        let sprites = placed
            .into_iter()
            .zip(frames)
            .map(|(sprite, frames)| SpriteData {
                sprite,
                frames,
                depth,
            })
            .collect();

        Ok(SheetOutput {
            palette: self.add_palette(palette),
            sheet,
            canvas,
            sprites,
        })
    }

    /// Artifacts for a map run: the palette, the tileset, then every map.
    ///
    /// # Errors
    ///
    /// [`tilery_core::Error::IndexOutOfBounds`] for handles from another
    /// pipeline.
    pub fn map_artifacts(&self, output: &MapOutput) -> CompileResult<Vec<Artifact>> {
        let palette = self.lookup_palette(output.palette)?;
        let tileset = self
            .tileset(output.tileset)
            .ok_or(tilery_core::Error::IndexOutOfBounds {
                index: output.tileset.index(),
                len: self.tilesets.len(),
            })?;
        let mut artifacts = vec![
            Artifact::Palette(palette.clone()),
            Artifact::Tileset(tileset.clone()),
        ];
        artifacts.extend(output.maps.iter().cloned().map(Artifact::Map));
        Ok(artifacts)
    }

    /// Artifacts for a sprite run: the palette, each sprite, and the sheet
    /// canvas when 2D mapping produced one.
    ///
    /// # Errors
    ///
    /// [`tilery_core::Error::IndexOutOfBounds`] for handles from another
    /// pipeline.
    pub fn sheet_artifacts(&self, output: &SheetOutput) -> CompileResult<Vec<Artifact>> {
        let palette = self.lookup_palette(output.palette)?;
        let mut artifacts = vec![Artifact::Palette(palette.clone())];
        artifacts.extend(output.sprites.iter().cloned().map(Artifact::Sprite));
        if let Some(canvas) = &output.canvas {
            artifacts.push(Artifact::SpriteSheet(SheetData {
                canvas: canvas.clone(),
                sprites: output.sprites.clone(),
                depth: self.config.depth,
            }));
        }
        Ok(artifacts)
    }

    fn lookup_palette(&self, handle: PaletteHandle) -> CompileResult<&Palette> {
        self.palette(handle)
            .ok_or(tilery_core::Error::IndexOutOfBounds {
                index: handle.index(),
                len: self.palettes.len(),
            })
            .map_err(CompileError::from)
    }

    /// Build the shared palette over every frame of a run.
    fn build_shared_palette<'a, I>(&self, frames: I) -> CompileResult<Palette>
    where
        I: IntoIterator<Item = &'a Raster>,
    {
        let mut histogram = Histogram::new();
        for frame in frames {
            histogram.add_raster_keyed(frame, self.config.transparent);
        }
        let build = build_palette(
            &histogram,
            self.config.transparent,
            self.config.palette_offset,
            &QuantizeOptions::with_max_colors(self.config.palette_size),
        )?;
        let palette = Palette::from_colors(
            build.colors.iter().map(|&color| Color16::from_color(color)),
            self.config.palette_offset,
        )?;
        info!(
            "palette: {} colors at offset {}{}",
            palette.len(),
            palette.offset(),
            if build.reduced { " (reduced)" } else { "" }
        );
        Ok(palette)
    }

    /// With an index offset the key has no reserved slot, so transparency
    /// keying is off and key pixels quantize as content.
    fn remap_options(&self) -> RemapOptions {
        RemapOptions {
            transparent: (self.config.palette_offset == 0).then_some(self.config.transparent),
            transparent_index: 0,
            dither: self.config.dither,
        }
    }

    fn shared_palette_sprites(
        &self,
        requests: &[SpriteRequest],
    ) -> CompileResult<(Palette, Vec<(Sprite, Vec<IndexRaster>)>)> {
        let palette = self.build_shared_palette(requests.iter().flat_map(|r| &r.frames))?;
        let remap = self.remap_options();
        let offset = self.config.palette_offset as u8;

        let mut cache = SearchCache::new();
        let mut pairs = Vec::with_capacity(requests.len());
        for request in requests {
            let sprite = new_sprite(request)?;
            let mut frames = Vec::with_capacity(request.frames.len());
            for frame in &request.frames {
                let mut indexed = remap_raster(frame, &palette, &mut cache, &remap)?;
                if offset > 0 {
                    // Sprite tile bytes address the full hardware palette,
                    // so local indices shift to their absolute slots.
                    for index in indexed.indices_mut() {
                        *index += offset;
                    }
                }
                frames.push(indexed);
            }
            pairs.push((sprite, frames));
        }
        Ok((palette, pairs))
    }

    fn banked_sprites(
        &mut self,
        requests: &[SpriteRequest],
    ) -> CompileResult<(Palette, Vec<(Sprite, Vec<IndexRaster>)>)> {
        let key = self.config.transparent;
        let key16 = Color16::from_color(key);

        // Hardware draws slot 0 of every bank transparent; seed the key
        // there so every sprite palette lines up.
        let mut banks = BankSet::new();
        for id in 0..BANK_COUNT as u8 {
            if let Some(bank) = banks.get_mut(id) {
                bank.push(key16)?;
            }
        }

        let mut pairs = Vec::with_capacity(requests.len());
        for request in requests {
            let mut sprite = new_sprite(request)?;
            let local = quantize_sprite(request, key)?;
            let assignment = assign_bank(&mut banks, &local.colors, &local.weights)?;
            if let Some(plan) = &assignment.lossy {
                let warning = Warning::for_image(
                    &request.name,
                    WarningKind::LossyBankMerge {
                        bank: assignment.bank,
                        dropped: plan.dropped,
                        error: plan.error,
                    },
                );
                warn!("{warning}");
                self.warnings.push(warning);
            }
            sprite.set_bank(assignment.bank);

            let mut frames = Vec::with_capacity(local.frames.len());
            for mut frame in local.frames {
                for index in frame.indices_mut() {
                    *index = *assignment.slots.get(*index as usize).ok_or(
                        tilery_core::Error::IndexOutOfBounds {
                            index: *index as usize,
                            len: assignment.slots.len(),
                        },
                    )?;
                }
                frames.push(frame);
            }
            pairs.push((sprite, frames));
        }

        let palette = flatten_banks(&banks)?;
        Ok((palette, pairs))
    }
}

/// A sprite quantized on its own: at most sixteen local colors with the
/// key at slot 0, their pixel populations, and each frame indexed against
/// them.
#[derive(Debug)]
struct LocalSprite {
    colors: Vec<Color16>,
    weights: Vec<u64>,
    frames: Vec<IndexRaster>,
}

fn quantize_sprite(request: &SpriteRequest, key: Color) -> CompileResult<LocalSprite> {
    let mut histogram = Histogram::new();
    for frame in &request.frames {
        histogram.add_raster_keyed(frame, key);
    }
    let build = build_palette(
        &histogram,
        key,
        0,
        &QuantizeOptions::with_max_colors(BANK_SIZE as u16),
    )?;

    // 5-bit truncation can fold two quantized colors together; keep the
    // first occurrence so the key stays at slot 0.
    let mut colors: Vec<Color16> = Vec::new();
    for &color in &build.colors {
        let c16 = Color16::from_color(color);
        if !colors.contains(&c16) {
            colors.push(c16);
        }
    }

    let mut weights = vec![0u64; colors.len()];
    let mut frames = Vec::with_capacity(request.frames.len());
    for frame in &request.frames {
        let mut indexed = IndexRaster::new(frame.width(), frame.height())?;
        for y in 0..frame.height() {
            for x in 0..frame.width() {
                let Some(pixel) = frame.get(x, y) else { continue };
                let slot = if is_transparent(pixel, key) {
                    0
                } else {
                    nearest_slot(&colors, pixel)
                        .map(|(slot, _)| slot)
                        .ok_or(tilery_core::Error::EmptyPalette)?
                };
                weights[slot as usize] += 1;
                indexed.set(x, y, slot)?;
            }
        }
        frames.push(indexed);
    }
    Ok(LocalSprite {
        colors,
        weights,
        frames,
    })
}

fn check_frames(request: &SpriteRequest) -> CompileResult<()> {
    let Some(first) = request.frames.first() else {
        return Err(SheetError::NoFrames {
            name: request.name.clone(),
        }
        .into());
    };
    if first.width() % TILE_SIDE != 0 || first.height() % TILE_SIDE != 0 {
        return Err(CompileError::RaggedFrame {
            name: request.name.clone(),
            width: first.width(),
            height: first.height(),
        });
    }
    for (i, frame) in request.frames.iter().enumerate().skip(1) {
        if frame.width() != first.width() || frame.height() != first.height() {
            return Err(CompileError::MixedFrames {
                name: request.name.clone(),
                frame: i,
                width: first.width(),
                height: first.height(),
                got_width: frame.width(),
                got_height: frame.height(),
            });
        }
    }
    Ok(())
}

fn new_sprite(request: &SpriteRequest) -> CompileResult<Sprite> {
    let first = request
        .frames
        .first()
        .ok_or_else(|| SheetError::NoFrames {
            name: request.name.clone(),
        })?;
    Ok(Sprite::new(
        request.name.clone(),
        first.width() / TILE_SIDE,
        first.height() / TILE_SIDE,
        request.frames.len() as u32,
    )?)
}

/// Object VRAM geometry by depth: the 32KB tile space is 32x32 tiles at
/// 4bpp and 16x32 at 8bpp.
fn sheet_size(depth: BitDepth) -> (u32, u32) {
    match depth {
        BitDepth::Four => (32, 32),
        BitDepth::Eight => (16, 32),
    }
}

/// Flatten sixteen banks into one 256-entry palette image, each bank
/// padded to its 16-slot boundary with zero entries.
fn flatten_banks(banks: &BankSet) -> CompileResult<Palette> {
    let mut palette = Palette::new();
    for bank in banks.banks() {
        for &color in bank.colors() {
            palette.push(color)?;
        }
        for _ in bank.len()..BANK_SIZE {
            palette.push(Color16::from_bits(0))?;
        }
    }
    Ok(palette)
}

fn blit_canvas(
    sheet: &SpriteSheet,
    sprites: &[Sprite],
    frames: &[Vec<IndexRaster>],
) -> CompileResult<IndexRaster> {
    let mut canvas = IndexRaster::new(sheet.width() * TILE_SIDE, sheet.height() * TILE_SIDE)?;
    for (sprite, sprite_frames) in sprites.iter().zip(frames) {
        let Some(Placement::Sheet(block)) = sprite.placement() else {
            continue;
        };
        let Some(first) = sprite_frames.first() else {
            continue;
        };
        for y in 0..first.height() {
            for x in 0..first.width() {
                if let Some(index) = first.get(x, y) {
                    canvas.set(block.x * TILE_SIDE + x, block.y * TILE_SIDE + y, index)?;
                }
            }
        }
    }
    Ok(canvas)
}

//! Tileset construction
//!
//! Turns frames into a deduplicated tile store plus per-frame match grids:
//!
//! - **8bpp**: frames arrive already remapped against one shared palette;
//!   tiles are sliced and deduplicated directly.
//! - **4bpp**: a staged pipeline. Pass 1 extracts and raw-deduplicates
//!   8x8 pixel tiles; pass 2 quantizes each unique tile to a local
//!   16-color palette, checks the combined color budget, allocates every
//!   tile into one of the sixteen hardware banks, rewrites its indices to
//!   bank slot order, and only then deduplicates the normalized tiles.
//!
//! Tile ids are dense from 1; id 0 is a synthetic all-zero tile. Mirror
//! deduplication registers all four orientations of every stored tile, so
//! an observed tile resolves in one lookup to `(id, flip)`.

use std::collections::{HashMap, HashSet};

use log::{info, warn};
use tilery_core::{
    BANK_COUNT, BANK_SIZE, BankSet, Color, Color16, IndexRaster, MAX_SLOTS, MergePlan, Palette,
    Raster, Warning, WarningKind, is_transparent, nearest_slot,
};
use tilery_quant::{Histogram, QuantizeOptions, build_palette};

use crate::error::{TileError, TileResult};
use crate::tile::{Flip, ImageTile, TILE_PIXELS, TILE_SIDE, Tile};

/// Tile ceiling for text backgrounds (10-bit tile ids).
pub const TEXT_TILE_LIMIT: usize = 1024;
/// Tile ceiling for affine backgrounds (8-bit cells).
pub const AFFINE_TILE_LIMIT: usize = 256;

/// Controls for a tileset build.
#[derive(Debug, Clone)]
pub struct TilesetOptions {
    /// Source image name, used in errors, warnings and logs.
    pub name: String,
    /// Match tiles against their mirror orientations.
    pub mirror: bool,
    /// Unique-tile ceiling, including the null tile.
    pub tile_limit: usize,
    /// Gutter in source pixels on every side of every tile.
    pub border: u32,
    /// Downgrade capacity failures to warnings.
    pub force: bool,
}

impl Default for TilesetOptions {
    fn default() -> Self {
        Self {
            name: "tiles".to_string(),
            mirror: true,
            tile_limit: TEXT_TILE_LIMIT,
            border: 0,
            force: false,
        }
    }
}

/// One observed tile position resolved against a tileset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRef {
    /// Tile id in the tileset.
    pub id: u16,
    /// Palette bank the observation renders with (0 for 8bpp).
    pub bank: u8,
    /// Orientation relating the stored tile to the observation.
    pub flip: Flip,
}

/// Per-frame grid of tile references, one per 8x8 cell.
#[derive(Debug, Clone)]
pub struct TileGrid {
    width: u32,
    height: u32,
    cells: Vec<TileRef>,
}

impl TileGrid {
    /// Wrap a cell buffer.
    ///
    /// # Errors
    ///
    /// [`tilery_core::Error::PixelCountMismatch`] when the buffer length is
    /// not `width * height`.
    pub fn new(width: u32, height: u32, cells: Vec<TileRef>) -> TileResult<Self> {
        let expected = (width * height) as usize;
        if cells.len() != expected {
            return Err(tilery_core::Error::PixelCountMismatch {
                expected,
                actual: cells.len(),
            }
            .into());
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Width in tiles.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in tiles.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Cell at tile coordinates `(x, y)`.
    #[inline]
    pub fn cell(&self, x: u32, y: u32) -> Option<TileRef> {
        if x < self.width && y < self.height {
            Some(self.cells[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// All cells in row-major order.
    #[inline]
    pub fn cells(&self) -> &[TileRef] {
        &self.cells
    }
}

/// Palette storage of a tileset: one shared palette or sixteen banks,
/// never both.
#[derive(Debug, Clone)]
pub enum TilesetPalettes {
    /// 8bpp: one palette shared by every tile.
    Shared(Palette),
    /// 4bpp: sixteen 16-color banks.
    Banked(BankSet),
}

/// Deduplicated tile store with its palette storage.
#[derive(Debug, Clone)]
pub struct Tileset {
    name: String,
    tiles: Vec<Tile>,
    lookup: HashMap<[u8; TILE_PIXELS], (u16, Flip)>,
    palettes: TilesetPalettes,
    mirror: bool,
    limit: usize,
}

impl Tileset {
    /// Empty tileset holding only the null tile at id 0.
    pub fn new(
        name: impl Into<String>,
        palettes: TilesetPalettes,
        mirror: bool,
        limit: usize,
    ) -> Self {
        let mut tileset = Self {
            name: name.into(),
            tiles: Vec::new(),
            lookup: HashMap::new(),
            palettes,
            mirror,
            limit,
        };
        let null = Tile::null();
        tileset.register(&null, 0);
        tileset.tiles.push(null);
        tileset
    }

    /// Source name this tileset was built from.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total tiles including the null tile.
    #[inline]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Always false: the null tile is present from construction.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Tiles in id order.
    #[inline]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Tile by id.
    #[inline]
    pub fn get(&self, id: u16) -> Option<&Tile> {
        self.tiles.get(id as usize)
    }

    /// Palette storage.
    #[inline]
    pub fn palettes(&self) -> &TilesetPalettes {
        &self.palettes
    }

    /// Bits per pixel implied by the palette storage.
    #[inline]
    pub fn bpp(&self) -> u32 {
        match self.palettes {
            TilesetPalettes::Shared(_) => 8,
            TilesetPalettes::Banked(_) => 4,
        }
    }

    /// The shared palette, for 8bpp tilesets.
    pub fn shared_palette(&self) -> Option<&Palette> {
        match &self.palettes {
            TilesetPalettes::Shared(palette) => Some(palette),
            TilesetPalettes::Banked(_) => None,
        }
    }

    /// The bank set, for 4bpp tilesets.
    pub fn banks(&self) -> Option<&BankSet> {
        match &self.palettes {
            TilesetPalettes::Shared(_) => None,
            TilesetPalettes::Banked(banks) => Some(banks),
        }
    }

    /// Unique-tile ceiling this tileset was built against.
    #[inline]
    pub fn limit(&self) -> usize {
        self.limit
    }

    fn register(&mut self, tile: &Tile, id: u16) {
        if self.mirror {
            for flip in Flip::ALL {
                self.lookup
                    .entry(*tile.flipped(flip).indices())
                    .or_insert((id, flip));
            }
        } else {
            self.lookup.entry(*tile.indices()).or_insert((id, Flip::NONE));
        }
    }

    /// Insert a normalized tile, returning its id and the orientation the
    /// match was found in. An existing match leaves the store untouched.
    ///
    /// # Errors
    ///
    /// [`TileError::TileOverflow`] past the absolute 16-bit id space. The
    /// configured ceiling is enforced by the build functions instead, where
    /// `force` can downgrade it.
    pub fn insert(&mut self, tile: Tile) -> TileResult<(u16, Flip)> {
        if let Some(&(id, flip)) = self.lookup.get(tile.indices()) {
            return Ok((id, flip));
        }
        if self.tiles.len() > u16::MAX as usize {
            return Err(TileError::TileOverflow {
                name: self.name.clone(),
                limit: u16::MAX as usize + 1,
                got: self.tiles.len() + 1,
            });
        }
        let id = self.tiles.len() as u16;
        self.register(&tile, id);
        self.tiles.push(tile);
        Ok((id, Flip::NONE))
    }

    /// Reconstruct the indexed image a grid encodes, applying cell flips.
    ///
    /// # Errors
    ///
    /// [`tilery_core::Error::IndexOutOfBounds`] when a cell references a
    /// missing tile.
    pub fn render_grid(&self, grid: &TileGrid) -> TileResult<IndexRaster> {
        let mut out = IndexRaster::new(grid.width() * TILE_SIDE, grid.height() * TILE_SIDE)?;
        for ty in 0..grid.height() {
            for tx in 0..grid.width() {
                let cell = grid.cell(tx, ty).ok_or(tilery_core::Error::IndexOutOfBounds {
                    index: (ty * grid.width() + tx) as usize,
                    len: grid.cells().len(),
                })?;
                let tile = self
                    .get(cell.id)
                    .ok_or(tilery_core::Error::IndexOutOfBounds {
                        index: cell.id as usize,
                        len: self.tiles.len(),
                    })?
                    .flipped(cell.flip);
                for y in 0..TILE_SIDE {
                    for x in 0..TILE_SIDE {
                        out.set(tx * TILE_SIDE + x, ty * TILE_SIDE + y, tile.get(x, y))?;
                    }
                }
            }
        }
        Ok(out)
    }
}

/// A finished build: the tileset, one match grid per input frame, and any
/// warnings the build produced.
#[derive(Debug)]
pub struct TileBuild {
    pub tileset: Tileset,
    pub grids: Vec<TileGrid>,
    pub warnings: Vec<Warning>,
}

/// Top-left source pixel of tile column/row `t` under a gutter border.
#[inline]
fn tile_origin(t: u32, border: u32) -> u32 {
    border + t * (TILE_SIDE + 2 * border)
}

fn frame_grid_size(width: u32, height: u32, options: &TilesetOptions) -> TileResult<(u32, u32)> {
    let stride = TILE_SIDE + 2 * options.border;
    if width == 0 || height == 0 || width % stride != 0 || height % stride != 0 {
        return Err(TileError::BadFrameSize {
            name: options.name.clone(),
            width,
            height,
            border: options.border,
        });
    }
    Ok((width / stride, height / stride))
}

fn enforce_ceiling(
    tileset: &Tileset,
    options: &TilesetOptions,
    warnings: &mut Vec<Warning>,
) -> TileResult<()> {
    let got = tileset.len();
    if got <= options.tile_limit {
        return Ok(());
    }
    if !options.force {
        return Err(TileError::TileOverflow {
            name: options.name.clone(),
            limit: options.tile_limit,
            got,
        });
    }
    let warning = Warning::for_image(
        &options.name,
        WarningKind::TileCeiling {
            limit: options.tile_limit,
            got,
        },
    );
    warn!("{warning}");
    warnings.push(warning);
    Ok(())
}

/// Build an 8bpp tileset from frames already remapped against `palette`.
///
/// Emitted tile indices are absolute hardware slots: the palette offset is
/// added to every remapped index.
///
/// # Errors
///
/// Shape errors for frames that do not divide into tiles; the tile ceiling
/// unless `force`.
pub fn build_8bpp(
    frames: &[IndexRaster],
    palette: Palette,
    options: &TilesetOptions,
) -> TileResult<TileBuild> {
    let mut warnings = Vec::new();
    let offset = palette.offset() as u8;
    let mut tileset = Tileset::new(
        options.name.clone(),
        TilesetPalettes::Shared(palette),
        options.mirror,
        options.tile_limit,
    );

    let mut grids = Vec::with_capacity(frames.len());
    for frame in frames {
        let (tiles_x, tiles_y) = frame_grid_size(frame.width(), frame.height(), options)?;
        let mut cells = Vec::with_capacity((tiles_x * tiles_y) as usize);
        for ty in 0..tiles_y {
            for tx in 0..tiles_x {
                let x0 = tile_origin(tx, options.border);
                let y0 = tile_origin(ty, options.border);
                let mut indices = [0u8; TILE_PIXELS];
                for y in 0..TILE_SIDE {
                    for x in 0..TILE_SIDE {
                        let local = frame.get(x0 + x, y0 + y).ok_or(
                            tilery_core::Error::IndexOutOfBounds {
                                index: ((y0 + y) * frame.width() + x0 + x) as usize,
                                len: frame.indices().len(),
                            },
                        )?;
                        indices[(y * TILE_SIDE + x) as usize] = local + offset;
                    }
                }
                let (id, flip) = tileset.insert(Tile::new(indices))?;
                cells.push(TileRef { id, bank: 0, flip });
            }
        }
        grids.push(TileGrid::new(tiles_x, tiles_y, cells)?);
    }

    enforce_ceiling(&tileset, options, &mut warnings)?;
    info!(
        "{}: {} unique tiles from {} frames (8bpp)",
        options.name,
        tileset.len(),
        frames.len()
    );
    Ok(TileBuild {
        tileset,
        grids,
        warnings,
    })
}

/// A tile quantized against its own local palette, before bank allocation.
#[derive(Debug, Clone)]
pub struct LocalTile {
    /// Indices into `colors`, row-major.
    pub indices: [u8; TILE_PIXELS],
    /// Local palette, transparent at slot 0, at most 16 entries.
    pub colors: Vec<Color16>,
    /// Pixel count per local color, used to weight lossy merges.
    pub weights: Vec<u64>,
}

/// Quantize an 8x8 pixel tile to at most 16 colors with transparent at
/// local slot 0.
///
/// # Errors
///
/// Quantization errors propagate; the tile always has pixels, so an empty
/// histogram is impossible.
pub fn quantize_tile(tile: &ImageTile, transparent: Color) -> TileResult<LocalTile> {
    let mut histogram = Histogram::new();
    for &pixel in tile.pixels() {
        if is_transparent(pixel, transparent) {
            histogram.record(transparent);
        } else {
            histogram.record(pixel);
        }
    }
    let build = build_palette(
        &histogram,
        transparent,
        0,
        &QuantizeOptions::with_max_colors(BANK_SIZE as u16),
    )?;

    // 5-bit truncation can fold two quantized colors together; keep the
    // first occurrence so transparent stays at slot 0.
    let mut colors: Vec<Color16> = Vec::new();
    for &color in &build.colors {
        let c16 = Color16::from_color(color);
        if !colors.contains(&c16) {
            colors.push(c16);
        }
    }

    let mut indices = [0u8; TILE_PIXELS];
    let mut weights = vec![0u64; colors.len()];
    for (i, &pixel) in tile.pixels().iter().enumerate() {
        let slot = if is_transparent(pixel, transparent) {
            0
        } else {
            nearest_slot(&colors, pixel)
                .map(|(slot, _)| slot)
                .ok_or(tilery_core::Error::EmptyPalette)?
        };
        indices[i] = slot;
        weights[slot as usize] += 1;
    }
    Ok(LocalTile {
        indices,
        colors,
        weights,
    })
}

/// Where a tile's colors ended up: the bank, the slot per local color, and
/// the merge plan when the allocation was lossy.
#[derive(Debug)]
pub struct BankAssignment {
    pub bank: u8,
    pub slots: Vec<u8>,
    pub lossy: Option<MergePlan>,
}

/// Allocate a color set into one of the sixteen banks.
///
/// `weights` is parallel to `colors`: the pixel population behind each
/// color, used to rank lossy merges. Preference order: a bank already
/// containing every color, else the fitting bank needing the fewest new
/// colors, else a lossy merge into the bank whose existing colors
/// approximate the set best (smallest planned error). Ties resolve to the
/// lowest bank id.
///
/// # Errors
///
/// Core errors propagate from merge planning; with sixteen banks present a
/// candidate always exists.
pub fn assign_bank(
    banks: &mut BankSet,
    colors: &[Color16],
    weights: &[u64],
) -> TileResult<BankAssignment> {
    for bank in banks.banks() {
        if bank.contains_all(colors) {
            let id = bank.id();
            let slots = banks
                .get_mut(id)
                .ok_or(tilery_core::Error::IndexOutOfBounds {
                    index: id as usize,
                    len: BANK_COUNT,
                })?
                .absorb(colors)?;
            return Ok(BankAssignment {
                bank: id,
                slots,
                lossy: None,
            });
        }
    }

    let mut cheapest: Option<(u8, usize)> = None;
    for bank in banks.banks() {
        if !bank.fits(colors) {
            continue;
        }
        let cost = bank.merge_cost(colors);
        if cheapest.is_none_or(|(_, best)| cost < best) {
            cheapest = Some((bank.id(), cost));
        }
    }
    if let Some((id, _)) = cheapest {
        let slots = banks
            .get_mut(id)
            .ok_or(tilery_core::Error::IndexOutOfBounds {
                index: id as usize,
                len: BANK_COUNT,
            })?
            .absorb(colors)?;
        return Ok(BankAssignment {
            bank: id,
            slots,
            lossy: None,
        });
    }

    let pairs: Vec<(Color16, u64)> = colors
        .iter()
        .copied()
        .zip(weights.iter().copied())
        .collect();
    let mut best: Option<(u8, MergePlan)> = None;
    for bank in banks.banks() {
        let plan = bank.plan_merge(&pairs)?;
        if best.as_ref().is_none_or(|(_, held)| plan.error < held.error) {
            best = Some((bank.id(), plan));
        }
    }
    let (id, plan) = best.ok_or(tilery_core::Error::EmptyPalette)?;
    banks
        .get_mut(id)
        .ok_or(tilery_core::Error::IndexOutOfBounds {
            index: id as usize,
            len: BANK_COUNT,
        })?
        .apply_merge(&plan)?;
    Ok(BankAssignment {
        bank: id,
        slots: plan.slots.clone(),
        lossy: Some(plan),
    })
}

/// Build a 4bpp tileset from RGBA frames.
///
/// Staged: raw tile extraction with mirror dedup, per-tile quantization,
/// the combined 256-color precheck, bank allocation with slot rewriting,
/// then normalized-tile dedup.
///
/// # Errors
///
/// Shape errors for frames that do not divide into tiles; the combined
/// color budget and the tile ceiling unless `force`.
pub fn build_4bpp(
    frames: &[Raster],
    transparent: Color,
    options: &TilesetOptions,
) -> TileResult<TileBuild> {
    let mut warnings = Vec::new();

    // Pass 1: raw extraction. Dedup here so each distinct pixel tile is
    // quantized and bank-allocated exactly once.
    let mut raw: Vec<ImageTile> = Vec::new();
    let mut raw_lookup: HashMap<ImageTile, (usize, Flip)> = HashMap::new();
    let mut frame_refs: Vec<(u32, u32, Vec<(usize, Flip)>)> = Vec::with_capacity(frames.len());
    for frame in frames {
        let (tiles_x, tiles_y) = frame_grid_size(frame.width(), frame.height(), options)?;
        let mut refs = Vec::with_capacity((tiles_x * tiles_y) as usize);
        for ty in 0..tiles_y {
            for tx in 0..tiles_x {
                let tile = ImageTile::from_raster(
                    frame,
                    tile_origin(tx, options.border),
                    tile_origin(ty, options.border),
                )?;
                let entry = match raw_lookup.get(&tile) {
                    Some(&found) => found,
                    None => {
                        let index = raw.len();
                        if options.mirror {
                            for flip in Flip::ALL {
                                raw_lookup
                                    .entry(tile.flipped(flip))
                                    .or_insert((index, flip));
                            }
                        } else {
                            raw_lookup.insert(tile.clone(), (index, Flip::NONE));
                        }
                        raw.push(tile);
                        (index, Flip::NONE)
                    }
                };
                refs.push(entry);
            }
        }
        frame_refs.push((tiles_x, tiles_y, refs));
    }

    // Pass 2a: local quantization.
    let locals: Vec<LocalTile> = raw
        .iter()
        .map(|tile| quantize_tile(tile, transparent))
        .collect::<TileResult<_>>()?;

    // Pass 2b: combined color budget.
    let mut distinct: HashSet<Color16> = HashSet::new();
    for local in &locals {
        distinct.extend(local.colors.iter().copied());
    }
    if distinct.len() > MAX_SLOTS {
        if !options.force {
            return Err(TileError::CombinedColors {
                name: options.name.clone(),
                limit: MAX_SLOTS,
                got: distinct.len(),
            });
        }
        let warning = Warning::for_image(
            &options.name,
            WarningKind::CombinedColors {
                limit: MAX_SLOTS,
                got: distinct.len(),
            },
        );
        warn!("{warning}");
        warnings.push(warning);
    }

    // Pass 2c: bank allocation and slot rewriting. Hardware draws slot 0
    // of every bank as transparent, so the key color is seeded there up
    // front and every local slot 0 maps to bank slot 0.
    let mut banks = BankSet::new();
    let key = Color16::from_color(transparent);
    for id in 0..BANK_COUNT as u8 {
        if let Some(bank) = banks.get_mut(id) {
            bank.push(key)?;
        }
    }
    let mut normalized: Vec<(Tile, u8)> = Vec::with_capacity(locals.len());
    for local in &locals {
        let assignment = assign_bank(&mut banks, &local.colors, &local.weights)?;
        if let Some(plan) = &assignment.lossy {
            let warning = Warning::for_image(
                &options.name,
                WarningKind::LossyBankMerge {
                    bank: assignment.bank,
                    dropped: plan.dropped,
                    error: plan.error,
                },
            );
            warn!("{warning}");
            warnings.push(warning);
        }
        let mut tile = Tile::new(local.indices);
        tile.use_palette(&assignment.slots)?;
        tile.set_bank(assignment.bank);
        normalized.push((tile, assignment.bank));
    }

    // Pass 2d: dedup of normalized tiles.
    let mut tileset = Tileset::new(
        options.name.clone(),
        TilesetPalettes::Banked(banks),
        options.mirror,
        options.tile_limit,
    );
    let mut placed: Vec<(u16, u8, Flip)> = Vec::with_capacity(normalized.len());
    for (tile, bank) in normalized {
        let (id, flip) = tileset.insert(tile)?;
        placed.push((id, bank, flip));
    }

    let mut grids = Vec::with_capacity(frame_refs.len());
    for (tiles_x, tiles_y, refs) in frame_refs {
        let cells = refs
            .into_iter()
            .map(|(raw_index, observed_flip)| {
                let (id, bank, stored_flip) = placed[raw_index];
                TileRef {
                    id,
                    bank,
                    flip: observed_flip.compose(stored_flip),
                }
            })
            .collect();
        grids.push(TileGrid::new(tiles_x, tiles_y, cells)?);
    }

    enforce_ceiling(&tileset, options, &mut warnings)?;
    let bank_colors = tileset.banks().map_or(0, BankSet::total_colors);
    info!(
        "{}: {} unique tiles, {} bank colors from {} frames (4bpp)",
        options.name,
        tileset.len(),
        bank_colors,
        frames.len()
    );
    Ok(TileBuild {
        tileset,
        grids,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: Color = Color::new(255, 0, 255);

    fn opts(name: &str) -> TilesetOptions {
        TilesetOptions {
            name: name.to_string(),
            ..TilesetOptions::default()
        }
    }

    fn shared_tileset() -> Tileset {
        Tileset::new(
            "t",
            TilesetPalettes::Shared(Palette::new()),
            true,
            TEXT_TILE_LIMIT,
        )
    }

    #[test]
    fn test_null_tile_occupies_id_zero() {
        let mut ts = shared_tileset();
        assert_eq!(ts.len(), 1);
        let (id, flip) = ts.insert(Tile::null()).unwrap();
        assert_eq!((id, flip), (0, Flip::NONE));
        let (id, _) = ts.insert(Tile::new([1; TILE_PIXELS])).unwrap();
        assert_eq!(id, 1);
    }

    #[test]
    fn test_insert_dedups_and_mirrors() {
        let mut ts = shared_tileset();
        let mut indices = [0u8; TILE_PIXELS];
        for (i, v) in indices.iter_mut().enumerate() {
            *v = i as u8;
        }
        let tile = Tile::new(indices);
        let (id, _) = ts.insert(tile.clone()).unwrap();
        let flipped = tile.flipped(Flip::ALL[1]);
        let (mirror_id, flip) = ts.insert(flipped).unwrap();
        assert_eq!(mirror_id, id);
        assert_eq!(flip, Flip::ALL[1]);
        assert_eq!(ts.len(), 2);
    }

    #[test]
    fn test_mirror_dedup_disabled_keeps_variants() {
        let mut ts = Tileset::new(
            "t",
            TilesetPalettes::Shared(Palette::new()),
            false,
            TEXT_TILE_LIMIT,
        );
        let mut indices = [0u8; TILE_PIXELS];
        for (i, v) in indices.iter_mut().enumerate() {
            *v = i as u8;
        }
        let tile = Tile::new(indices);
        let (a, _) = ts.insert(tile.clone()).unwrap();
        let (b, _) = ts.insert(tile.flipped(Flip::ALL[1])).unwrap();
        assert_ne!(a, b);
        assert_eq!(ts.len(), 3);
    }

    #[test]
    fn test_8bpp_build_dedups_regions() {
        // Two identical tiles plus one distinct
        let mut frame = IndexRaster::new(24, 8).unwrap();
        frame.set(3, 2, 1).unwrap();
        frame.set(11, 2, 1).unwrap();
        for x in 16..24 {
            frame.set(x, 0, 7).unwrap();
        }
        let build = build_8bpp(&[frame], Palette::new(), &opts("im")).unwrap();
        assert_eq!(build.tileset.len(), 3); // null + dotted + marked
        let grid = &build.grids[0];
        assert_eq!(grid.cell(0, 0), grid.cell(1, 0));
        assert_ne!(grid.cell(0, 0).unwrap().id, grid.cell(2, 0).unwrap().id);
        assert_ne!(grid.cell(0, 0).unwrap().id, 0);
    }

    #[test]
    fn test_8bpp_offset_shifts_indices() {
        let palette = Palette::with_offset(16).unwrap();
        let mut frame = IndexRaster::new(8, 8).unwrap();
        frame.set(0, 0, 3).unwrap();
        let build = build_8bpp(&[frame], palette, &opts("im")).unwrap();
        let tile = build.tileset.get(1).unwrap();
        assert_eq!(tile.get(0, 0), 19);
        assert_eq!(tile.get(1, 0), 16);
    }

    #[test]
    fn test_ceiling_errors_without_force() {
        // 4 distinct tiles against a limit of 3 (incl. the null tile)
        let mut frame = IndexRaster::new(32, 8).unwrap();
        for t in 0..4u8 {
            frame.set(t as u32 * 8, 0, t + 1).unwrap();
        }
        let mut options = opts("im");
        options.tile_limit = 3;
        let err = build_8bpp(&[frame.clone()], Palette::new(), &options).unwrap_err();
        assert!(matches!(
            err,
            TileError::TileOverflow {
                limit: 3,
                got: 5,
                ..
            }
        ));

        options.force = true;
        let build = build_8bpp(&[frame], Palette::new(), &options).unwrap();
        assert_eq!(build.tileset.len(), 5);
        assert_eq!(build.warnings.len(), 1);
    }

    #[test]
    fn test_frame_must_divide_into_tiles() {
        let frame = IndexRaster::new(12, 8).unwrap();
        assert!(matches!(
            build_8bpp(&[frame], Palette::new(), &opts("im")),
            Err(TileError::BadFrameSize { .. })
        ));
    }

    #[test]
    fn test_border_skips_gutters() {
        // 1px border: each 10x10 block holds an 8x8 tile at (1,1)
        let mut frame = IndexRaster::new(20, 10).unwrap();
        frame.set(0, 0, 9).unwrap(); // gutter, must be ignored
        frame.set(11, 1, 5).unwrap(); // second tile's top-left
        let mut options = opts("im");
        options.border = 1;
        let build = build_8bpp(&[frame], Palette::new(), &options).unwrap();
        assert_eq!(build.grids[0].width(), 2);
        let second = build.grids[0].cell(1, 0).unwrap();
        assert_eq!(build.tileset.get(second.id).unwrap().get(0, 0), 5);
    }

    #[test]
    fn test_quantize_tile_reserves_transparent_slot() {
        let mut raster = tilery_test::solid(8, 8, Color::new(0, 0, 248));
        raster.set(0, 0, KEY).unwrap();
        let tile = ImageTile::from_raster(&raster, 0, 0).unwrap();
        let local = quantize_tile(&tile, KEY).unwrap();
        assert_eq!(local.colors[0], Color16::from_color(KEY));
        assert_eq!(local.indices[0], 0);
        assert_eq!(local.weights[0], 1);
        assert_eq!(local.weights[1], 63);
    }

    #[test]
    fn test_assign_bank_prefers_containing_bank() {
        let mut banks = BankSet::new();
        let colors = [Color16::from_bits(1), Color16::from_bits(2)];
        banks.get_mut(2).unwrap().absorb(&colors).unwrap();
        let a = assign_bank(&mut banks, &colors, &[32, 32]).unwrap();
        assert_eq!(a.bank, 2);
        assert_eq!(a.slots, vec![0, 1]);
        assert!(a.lossy.is_none());
        // Bank 2 did not grow
        assert_eq!(banks.get(2).unwrap().len(), 2);
    }

    #[test]
    fn test_assign_bank_picks_cheapest_fit() {
        let mut banks = BankSet::new();
        // Bank 0 shares one color with the set, bank 1 none.
        banks
            .get_mut(0)
            .unwrap()
            .absorb(&[Color16::from_bits(1)])
            .unwrap();
        let colors = [Color16::from_bits(1), Color16::from_bits(2)];
        let a = assign_bank(&mut banks, &colors, &[32, 32]).unwrap();
        assert_eq!(a.bank, 0);
        assert_eq!(banks.get(0).unwrap().len(), 2);
    }

    #[test]
    fn test_assign_bank_falls_back_to_lossy_merge() {
        let mut banks = BankSet::new();
        // Fill every bank completely with grays.
        for id in 0..BANK_COUNT as u8 {
            let bank = banks.get_mut(id).unwrap();
            for i in 0..BANK_SIZE as u8 {
                bank.push(Color16::from_color(Color::new(
                    i * 16,
                    i * 16,
                    id * 8,
                )))
                .unwrap();
            }
        }
        let colors = [Color16::from_color(Color::new(248, 0, 0))];
        let a = assign_bank(&mut banks, &colors, &[64]).unwrap();
        let plan = a.lossy.expect("merge must be lossy");
        assert_eq!(plan.dropped, 1);
        assert!(plan.error > 0.0);
    }

    #[test]
    fn test_4bpp_mirrored_regions_share_a_tile() {
        let red = Color::new(248, 0, 0);
        let blue = Color::new(0, 0, 248);
        let half = |x: u32, _y: u32| if x < 4 { red } else { blue };
        let mut frame = Raster::new(16, 8).unwrap();
        for y in 0..8 {
            for x in 0..8 {
                frame.set(x, y, half(x, y)).unwrap();
                // Second tile is the horizontal mirror of the first
                frame.set(8 + x, y, half(7 - x, y)).unwrap();
            }
        }
        let build = build_4bpp(&[frame], KEY, &opts("im")).unwrap();
        assert_eq!(build.tileset.len(), 2);
        let grid = &build.grids[0];
        let left = grid.cell(0, 0).unwrap();
        let right = grid.cell(1, 0).unwrap();
        assert_eq!(left.id, right.id);
        assert_ne!(left.flip, right.flip);
        assert!(right.flip.horizontal ^ left.flip.horizontal);
    }

    #[test]
    fn test_4bpp_same_indices_different_colors_stay_distinct() {
        // Both tiles quantize to local palettes with identical index
        // layouts; only the colors differ. After bank-slot rewriting they
        // must remain separate tiles.
        let mut frame = Raster::new(16, 8).unwrap();
        for y in 0..8 {
            for x in 0..8 {
                let a = if x < 4 {
                    Color::new(248, 0, 0)
                } else {
                    Color::new(0, 0, 0)
                };
                let b = if x < 4 {
                    Color::new(0, 248, 0)
                } else {
                    Color::new(0, 0, 0)
                };
                frame.set(x, y, a).unwrap();
                frame.set(8 + x, y, b).unwrap();
            }
        }
        let build = build_4bpp(&[frame], KEY, &opts("im")).unwrap();
        // null + red/black + green/black
        assert_eq!(build.tileset.len(), 3);
    }

    #[test]
    fn test_4bpp_transparent_region_is_null_tile() {
        let mut frame = tilery_test::solid(16, 8, KEY);
        for y in 0..8 {
            for x in 0..8 {
                frame.set(8 + x, y, Color::new(0, 248, 0)).unwrap();
            }
        }
        let build = build_4bpp(&[frame], KEY, &opts("im")).unwrap();
        let grid = &build.grids[0];
        assert_eq!(grid.cell(0, 0).unwrap().id, 0);
        assert_ne!(grid.cell(1, 0).unwrap().id, 0);
    }

    #[test]
    fn test_render_grid_round_trips_8bpp() {
        let mut frame = IndexRaster::new(16, 16).unwrap();
        for y in 0..16 {
            for x in 0..16 {
                frame.set(x, y, ((x * 7 + y * 3) % 4) as u8).unwrap();
            }
        }
        let build = build_8bpp(&[frame.clone()], Palette::new(), &opts("im")).unwrap();
        let rebuilt = build.tileset.render_grid(&build.grids[0]).unwrap();
        assert_eq!(rebuilt, frame);
    }
}

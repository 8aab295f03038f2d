//! Palette remapping with optional Hilbert-curve error diffusion
//!
//! [`remap_raster`] turns an RGBA frame into palette indices. With
//! dithering enabled the frame is walked along a Hilbert curve instead of
//! raster order, carrying a single running error accumulator; the curve's
//! locality spreads quantization error in both dimensions without the
//! directional banding of row-serpentine diffusion.
//!
//! The curve always covers the power-of-two square enclosing the canvas.
//! Points falling outside the canvas are skipped but still advance the
//! curve, so canvas size never changes the traversal shape.

use log::trace;

use tilery_core::{Color, IndexRaster, Palette, Raster, SearchCache, is_transparent, nearest};

use crate::error::{QuantError, QuantResult};

/// Remapping controls.
#[derive(Debug, Clone)]
pub struct RemapOptions {
    /// Designated transparent color. Matching pixels emit
    /// `transparent_index` directly, bypassing search and error diffusion.
    pub transparent: Option<Color>,
    /// Palette-local index transparent pixels map to, normally 0.
    pub transparent_index: u8,
    /// Dither strength in [0.0, 1.0], or `None` for plain nearest-color
    /// remapping in raster order.
    pub dither: Option<f32>,
}

impl Default for RemapOptions {
    fn default() -> Self {
        Self {
            transparent: None,
            transparent_index: 0,
            dither: None,
        }
    }
}

/// Hilbert curve order covering a `width x height` canvas:
/// `ceil(log2(max(width, height)))`.
pub fn hilbert_level(width: u32, height: u32) -> u32 {
    width.max(height).max(1).next_power_of_two().trailing_zeros()
}

/// Curve-distance to coordinates on a `2^level` square Hilbert curve.
fn hilbert_d2xy(level: u32, d: u64) -> (u32, u32) {
    let n = 1u64 << level;
    let mut t = d;
    let (mut x, mut y) = (0u64, 0u64);
    let mut s = 1u64;
    while s < n {
        let rx = 1 & (t / 2);
        let ry = 1 & (t ^ rx);
        if ry == 0 {
            if rx == 1 {
                x = s - 1 - x;
                y = s - 1 - y;
            }
            std::mem::swap(&mut x, &mut y);
        }
        x += s * rx;
        y += s * ry;
        t /= 4;
        s *= 2;
    }
    (x as u32, y as u32)
}

/// Map every pixel of `raster` to a palette index.
///
/// # Errors
///
/// [`QuantError::InvalidParameters`] for a dither level outside [0, 1] or a
/// transparent index past the palette; search errors propagate from
/// [`nearest`].
pub fn remap_raster(
    raster: &Raster,
    palette: &Palette,
    cache: &mut SearchCache,
    options: &RemapOptions,
) -> QuantResult<IndexRaster> {
    if let Some(level) = options.dither {
        if !(0.0..=1.0).contains(&level) || !level.is_finite() {
            return Err(QuantError::InvalidParameters(format!(
                "dither level must be within [0, 1], got {level}"
            )));
        }
    }
    if options.transparent.is_some() && options.transparent_index as usize >= palette.len() {
        return Err(QuantError::InvalidParameters(format!(
            "transparent index {} outside palette of {} colors",
            options.transparent_index,
            palette.len()
        )));
    }

    let mut out = IndexRaster::new(raster.width(), raster.height())?;
    match options.dither {
        Some(level) => dithered(raster, palette, cache, options, level, &mut out)?,
        None => plain(raster, palette, cache, options, &mut out)?,
    }
    Ok(out)
}

fn plain(
    raster: &Raster,
    palette: &Palette,
    cache: &mut SearchCache,
    options: &RemapOptions,
    out: &mut IndexRaster,
) -> QuantResult<()> {
    for y in 0..raster.height() {
        for x in 0..raster.width() {
            let pixel = raster.get(x, y).ok_or(tilery_core::Error::IndexOutOfBounds {
                index: (y * raster.width() + x) as usize,
                len: raster.pixels().len(),
            })?;
            let index = match options.transparent {
                Some(key) if is_transparent(pixel, key) => options.transparent_index,
                _ => nearest(palette, cache, pixel)?.index,
            };
            out.set(x, y, index)?;
        }
    }
    Ok(())
}

fn dithered(
    raster: &Raster,
    palette: &Palette,
    cache: &mut SearchCache,
    options: &RemapOptions,
    level: f32,
    out: &mut IndexRaster,
) -> QuantResult<()> {
    let order = hilbert_level(raster.width(), raster.height());
    let steps = 1u64 << (2 * order);
    trace!(
        "dither: order {order} curve over {}x{} canvas",
        raster.width(),
        raster.height()
    );

    let mut acc = [0.0f32; 3];
    for d in 0..steps {
        let (x, y) = hilbert_d2xy(order, d);
        // Off-canvas curve points consume a step but touch nothing.
        let Some(pixel) = raster.get(x, y) else {
            continue;
        };

        if let Some(key) = options.transparent {
            if is_transparent(pixel, key) {
                out.set(x, y, options.transparent_index)?;
                continue;
            }
        }

        let adjusted = Color::new(
            (pixel.r as f32 + acc[0]).clamp(0.0, 255.0).round() as u8,
            (pixel.g as f32 + acc[1]).clamp(0.0, 255.0).round() as u8,
            (pixel.b as f32 + acc[2]).clamp(0.0, 255.0).round() as u8,
        );
        let found = nearest(palette, cache, adjusted)?;
        out.set(x, y, found.index)?;

        let matched = palette
            .get(found.index as usize)
            .ok_or(tilery_core::Error::IndexOutOfBounds {
                index: found.index as usize,
                len: palette.len(),
            })?
            .to_color();
        acc[0] = (acc[0] + pixel.r as f32 - matched.r as f32).clamp(-255.0, 255.0) * level;
        acc[1] = (acc[1] + pixel.g as f32 - matched.g as f32).clamp(-255.0, 255.0) * level;
        acc[2] = (acc[2] + pixel.b as f32 - matched.b as f32).clamp(-255.0, 255.0) * level;
    }
    Ok(())
}

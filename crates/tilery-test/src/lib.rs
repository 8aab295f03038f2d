//! Tilery Test - synthetic rasters for hermetic tests
//!
//! Every test image in the workspace is built in code by these helpers, so
//! tests carry no fixture files and remain exact: a builder's output is part
//! of the assertion.
//!
//! All builders panic on invalid dimensions; they are test-only code and a
//! bad size is a bug in the test itself.

use tilery_core::{Color, Raster};

/// Raster filled with one color.
pub fn solid(width: u32, height: u32, color: Color) -> Raster {
    Raster::from_pixels(width, height, vec![color; (width * height) as usize]).unwrap()
}

/// Horizontal grayscale ramp: column x has value `x * 255 / (width - 1)`.
pub fn gradient_h(width: u32, height: u32) -> Raster {
    let mut pixels = Vec::with_capacity((width * height) as usize);
    for _y in 0..height {
        for x in 0..width {
            let v = if width > 1 {
                ((x * 255) / (width - 1)) as u8
            } else {
                0
            };
            pixels.push(Color::new(v, v, v));
        }
    }
    Raster::from_pixels(width, height, pixels).unwrap()
}

/// Checkerboard of `cell`-sized squares alternating between two colors.
pub fn checker(width: u32, height: u32, cell: u32, a: Color, b: Color) -> Raster {
    assert!(cell > 0, "checker cell must be positive");
    let mut pixels = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        for x in 0..width {
            let even = ((x / cell) + (y / cell)) % 2 == 0;
            pixels.push(if even { a } else { b });
        }
    }
    Raster::from_pixels(width, height, pixels).unwrap()
}

/// Raster built per 8x8 tile: tile `(tx, ty)` is filled with `f(tx, ty)`.
///
/// Dimensions must be multiples of 8.
pub fn tiled(width: u32, height: u32, f: impl Fn(u32, u32) -> Color) -> Raster {
    assert!(
        width % 8 == 0 && height % 8 == 0,
        "tiled builder needs multiples of 8, got {width}x{height}"
    );
    let mut pixels = vec![Color::new(0, 0, 0); (width * height) as usize];
    for ty in 0..height / 8 {
        for tx in 0..width / 8 {
            let color = f(tx, ty);
            for dy in 0..8 {
                for dx in 0..8 {
                    let x = tx * 8 + dx;
                    let y = ty * 8 + dy;
                    pixels[(y * width + x) as usize] = color;
                }
            }
        }
    }
    Raster::from_pixels(width, height, pixels).unwrap()
}

/// Raster built per pixel from a coordinate function.
pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> Color) -> Raster {
    let mut pixels = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        for x in 0..width {
            pixels.push(f(x, y));
        }
    }
    Raster::from_pixels(width, height, pixels).unwrap()
}

/// Copy an 8x8 region of `src` into a new raster, mirrored as requested.
///
/// Used to assemble images whose tiles are exact mirrors of each other.
pub fn mirrored_tile(src: &Raster, ox: u32, oy: u32, flip_h: bool, flip_v: bool) -> Raster {
    let mut out = Raster::new(8, 8).unwrap();
    for dy in 0..8 {
        for dx in 0..8 {
            let sx = if flip_h { 7 - dx } else { dx };
            let sy = if flip_v { 7 - dy } else { dy };
            let c = src.get(ox + sx, oy + sy).unwrap();
            out.set(dx, dy, c).unwrap();
        }
    }
    out
}

/// Paste `tile` (8x8) into `dst` at tile coordinates `(tx, ty)`.
pub fn paste_tile(dst: &mut Raster, tx: u32, ty: u32, tile: &Raster) {
    assert_eq!(tile.width(), 8);
    assert_eq!(tile.height(), 8);
    for dy in 0..8 {
        for dx in 0..8 {
            dst.set(tx * 8 + dx, ty * 8 + dy, tile.get(dx, dy).unwrap())
                .unwrap();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_endpoints() {
        let g = gradient_h(256, 1);
        assert_eq!(g.get(0, 0).unwrap(), Color::new(0, 0, 0));
        assert_eq!(g.get(255, 0).unwrap(), Color::new(255, 255, 255));
    }

    #[test]
    fn test_checker_alternates() {
        let a = Color::new(255, 0, 0);
        let b = Color::new(0, 0, 255);
        let r = checker(4, 4, 2, a, b);
        assert_eq!(r.get(0, 0).unwrap(), a);
        assert_eq!(r.get(2, 0).unwrap(), b);
        assert_eq!(r.get(0, 2).unwrap(), b);
        assert_eq!(r.get(2, 2).unwrap(), a);
    }

    #[test]
    fn test_mirrored_tile_flips() {
        let src = from_fn(8, 8, |x, y| Color::new(x as u8, y as u8, 0));
        let h = mirrored_tile(&src, 0, 0, true, false);
        assert_eq!(h.get(0, 0).unwrap(), Color::new(7, 0, 0));
        let v = mirrored_tile(&src, 0, 0, false, true);
        assert_eq!(v.get(0, 0).unwrap(), Color::new(0, 7, 0));
    }
}

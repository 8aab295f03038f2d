//! Color types and the perceptual distance metric
//!
//! Three representations of one color, each with a fixed job:
//!
//! - [`Color`] - 8-bit RGBA working color, the type every algorithm consumes
//! - [`Color16`] - native 5:5:5 hardware color with a 1-bit alpha flag
//! - [`ColorLab`] - CIE L*a*b* projection used for perceptual distance
//!
//! The distance between two colors is the weighted squared difference of
//! their Lab components (see [`ColorLab::distance_sq`]). The weights are
//! fixed; every nearest-color decision in the compiler goes through this one
//! formula, so changing it changes the binary output of every pipeline.

use std::cmp::Ordering;

/// 8-bit RGBA color.
///
/// Ordering is lexicographic by `(r, g, b)`; alpha participates only as a
/// final tie-break so that the order stays consistent with equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Create an opaque color.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a color with an explicit alpha value.
    #[inline]
    pub const fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// True when the RGB channels match, ignoring alpha.
    ///
    /// The designated transparent color is keyed by its RGB value, so the
    /// pipeline uses this rather than full equality when testing for it.
    #[inline]
    pub fn same_rgb(self, other: Self) -> bool {
        self.r == other.r && self.g == other.g && self.b == other.b
    }
}

/// Whether a pixel counts as transparent under the designated key color.
///
/// Either the alpha channel says so (below the hardware threshold) or the
/// RGB value matches the key. Every stage that separates transparent pixels
/// from content uses this one predicate.
#[inline]
pub fn is_transparent(pixel: Color, key: Color) -> bool {
    pixel.a < 128 || pixel.same_rgb(key)
}

impl PartialOrd for Color {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Color {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.r, self.g, self.b, self.a).cmp(&(other.r, other.g, other.b, other.a))
    }
}

/// Native 5:5:5 hardware color with a 1-bit alpha flag.
///
/// Bit layout: red in bits 0-4, green in 5-9, blue in 10-14, alpha in 15.
/// Conversion from 8-bit truncates each channel (`>> 3`); conversion back
/// shifts up (`<< 3`). Truncation is applied consistently in both
/// directions so repeated round trips are stable after the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Color16(u16);

impl Color16 {
    const GREEN_SHIFT: u16 = 5;
    const BLUE_SHIFT: u16 = 10;
    const ALPHA_SHIFT: u16 = 15;

    /// Convert an 8-bit color by truncating each channel to 5 bits.
    ///
    /// The alpha flag is set for `a >= 128` (top bit of the 8-bit alpha).
    #[inline]
    pub const fn from_color(c: Color) -> Self {
        let r = (c.r >> 3) as u16;
        let g = (c.g >> 3) as u16;
        let b = (c.b >> 3) as u16;
        let a = (c.a >> 7) as u16;
        Self(
            r | (g << Self::GREEN_SHIFT) | (b << Self::BLUE_SHIFT) | (a << Self::ALPHA_SHIFT),
        )
    }

    /// Expand back to an 8-bit color (`<< 3` per channel).
    #[inline]
    pub const fn to_color(self) -> Color {
        Color {
            r: (self.r5() << 3),
            g: (self.g5() << 3),
            b: (self.b5() << 3),
            a: if self.alpha_bit() { 255 } else { 0 },
        }
    }

    /// Raw 16-bit hardware value.
    #[inline]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Wrap a raw 16-bit hardware value.
    #[inline]
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// 5-bit red component.
    #[inline]
    pub const fn r5(self) -> u8 {
        (self.0 & 0x1f) as u8
    }

    /// 5-bit green component.
    #[inline]
    pub const fn g5(self) -> u8 {
        ((self.0 >> Self::GREEN_SHIFT) & 0x1f) as u8
    }

    /// 5-bit blue component.
    #[inline]
    pub const fn b5(self) -> u8 {
        ((self.0 >> Self::BLUE_SHIFT) & 0x1f) as u8
    }

    /// Alpha flag (bit 15).
    #[inline]
    pub const fn alpha_bit(self) -> bool {
        (self.0 >> Self::ALPHA_SHIFT) & 1 != 0
    }
}

impl From<Color> for Color16 {
    #[inline]
    fn from(c: Color) -> Self {
        Self::from_color(c)
    }
}

/// Weight applied to squared lightness differences.
pub const WEIGHT_L: f32 = 2.0;
/// Weight applied to squared green-red differences.
pub const WEIGHT_A: f32 = 1.0;
/// Weight applied to squared blue-yellow differences.
pub const WEIGHT_B: f32 = 1.0;

/// CIE L*a*b* projection of a color (D65 illuminant).
///
/// - `l`: lightness in [0.0, 100.0]
/// - `a`: green-red component, typically [-128, 127]
/// - `b`: blue-yellow component, typically [-128, 127]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorLab {
    pub l: f32,
    pub a: f32,
    pub b: f32,
}

impl ColorLab {
    /// Convert an 8-bit RGB color (sRGB, D65 white point).
    pub fn from_color(c: Color) -> Self {
        let r = srgb_to_linear(c.r);
        let g = srgb_to_linear(c.g);
        let b = srgb_to_linear(c.b);

        // sRGB -> XYZ, D65
        let x = 0.412_456_4 * r + 0.357_576_1 * g + 0.180_437_5 * b;
        let y = 0.212_672_9 * r + 0.715_152_2 * g + 0.072_175_0 * b;
        let z = 0.019_333_9 * r + 0.119_192_0 * g + 0.950_304_1 * b;

        // Normalize by the D65 white point
        let fx = lab_f(x / 0.950_47);
        let fy = lab_f(y / 1.0);
        let fz = lab_f(z / 1.088_83);

        Self {
            l: 116.0 * fy - 16.0,
            a: 500.0 * (fx - fy),
            b: 200.0 * (fy - fz),
        }
    }

    /// Weighted squared distance to another Lab color.
    ///
    /// `WEIGHT_L * dl^2 + WEIGHT_A * da^2 + WEIGHT_B * db^2`. Deliberately
    /// not a true CIE delta-E: lightness is over-weighted so that shading
    /// ramps survive quantization. The constants are load-bearing for
    /// output compatibility.
    #[inline]
    pub fn distance_sq(self, other: Self) -> f32 {
        let dl = self.l - other.l;
        let da = self.a - other.a;
        let db = self.b - other.b;
        WEIGHT_L * dl * dl + WEIGHT_A * da * da + WEIGHT_B * db * db
    }
}

/// Weighted squared Lab distance between two RGB colors.
#[inline]
pub fn color_distance_sq(a: Color, b: Color) -> f32 {
    ColorLab::from_color(a).distance_sq(ColorLab::from_color(b))
}

#[inline]
fn srgb_to_linear(c: u8) -> f32 {
    let c = c as f32 / 255.0;
    if c <= 0.040_45 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[inline]
fn lab_f(t: f32) -> f32 {
    // delta = 6/29
    const DELTA_CUBED: f32 = 0.008_856_452;
    const SLOPE: f32 = 7.787_037; // 1 / (3 * delta^2)
    if t > DELTA_CUBED {
        t.cbrt()
    } else {
        SLOPE * t + 16.0 / 116.0
    }
}

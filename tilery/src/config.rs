//! Compilation configuration
//!
//! One immutable [`CompileConfig`] drives a whole pipeline. It is checked
//! once, when the pipeline is created, so later stages can rely on its
//! invariants without re-validating.

use tilery_core::{Color, MAX_SLOTS};

use crate::error::{CompileError, CompileResult};

/// Target bits per pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitDepth {
    /// Sixteen 16-color palette banks, 32-byte tiles.
    Four,
    /// One shared palette of up to 256 colors, 64-byte tiles.
    Eight,
}

impl BitDepth {
    /// Bits per pixel.
    #[inline]
    pub fn bits(self) -> u32 {
        match self {
            Self::Four => 4,
            Self::Eight => 8,
        }
    }

    /// Bytes one 8x8 tile occupies at this depth.
    #[inline]
    pub fn tile_bytes(self) -> usize {
        match self {
            Self::Four => 32,
            Self::Eight => 64,
        }
    }
}

/// How sprite tiles are addressed in object VRAM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectMapping {
    /// Rectangular blocks on a 2D sheet.
    TwoDimensional,
    /// Consecutive tiles in a flat array.
    OneDimensional,
}

/// Immutable settings for one compilation run.
#[derive(Debug, Clone)]
pub struct CompileConfig {
    /// Target bits per pixel.
    pub depth: BitDepth,
    /// Shared palette size at 8bpp, 1 to 256. 4bpp banks are fixed at 16
    /// colors each.
    pub palette_size: u16,
    /// Absolute hardware slot of the palette's first entry. Must be 0 at
    /// 4bpp. A nonzero offset leaves hardware slot 0 to some other run, so
    /// the transparent key loses its reserved slot and transparency keying
    /// is disabled for the run.
    pub palette_offset: u16,
    /// Designated transparent color.
    pub transparent: Color,
    /// Error-diffusion strength in [0.0, 1.0], or `None` for plain
    /// nearest-color remapping. Shared palettes only.
    pub dither: Option<f32>,
    /// Gutter in source pixels read around every tile.
    pub tile_border: u32,
    /// Match tiles against their mirrored orientations when deduplicating.
    pub mirror: bool,
    /// Downgrade capacity failures to warnings and keep going.
    pub force: bool,
    /// Sprite tile layout.
    pub mapping: ObjectMapping,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            depth: BitDepth::Eight,
            palette_size: 256,
            palette_offset: 0,
            transparent: Color::new(255, 0, 255),
            dither: None,
            tile_border: 0,
            mirror: true,
            force: false,
            mapping: ObjectMapping::TwoDimensional,
        }
    }
}

impl CompileConfig {
    pub(crate) fn validate(&self) -> CompileResult<()> {
        if self.palette_size == 0 || self.palette_size as usize > MAX_SLOTS {
            return Err(CompileError::Config(format!(
                "palette size must be between 1 and {MAX_SLOTS}, got {}",
                self.palette_size
            )));
        }
        if self.palette_offset as usize + self.palette_size as usize > MAX_SLOTS {
            return Err(CompileError::Config(format!(
                "palette of {} colors at offset {} runs past slot {MAX_SLOTS}",
                self.palette_size, self.palette_offset
            )));
        }
        if let Some(level) = self.dither {
            if !level.is_finite() || !(0.0..=1.0).contains(&level) {
                return Err(CompileError::Config(format!(
                    "dither level must be within [0, 1], got {level}"
                )));
            }
        }
        if self.depth == BitDepth::Four {
            if self.palette_offset != 0 {
                return Err(CompileError::Config(
                    "palette banks are addressed absolutely; offset must be 0 at 4bpp".to_string(),
                ));
            }
            if self.dither.is_some() {
                return Err(CompileError::Config(
                    "dithering needs a shared palette, not available at 4bpp".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorClass;

    #[test]
    fn test_default_config_is_valid() {
        assert!(CompileConfig::default().validate().is_ok());
    }

    #[test]
    fn test_palette_budget_enforced() {
        let zero = CompileConfig {
            palette_size: 0,
            ..CompileConfig::default()
        };
        assert!(zero.validate().is_err());

        let oversized = CompileConfig {
            palette_size: 300,
            ..CompileConfig::default()
        };
        assert!(oversized.validate().is_err());

        let past_end = CompileConfig {
            palette_size: 100,
            palette_offset: 200,
            ..CompileConfig::default()
        };
        let err = past_end.validate().unwrap_err();
        assert_eq!(err.class(), ErrorClass::Configuration);

        let snug = CompileConfig {
            palette_size: 56,
            palette_offset: 200,
            ..CompileConfig::default()
        };
        assert!(snug.validate().is_ok());
    }

    #[test]
    fn test_dither_level_range_checked() {
        for level in [-0.1, 1.5, f32::NAN, f32::INFINITY] {
            let config = CompileConfig {
                dither: Some(level),
                ..CompileConfig::default()
            };
            assert!(config.validate().is_err(), "accepted level {level}");
        }
        let edge = CompileConfig {
            dither: Some(1.0),
            ..CompileConfig::default()
        };
        assert!(edge.validate().is_ok());
    }

    #[test]
    fn test_4bpp_forbids_offset_and_dither() {
        let four = CompileConfig {
            depth: BitDepth::Four,
            ..CompileConfig::default()
        };
        assert!(four.validate().is_ok());

        let offset = CompileConfig {
            palette_offset: 16,
            palette_size: 16,
            ..four.clone()
        };
        assert!(offset.validate().is_err());

        let dithered = CompileConfig {
            dither: Some(0.5),
            ..four
        };
        assert!(dithered.validate().is_err());
    }
}

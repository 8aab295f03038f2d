//! Hardware palette
//!
//! A [`Palette`] is an ordered run of up to 256 [`Color16`] entries together
//! with an index offset: the run occupies absolute slots
//! `offset .. offset + len`. The invariant `len + offset <= 256` is checked
//! on construction and on every append.
//!
//! Palettes are plain comparable values. The nearest-match cache lives in
//! [`crate::search::SearchCache`], never here, so two palettes with the same
//! entries are equal regardless of what has been searched against them.

use crate::color::{Color, Color16};
use crate::error::{Error, Result};

/// Maximum number of palette slots addressable by an 8-bit index.
pub const MAX_SLOTS: usize = 256;

/// Ordered sequence of up to 256 hardware colors with an index offset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Palette {
    colors: Vec<Color16>,
    offset: u16,
}

impl Palette {
    /// Create an empty palette at offset 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty palette whose first entry sits at absolute slot
    /// `offset`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidOffset`] if `offset >= 256`.
    pub fn with_offset(offset: u16) -> Result<Self> {
        if offset as usize >= MAX_SLOTS {
            return Err(Error::InvalidOffset(offset));
        }
        Ok(Self {
            colors: Vec::new(),
            offset,
        })
    }

    /// Build a palette from hardware colors.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidOffset`] or [`Error::PaletteFull`] when the run does
    /// not fit in the 256-slot budget.
    pub fn from_colors<I>(colors: I, offset: u16) -> Result<Self>
    where
        I: IntoIterator<Item = Color16>,
    {
        let mut palette = Self::with_offset(offset)?;
        for color in colors {
            palette.push(color)?;
        }
        Ok(palette)
    }

    /// Number of colors in the palette.
    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// True when the palette holds no colors.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Index offset: the absolute slot of entry 0.
    #[inline]
    pub fn offset(&self) -> u16 {
        self.offset
    }

    /// Color at local index `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<Color16> {
        self.colors.get(index).copied()
    }

    /// All colors in index order.
    #[inline]
    pub fn colors(&self) -> &[Color16] {
        &self.colors
    }

    /// Absolute slot for a local index (`offset + index`).
    #[inline]
    pub fn absolute_index(&self, index: u8) -> u16 {
        self.offset + index as u16
    }

    /// Append a color, returning its local index.
    ///
    /// # Errors
    ///
    /// [`Error::PaletteFull`] when the append would push the run past
    /// slot 255.
    pub fn push(&mut self, color: Color16) -> Result<u8> {
        if self.colors.len() + self.offset as usize >= MAX_SLOTS {
            return Err(Error::PaletteFull {
                len: self.colors.len(),
                offset: self.offset,
            });
        }
        self.colors.push(color);
        Ok((self.colors.len() - 1) as u8)
    }

    /// Append an 8-bit color after hardware truncation.
    pub fn push_color(&mut self, color: Color) -> Result<u8> {
        self.push(Color16::from_color(color))
    }

    /// Local index of an exact entry, scanning in index order.
    pub fn position(&self, color: Color16) -> Option<u8> {
        self.colors.iter().position(|&c| c == color).map(|i| i as u8)
    }

    /// Exact membership test.
    #[inline]
    pub fn contains(&self, color: Color16) -> bool {
        self.position(color).is_some()
    }

    /// Index of `color`, appending it first when absent.
    pub fn intern(&mut self, color: Color16) -> Result<u8> {
        match self.position(color) {
            Some(index) => Ok(index),
            None => self.push(color),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_returns_dense_indices() {
        let mut p = Palette::new();
        assert_eq!(p.push(Color16::from_bits(1)).unwrap(), 0);
        assert_eq!(p.push(Color16::from_bits(2)).unwrap(), 1);
        assert_eq!(p.len(), 2);
    }

    #[test]
    fn test_offset_shrinks_capacity() {
        let mut p = Palette::with_offset(255).unwrap();
        p.push(Color16::from_bits(7)).unwrap();
        let err = p.push(Color16::from_bits(8)).unwrap_err();
        assert!(matches!(err, Error::PaletteFull { len: 1, offset: 255 }));
    }

    #[test]
    fn test_offset_must_leave_room() {
        assert!(Palette::with_offset(256).is_err());
        assert!(Palette::with_offset(255).is_ok());
    }

    #[test]
    fn test_capacity_is_256_without_offset() {
        let mut p = Palette::new();
        for i in 0..256u16 {
            p.push(Color16::from_bits(i)).unwrap();
        }
        assert!(p.push(Color16::from_bits(999)).is_err());
    }

    #[test]
    fn test_absolute_index_applies_offset() {
        let mut p = Palette::with_offset(16).unwrap();
        let i = p.push(Color16::from_bits(3)).unwrap();
        assert_eq!(p.absolute_index(i), 16);
    }

    #[test]
    fn test_intern_reuses_existing_entry() {
        let mut p = Palette::new();
        let a = p.intern(Color16::from_bits(10)).unwrap();
        let b = p.intern(Color16::from_bits(11)).unwrap();
        let again = p.intern(Color16::from_bits(10)).unwrap();
        assert_eq!(a, again);
        assert_ne!(a, b);
        assert_eq!(p.len(), 2);
    }

    #[test]
    fn test_palettes_compare_by_value() {
        let a = Palette::from_colors([Color16::from_bits(1)], 0).unwrap();
        let b = Palette::from_colors([Color16::from_bits(1)], 0).unwrap();
        let c = Palette::from_colors([Color16::from_bits(1)], 1).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}

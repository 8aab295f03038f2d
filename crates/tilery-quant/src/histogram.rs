//! Color frequency histogram
//!
//! Counts how often each distinct color occurs across one or more source
//! frames. Entries keep first-appearance order, which makes everything
//! downstream deterministic: the "already few enough colors" fast path
//! returns entries in this order, and median-cut box spans start from it.

use std::collections::HashMap;

use tilery_core::{Color, Raster, is_transparent};

/// Frequency table over distinct colors, ordered by first appearance.
#[derive(Debug, Clone, Default)]
pub struct Histogram {
    entries: Vec<(Color, u64)>,
    index: HashMap<Color, usize>,
    total: u64,
}

impl Histogram {
    /// Create an empty histogram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every pixel of a raster.
    pub fn from_raster(raster: &Raster) -> Self {
        let mut histogram = Self::new();
        histogram.add_raster(raster);
        histogram
    }

    /// Add all pixels of a raster to the counts.
    pub fn add_raster(&mut self, raster: &Raster) {
        for &pixel in raster.pixels() {
            self.record(pixel);
        }
    }

    /// Add all pixels of a raster, folding every transparent pixel into the
    /// designated `key` color. Low-alpha pixels carry arbitrary RGB values
    /// that must not claim palette slots of their own.
    pub fn add_raster_keyed(&mut self, raster: &Raster, key: Color) {
        for &pixel in raster.pixels() {
            if is_transparent(pixel, key) {
                self.record(key);
            } else {
                self.record(pixel);
            }
        }
    }

    /// Count one occurrence of `color`.
    #[inline]
    pub fn record(&mut self, color: Color) {
        self.record_n(color, 1);
    }

    /// Count `n` occurrences of `color`.
    pub fn record_n(&mut self, color: Color, n: u64) {
        match self.index.get(&color) {
            Some(&i) => self.entries[i].1 += n,
            None => {
                self.index.insert(color, self.entries.len());
                self.entries.push((color, n));
            }
        }
        self.total += n;
    }

    /// Number of distinct colors.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been counted.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total pixel population.
    #[inline]
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Occurrences of one color.
    pub fn count(&self, color: Color) -> u64 {
        self.index.get(&color).map_or(0, |&i| self.entries[i].1)
    }

    /// All `(color, count)` entries in first-appearance order.
    #[inline]
    pub fn entries(&self) -> &[(Color, u64)] {
        &self.entries
    }

    /// Remove a color entirely, returning its count.
    ///
    /// Used to take the designated transparent color out of quantization
    /// input. Remaining entries keep their relative order.
    pub fn remove(&mut self, color: Color) -> Option<u64> {
        let i = self.index.remove(&color)?;
        let (_, count) = self.entries.remove(i);
        for (c, _) in &self.entries[i..] {
            if let Some(slot) = self.index.get_mut(c) {
                *slot -= 1;
            }
        }
        self.total -= count;
        Some(count)
    }
}

//! Nearest-color palette search
//!
//! [`nearest`] resolves an 8-bit color to the closest palette entry under
//! the weighted Lab metric. Results are memoized in a [`SearchCache`], a
//! side table the caller owns per palette use-site; the palette itself stays
//! a pure value. Caching is purely an optimization: results are identical
//! with or without a warm cache.
//!
//! Ties keep the first (lowest-index) entry, so entry order is part of the
//! observable behavior.

use std::collections::HashMap;

use crate::color::{Color, Color16, ColorLab};
use crate::error::{Error, Result};
use crate::palette::Palette;

/// Outcome of a nearest-color search: local palette index plus the weighted
/// squared Lab error of the match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaletteMatch {
    pub index: u8,
    pub error: f32,
}

/// Per-entry diagnostics accumulated across searches.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntryStats {
    /// How many searches resolved to this entry.
    pub uses: u64,
    /// Sum of the match errors of those searches.
    pub error_sum: f64,
}

/// Memoization and diagnostics side table for one palette.
///
/// Keyed by queried [`Color`]. The cache also mirrors the palette entries in
/// Lab space; the mirror is refreshed whenever the palette has grown since
/// the last search, which is the only way palettes change.
#[derive(Debug, Default)]
pub struct SearchCache {
    results: HashMap<Color, PaletteMatch>,
    labs: Vec<ColorLab>,
    stats: Vec<EntryStats>,
    hits: u64,
    misses: u64,
}

impl SearchCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of searches answered from the memo table.
    #[inline]
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Number of searches that ran the linear scan.
    #[inline]
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Per-entry usage and error totals, indexed like the palette.
    #[inline]
    pub fn stats(&self) -> &[EntryStats] {
        &self.stats
    }

    /// Drop all memoized results and statistics.
    pub fn clear(&mut self) {
        self.results.clear();
        self.labs.clear();
        self.stats.clear();
        self.hits = 0;
        self.misses = 0;
    }

    fn sync(&mut self, palette: &Palette) {
        if self.labs.len() != palette.len() {
            self.labs = palette
                .colors()
                .iter()
                .map(|c| ColorLab::from_color(c.to_color()))
                .collect();
            self.stats.resize(palette.len(), EntryStats::default());
            // Entries appended since the last search can win queries the
            // old entries answered, so memoized results are stale too.
            self.results.clear();
        }
    }

    fn record(&mut self, color: Color, found: PaletteMatch) {
        self.results.insert(color, found);
        let entry = &mut self.stats[found.index as usize];
        entry.uses += 1;
        entry.error_sum += found.error as f64;
    }
}

/// Find the palette entry closest to `color`.
///
/// Fast path: a prior result for the exact same query color. Otherwise a
/// linear scan over the entries in index order, keeping the first minimum
/// and short-circuiting on an exact (distance 0) match.
///
/// # Errors
///
/// [`Error::EmptyPalette`] when the palette has no entries.
pub fn nearest(palette: &Palette, cache: &mut SearchCache, color: Color) -> Result<PaletteMatch> {
    if palette.is_empty() {
        return Err(Error::EmptyPalette);
    }
    cache.sync(palette);

    if let Some(&found) = cache.results.get(&color) {
        cache.hits += 1;
        let entry = &mut cache.stats[found.index as usize];
        entry.uses += 1;
        entry.error_sum += found.error as f64;
        return Ok(found);
    }
    cache.misses += 1;

    let lab = ColorLab::from_color(color);
    let mut best = PaletteMatch {
        index: 0,
        error: lab.distance_sq(cache.labs[0]),
    };
    for (i, entry_lab) in cache.labs.iter().enumerate().skip(1) {
        if best.error == 0.0 {
            break;
        }
        let d = lab.distance_sq(*entry_lab);
        if d < best.error {
            best = PaletteMatch {
                index: i as u8,
                error: d,
            };
        }
    }

    cache.record(color, best);
    Ok(best)
}

/// Cache-less nearest scan over a bare color slice.
///
/// Same metric and tie-break as [`nearest`]; used where no persistent
/// palette exists, such as lossy bank merges. Returns `None` on an empty
/// slice.
pub fn nearest_slot(colors: &[Color16], color: Color) -> Option<(u8, f32)> {
    let lab = ColorLab::from_color(color);
    let mut best: Option<(u8, f32)> = None;
    for (i, c) in colors.iter().enumerate() {
        let d = lab.distance_sq(ColorLab::from_color(c.to_color()));
        match best {
            Some((_, e)) if d >= e => {}
            _ => best = Some((i as u8, d)),
        }
        if d == 0.0 {
            break;
        }
    }
    best
}

//! 16-color palette banks
//!
//! 4bpp hardware addresses sixteen palettes of sixteen colors each. A
//! [`PaletteBank`] wraps a [`Palette`] capped at 16 entries and knows how to
//! merge a tile's color set into itself: cheaply when everything fits,
//! lossily via [`PaletteBank::plan_merge`] when it does not. Merge planning
//! is split from application so an allocator can rank candidate banks by
//! planned error before committing to one.

use crate::color::Color16;
use crate::error::{Error, Result};
use crate::palette::Palette;
use crate::search::nearest_slot;

/// Colors per bank.
pub const BANK_SIZE: usize = 16;
/// Banks per hardware palette set.
pub const BANK_COUNT: usize = 16;

/// One of the sixteen 16-color hardware palettes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteBank {
    id: u8,
    palette: Palette,
}

/// Precomputed outcome of merging a color set into a bank.
///
/// `slots` is parallel to the input set: the bank slot each input color ends
/// up mapped to, whether it was already present, newly added, or dropped to
/// its nearest surviving entry.
#[derive(Debug, Clone)]
pub struct MergePlan {
    /// Colors the merge appends to the bank, in input order.
    pub added: Vec<Color16>,
    /// Final bank slot per input color.
    pub slots: Vec<u8>,
    /// Number of input colors that could not be kept.
    pub dropped: usize,
    /// Weighted squared Lab error incurred by the dropped colors.
    pub error: f64,
}

impl MergePlan {
    /// True when every input color gets its own slot.
    #[inline]
    pub fn is_lossless(&self) -> bool {
        self.dropped == 0
    }
}

impl PaletteBank {
    /// Create an empty bank with hardware id `id` (0-15).
    pub fn new(id: u8) -> Self {
        Self {
            id,
            palette: Palette::new(),
        }
    }

    /// Hardware bank id.
    #[inline]
    pub fn id(&self) -> u8 {
        self.id
    }

    /// Number of colors currently in the bank.
    #[inline]
    pub fn len(&self) -> usize {
        self.palette.len()
    }

    /// True when the bank holds no colors.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.palette.is_empty()
    }

    /// The bank's colors in slot order.
    #[inline]
    pub fn colors(&self) -> &[Color16] {
        self.palette.colors()
    }

    /// The bank as a plain palette (offset 0).
    #[inline]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Append a color, returning its slot.
    ///
    /// # Errors
    ///
    /// [`Error::BankFull`] past 16 colors.
    pub fn push(&mut self, color: Color16) -> Result<u8> {
        if self.palette.len() >= BANK_SIZE {
            return Err(Error::BankFull {
                bank: self.id,
                len: self.palette.len(),
            });
        }
        self.palette.push(color)
    }

    /// True when every color in `colors` is already a bank entry.
    pub fn contains_all(&self, colors: &[Color16]) -> bool {
        colors.iter().all(|&c| self.palette.contains(c))
    }

    /// Number of distinct colors in `colors` not yet in the bank.
    pub fn merge_cost(&self, colors: &[Color16]) -> usize {
        let mut missing: Vec<Color16> = Vec::new();
        for &c in colors {
            if !self.palette.contains(c) && !missing.contains(&c) {
                missing.push(c);
            }
        }
        missing.len()
    }

    /// True when `colors` can merge in without dropping anything.
    pub fn fits(&self, colors: &[Color16]) -> bool {
        self.len() + self.merge_cost(colors) <= BANK_SIZE
    }

    /// Losslessly merge `colors`, returning the bank slot per input color.
    ///
    /// # Errors
    ///
    /// [`Error::BankFull`] when the set does not fit; check
    /// [`PaletteBank::fits`] first.
    pub fn absorb(&mut self, colors: &[Color16]) -> Result<Vec<u8>> {
        if !self.fits(colors) {
            return Err(Error::BankFull {
                bank: self.id,
                len: self.len(),
            });
        }
        colors.iter().map(|&c| self.palette.intern(c)).collect()
    }

    /// Plan a merge of weighted colors, dropping the cheapest when the bank
    /// cannot hold them all.
    ///
    /// Input colors already present keep their slots at no cost. Missing
    /// colors compete for the remaining capacity: the ones whose replacement
    /// by their nearest existing entry would cost the most weighted error
    /// are kept, the rest are mapped to their nearest entry among the
    /// surviving colors. Weights are typically pixel counts.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyPalette`] when a color must be dropped but the bank has
    /// nothing to map it to.
    pub fn plan_merge(&self, colors: &[(Color16, u64)]) -> Result<MergePlan> {
        // Slot per input, resolved in passes below. u8::MAX marks pending.
        let mut slots = vec![u8::MAX; colors.len()];
        // Missing colors in first-occurrence order. Tile palettes are
        // distinct by construction; a duplicate input color just resolves
        // to the same decision as its first occurrence.
        let mut unique: Vec<(Color16, u64)> = Vec::new();
        for (i, &(c, weight)) in colors.iter().enumerate() {
            if let Some(slot) = self.palette.position(c) {
                slots[i] = slot;
            } else if !unique.iter().any(|&(uc, _)| uc == c) {
                unique.push((c, weight));
            }
        }

        let room = BANK_SIZE - self.len();
        let keep: Vec<Color16> = if unique.len() <= room {
            unique.iter().map(|&(c, _)| c).collect()
        } else {
            // Rank by the weighted error of substituting the nearest
            // existing entry; stable sort keeps earlier colors on ties.
            let mut ranked: Vec<(Color16, f64)> = unique
                .iter()
                .map(|&(c, w)| {
                    let d = nearest_slot(self.colors(), c.to_color())
                        .map(|(_, d)| d as f64)
                        .unwrap_or(f64::INFINITY);
                    (c, w as f64 * d)
                })
                .collect();
            ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
            let kept: Vec<Color16> = ranked[..room].iter().map(|&(c, _)| c).collect();
            // Back to first-occurrence order for slot assignment.
            unique
                .iter()
                .map(|&(c, _)| c)
                .filter(|c| kept.contains(c))
                .collect()
        };

        let mut final_colors: Vec<Color16> = self.colors().to_vec();
        final_colors.extend_from_slice(&keep);

        let mut dropped = 0;
        let mut error = 0.0f64;
        for (i, &(c, weight)) in colors.iter().enumerate() {
            if slots[i] != u8::MAX {
                continue;
            }
            if let Some(pos) = keep.iter().position(|&k| k == c) {
                slots[i] = (self.len() + pos) as u8;
            } else {
                let (slot, d) = nearest_slot(&final_colors, c.to_color())
                    .ok_or(Error::EmptyPalette)?;
                slots[i] = slot;
                dropped += 1;
                error += weight as f64 * d as f64;
            }
        }

        Ok(MergePlan {
            added: keep,
            slots,
            dropped,
            error,
        })
    }

    /// Apply a plan produced by [`PaletteBank::plan_merge`].
    ///
    /// # Errors
    ///
    /// [`Error::BankFull`] if the plan no longer fits, which indicates the
    /// bank changed between planning and application.
    pub fn apply_merge(&mut self, plan: &MergePlan) -> Result<()> {
        for &c in &plan.added {
            self.push(c)?;
        }
        Ok(())
    }
}

/// The full set of sixteen banks.
#[derive(Debug, Clone)]
pub struct BankSet {
    banks: Vec<PaletteBank>,
}

impl BankSet {
    /// Create sixteen empty banks with ids 0-15.
    pub fn new() -> Self {
        Self {
            banks: (0..BANK_COUNT as u8).map(PaletteBank::new).collect(),
        }
    }

    /// Bank by id.
    #[inline]
    pub fn get(&self, id: u8) -> Option<&PaletteBank> {
        self.banks.get(id as usize)
    }

    /// Mutable bank by id.
    #[inline]
    pub fn get_mut(&mut self, id: u8) -> Option<&mut PaletteBank> {
        self.banks.get_mut(id as usize)
    }

    /// All banks in id order.
    #[inline]
    pub fn banks(&self) -> &[PaletteBank] {
        &self.banks
    }

    /// Total colors across all banks.
    pub fn total_colors(&self) -> usize {
        self.banks.iter().map(|b| b.len()).sum()
    }
}

impl Default for BankSet {
    fn default() -> Self {
        Self::new()
    }
}

//! Four-phase weighted median cut
//!
//! Classic median cut with one twist carried over from the original
//! hardware toolchain: box selection runs in four phases, each ranking the
//! split queue by a different key. Early phases favor geometric coverage
//! (volume), later phases favor heavily used and badly approximated boxes
//! (population, per-box error). Each phase runs until the combined box
//! count reaches its share of the target palette size.
//!
//! All box geometry is in RGB space; the perceptual Lab metric is reserved
//! for nearest-color searches elsewhere.

use log::debug;

use tilery_core::Color;

use crate::error::{QuantError, QuantResult};
use crate::histogram::Histogram;

/// Tuning knobs for [`quantize`].
#[derive(Debug, Clone)]
pub struct QuantizeOptions {
    /// Target palette size, 1-256.
    pub max_colors: u16,
    /// Fraction of the target assigned to each phase. Normalized before
    /// use; the default splits the work into equal quarters.
    pub phase_weights: [f32; 4],
}

impl Default for QuantizeOptions {
    fn default() -> Self {
        Self {
            max_colors: 256,
            phase_weights: [0.25; 4],
        }
    }
}

impl QuantizeOptions {
    /// Options for a given palette size with default phase weights.
    pub fn with_max_colors(max_colors: u16) -> Self {
        Self {
            max_colors,
            ..Self::default()
        }
    }

    fn validate(&self) -> QuantResult<()> {
        if self.max_colors == 0 || self.max_colors > 256 {
            return Err(QuantError::InvalidParameters(format!(
                "max_colors must be between 1 and 256, got {}",
                self.max_colors
            )));
        }
        if self.phase_weights.iter().any(|&w| w < 0.0 || !w.is_finite()) {
            return Err(QuantError::InvalidParameters(
                "phase weights must be finite and non-negative".to_string(),
            ));
        }
        if self.phase_weights.iter().sum::<f32>() <= 0.0 {
            return Err(QuantError::InvalidParameters(
                "phase weights must not all be zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Cumulative box-count targets per phase; the last is always the full
    /// palette size.
    fn targets(&self, k: usize) -> [usize; 4] {
        let sum: f32 = self.phase_weights.iter().sum();
        let mut targets = [0usize; 4];
        let mut cumulative = 0.0f32;
        for (i, &w) in self.phase_weights.iter().enumerate() {
            cumulative += w / sum;
            let t = (k as f32 * cumulative).round() as usize;
            targets[i] = t.max(if i > 0 { targets[i - 1] } else { 0 });
        }
        targets[3] = k;
        targets
    }
}

/// Result of a quantization run.
#[derive(Debug, Clone)]
pub struct QuantizeOutcome {
    /// Palette colors: box centroids in creation order, then removed
    /// singletons in removal order. When `reduced` is false, the exact
    /// distinct input colors in first-appearance order.
    pub colors: Vec<Color>,
    /// False when the input already had no more colors than requested and
    /// was passed through unreduced.
    pub reduced: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Volume,
    PopulationEdge,
    PopulationVolume,
    BoxError,
}

impl Phase {
    const ALL: [Phase; 4] = [
        Phase::Volume,
        Phase::PopulationEdge,
        Phase::PopulationVolume,
        Phase::BoxError,
    ];
}

#[derive(Debug, Clone)]
struct ColorBox {
    entries: Vec<(Color, u64)>,
    population: u64,
    min: [u8; 3],
    max: [u8; 3],
}

#[inline]
fn channel(c: Color, axis: usize) -> u8 {
    match axis {
        0 => c.r,
        1 => c.g,
        _ => c.b,
    }
}

impl ColorBox {
    fn new(entries: Vec<(Color, u64)>) -> Self {
        let mut min = [u8::MAX; 3];
        let mut max = [u8::MIN; 3];
        let mut population = 0u64;
        for &(c, count) in &entries {
            for axis in 0..3 {
                let v = channel(c, axis);
                min[axis] = min[axis].min(v);
                max[axis] = max[axis].max(v);
            }
            population += count;
        }
        Self {
            entries,
            population,
            min,
            max,
        }
    }

    #[inline]
    fn extent(&self, axis: usize) -> u64 {
        (self.max[axis] - self.min[axis]) as u64
    }

    fn longest_axis(&self) -> usize {
        let e = [self.extent(0), self.extent(1), self.extent(2)];
        if e[0] >= e[1] && e[0] >= e[2] {
            0
        } else if e[1] >= e[2] {
            1
        } else {
            2
        }
    }

    #[inline]
    fn longest_edge(&self) -> u64 {
        self.extent(self.longest_axis())
    }

    #[inline]
    fn volume(&self) -> u64 {
        self.extent(0) * self.extent(1) * self.extent(2)
    }

    /// Population-weighted mean per channel, unrounded.
    fn mean(&self) -> [f64; 3] {
        let mut sums = [0.0f64; 3];
        for &(c, count) in &self.entries {
            for axis in 0..3 {
                sums[axis] += channel(c, axis) as f64 * count as f64;
            }
        }
        let pop = self.population.max(1) as f64;
        [sums[0] / pop, sums[1] / pop, sums[2] / pop]
    }

    /// Total squared RGB error if the box collapsed to its mean.
    fn sum_sq_error(&self) -> f64 {
        let mean = self.mean();
        let mut error = 0.0f64;
        for &(c, count) in &self.entries {
            let mut d = 0.0f64;
            for axis in 0..3 {
                let delta = channel(c, axis) as f64 - mean[axis];
                d += delta * delta;
            }
            error += count as f64 * d;
        }
        error
    }

    fn centroid(&self) -> Color {
        let mean = self.mean();
        Color::new(
            mean[0].round() as u8,
            mean[1].round() as u8,
            mean[2].round() as u8,
        )
    }

    fn rank(&self, phase: Phase) -> f64 {
        match phase {
            Phase::Volume => self.volume() as f64,
            Phase::PopulationEdge => self.population as f64 * self.longest_edge() as f64,
            Phase::PopulationVolume => self.population as f64 * self.volume() as f64,
            Phase::BoxError => self.sum_sq_error(),
        }
    }

    /// Split at the median population along the longest axis. Requires at
    /// least two entries.
    fn split(mut self) -> (ColorBox, ColorBox) {
        let axis = self.longest_axis();
        self.entries
            .sort_by_key(|&(c, _)| (channel(c, axis), c));

        let half = self.population / 2;
        let mut accumulated = 0u64;
        let mut split_at = 1;
        for (i, &(_, count)) in self.entries.iter().enumerate() {
            accumulated += count;
            if accumulated >= half && i + 1 < self.entries.len() {
                split_at = i + 1;
                break;
            }
        }

        let right = self.entries.split_off(split_at);
        (ColorBox::new(self.entries), ColorBox::new(right))
    }
}

/// Index of the highest-ranked box; first wins on ties.
fn best_box(queue: &[ColorBox], phase: Phase) -> usize {
    let mut best = 0;
    let mut best_rank = queue[0].rank(phase);
    for (i, bx) in queue.iter().enumerate().skip(1) {
        let rank = bx.rank(phase);
        if rank > best_rank {
            best = i;
            best_rank = rank;
        }
    }
    best
}

/// Reduce a histogram to at most `options.max_colors` colors.
///
/// When the histogram already holds no more distinct colors than requested,
/// the exact color set comes back unchanged with `reduced: false`; callers
/// use the flag to decide whether a full-size palette still needs its
/// reserved slots.
///
/// # Errors
///
/// [`QuantError::EmptyHistogram`] on empty input,
/// [`QuantError::InvalidParameters`] for a bad target size or weights.
pub fn quantize(histogram: &Histogram, options: &QuantizeOptions) -> QuantResult<QuantizeOutcome> {
    options.validate()?;
    if histogram.is_empty() {
        return Err(QuantError::EmptyHistogram);
    }

    let k = options.max_colors as usize;
    if histogram.len() <= k {
        return Ok(QuantizeOutcome {
            colors: histogram.entries().iter().map(|&(c, _)| c).collect(),
            reduced: false,
        });
    }

    let targets = options.targets(k);
    let mut queue = vec![ColorBox::new(histogram.entries().to_vec())];
    // Single-color boxes are done: they leave the queue but still occupy a
    // palette slot, so they count toward the phase targets.
    let mut removed: Vec<Color> = Vec::new();

    for (phase, target) in Phase::ALL.into_iter().zip(targets) {
        while queue.len() + removed.len() < target {
            if queue.is_empty() {
                break;
            }
            let idx = best_box(&queue, phase);
            if queue[idx].entries.len() == 1 {
                let bx = queue.remove(idx);
                removed.push(bx.entries[0].0);
                continue;
            }
            let bx = queue.remove(idx);
            let (left, right) = bx.split();
            queue.push(left);
            queue.push(right);
        }
    }
    debug!(
        "median cut: {} distinct -> {} boxes + {} singletons",
        histogram.len(),
        queue.len(),
        removed.len()
    );

    let mut colors: Vec<Color> = queue.iter().map(ColorBox::centroid).collect();
    colors.extend(removed);
    Ok(QuantizeOutcome {
        colors,
        reduced: true,
    })
}

/// A built palette: final color order plus the reduction flag.
#[derive(Debug, Clone)]
pub struct PaletteBuild {
    /// Final palette colors. With no index offset, slot 0 is the
    /// designated transparent color.
    pub colors: Vec<Color>,
    /// See [`QuantizeOutcome::reduced`].
    pub reduced: bool,
}

/// Build a full palette from a histogram that still includes transparent
/// pixels.
///
/// The designated transparent color is stripped from quantization input.
/// Without an index offset it is re-inserted at slot 0 and content colors
/// get the remaining `max_colors - 1` slots; with an offset the hardware
/// slot 0 lies outside this palette, so all `max_colors` slots hold
/// content.
pub fn build_palette(
    histogram: &Histogram,
    transparent: Color,
    offset: u16,
    options: &QuantizeOptions,
) -> QuantResult<PaletteBuild> {
    options.validate()?;

    let mut content = histogram.clone();
    content.remove(transparent);

    let reserve_slot0 = offset == 0;
    let content_slots = if reserve_slot0 {
        options.max_colors as usize - 1
    } else {
        options.max_colors as usize
    };

    let mut colors = Vec::new();
    if reserve_slot0 {
        colors.push(transparent);
    }

    if content.is_empty() {
        return Ok(PaletteBuild {
            colors,
            reduced: false,
        });
    }
    if content_slots == 0 {
        // Target of one color with slot 0 reserved: everything falls into
        // the transparent slot.
        return Ok(PaletteBuild {
            colors,
            reduced: true,
        });
    }

    let outcome = quantize(
        &content,
        &QuantizeOptions {
            max_colors: content_slots as u16,
            phase_weights: options.phase_weights,
        },
    )?;
    colors.extend(outcome.colors);
    Ok(PaletteBuild {
        colors,
        reduced: outcome.reduced,
    })
}

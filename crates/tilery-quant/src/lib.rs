//! Color quantization for tilery
//!
//! This crate reduces true-color frames to hardware palettes:
//!
//! - **Histograms**: distinct-color counting over one or more frames
//! - **Median cut**: four-phase weighted box subdivision down to a color
//!   budget, preserving isolated colors in a removed list
//! - **Palette assembly**: transparent-slot handling around the quantizer
//! - **Remapping**: nearest-color index mapping with optional
//!   Hilbert-curve error diffusion
//!
//! Frame and palette types come from `tilery-core`; this crate only adds
//! the reduction and remapping passes over them.

pub mod dither;
pub mod error;
pub mod histogram;
pub mod median_cut;

// Types
pub use dither::RemapOptions;
pub use error::{QuantError, QuantResult};
pub use histogram::Histogram;
pub use median_cut::{PaletteBuild, QuantizeOptions, QuantizeOutcome};

// Functions
pub use dither::{hilbert_level, remap_raster};
pub use median_cut::{build_palette, quantize};

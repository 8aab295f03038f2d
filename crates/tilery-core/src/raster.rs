//! Pixel buffers
//!
//! [`Raster`] is the decoded RGBA input frame every pipeline consumes;
//! [`IndexRaster`] is its quantized counterpart holding palette indices.
//! Both are plain owned values with row-major storage. Sharing across
//! entities happens through handles at the pipeline level, never through
//! shared pointers inside these types.

use crate::color::{Color, Color16};
use crate::error::{Error, Result};

/// Row-major RGBA pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl Raster {
    /// Create a raster filled with transparent black.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDimension`] when either dimension is 0.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        Ok(Self {
            width,
            height,
            pixels: vec![Color::with_alpha(0, 0, 0, 0); (width * height) as usize],
        })
    }

    /// Wrap an existing pixel buffer.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDimension`] on a zero dimension,
    /// [`Error::PixelCountMismatch`] when the buffer length is not
    /// `width * height`.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Color>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        let expected = (width * height) as usize;
        if pixels.len() != expected {
            return Err(Error::PixelCountMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel at `(x, y)`, or `None` outside the canvas.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        if x < self.width && y < self.height {
            Some(self.pixels[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// Set the pixel at `(x, y)`.
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfBounds`] outside the canvas.
    pub fn set(&mut self, x: u32, y: u32, color: Color) -> Result<()> {
        if x >= self.width || y >= self.height {
            return Err(Error::IndexOutOfBounds {
                index: (y.saturating_mul(self.width).saturating_add(x)) as usize,
                len: self.pixels.len(),
            });
        }
        self.pixels[(y * self.width + x) as usize] = color;
        Ok(())
    }

    /// All pixels in row-major order.
    #[inline]
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Mutable access to the pixel buffer.
    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.pixels
    }

    /// Hardware-truncate every pixel, row-major.
    pub fn to_color16(&self) -> Vec<Color16> {
        self.pixels.iter().map(|&c| Color16::from_color(c)).collect()
    }
}

/// Row-major palette-index buffer, the quantized form of a [`Raster`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRaster {
    width: u32,
    height: u32,
    indices: Vec<u8>,
}

impl IndexRaster {
    /// Create an index raster filled with index 0.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDimension`] when either dimension is 0.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        Ok(Self {
            width,
            height,
            indices: vec![0; (width * height) as usize],
        })
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Index at `(x, y)`, or `None` outside the canvas.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x < self.width && y < self.height {
            Some(self.indices[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// Set the index at `(x, y)`.
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfBounds`] outside the canvas.
    pub fn set(&mut self, x: u32, y: u32, index: u8) -> Result<()> {
        if x >= self.width || y >= self.height {
            return Err(Error::IndexOutOfBounds {
                index: (y.saturating_mul(self.width).saturating_add(x)) as usize,
                len: self.indices.len(),
            });
        }
        self.indices[(y * self.width + x) as usize] = index;
        Ok(())
    }

    /// All indices in row-major order.
    #[inline]
    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    /// Mutable access to the index buffer.
    #[inline]
    pub fn indices_mut(&mut self) -> &mut [u8] {
        &mut self.indices
    }
}

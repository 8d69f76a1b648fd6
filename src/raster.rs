//! An owned single-channel 8-bit layer image.

use crate::{Error, Result};

/// A row-major buffer of brightness samples, 0 is black and 255 is white.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

/// Returns the number of pixels in a 'width' x 'height' image, or an error if
/// the dimensions are empty or do not fit in memory.
pub fn pixel_count(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidParameter(format!(
            "raster dimensions must be positive, got {}x{}",
            width, height
        )));
    }
    (width as usize).checked_mul(height as usize).ok_or_else(|| {
        Error::InvalidParameter(format!("raster {}x{} is too large", width, height))
    })
}

impl Raster {
    /// Creates a black raster.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::filled(width, height, 0)
    }

    /// Creates a raster where every pixel is 'value'.
    pub fn filled(width: u32, height: u32, value: u8) -> Result<Self> {
        let len = pixel_count(width, height)?;
        Ok(Self {
            width,
            height,
            pixels: vec![value; len],
        })
    }

    /// Wraps an existing pixel buffer. The buffer must hold exactly
    /// 'width' x 'height' samples.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let len = pixel_count(width, height)?;
        if pixels.len() != len {
            return Err(Error::InvalidParameter(format!(
                "expected {} pixels for a {}x{} raster, got {}",
                len,
                width,
                height,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Returns a copy of the raster with 'f' applied to every pixel.
    pub fn map<F: Fn(u8) -> u8>(&self, f: F) -> Raster {
        Raster {
            width: self.width,
            height: self.height,
            pixels: self.pixels.iter().map(|p| f(*p)).collect(),
        }
    }
}

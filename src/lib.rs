pub mod bench;
pub mod error;
pub mod raster;
pub mod rle;
pub mod runs;
pub mod utils;

pub use error::{Error, Result};
pub use raster::Raster;
pub use rle::Format;

/// The anti-aliasing levels that the 1-bit layer format supports.
pub const ANTI_ALIASING_LEVELS: [u8; 4] = [1, 2, 4, 8];

/// Stores the format-specific encoding parameters.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Context {
    /// Number of 1-bit planes that make up an anti-aliased layer.
    anti_aliasing: u8,
    /// The plane that the 1-bit encoder thresholds against.
    plane: u8,
}

impl Context {
    pub fn new(anti_aliasing: u8, plane: u8) -> Result<Self> {
        if !ANTI_ALIASING_LEVELS.contains(&anti_aliasing) {
            return Err(Error::InvalidParameter(format!(
                "unsupported anti-aliasing level {}",
                anti_aliasing
            )));
        }
        if plane >= anti_aliasing {
            return Err(Error::InvalidParameter(format!(
                "plane {} is out of range for {} anti-aliasing planes",
                plane, anti_aliasing
            )));
        }
        Ok(Self {
            anti_aliasing,
            plane,
        })
    }

    pub fn anti_aliasing(&self) -> u8 {
        self.anti_aliasing
    }

    pub fn plane(&self) -> u8 {
        self.plane
    }

    /// Returns the brightness at which a pixel counts as "on" in the current
    /// plane. The value wraps, so plane zero always thresholds at 255.
    pub fn threshold(&self) -> u8 {
        let step = 256 / self.anti_aliasing as u16;
        (step * self.plane as u16).wrapping_sub(1) as u8
    }
}

impl Default for Context {
    fn default() -> Self {
        Self {
            anti_aliasing: 1,
            plane: 0,
        }
    }
}

/// A trait that defines the interface for encoding layer images.
pub trait Encoder<'a> {
    /// Creates a new Encoder that reads pixels from 'input' and writes into
    /// 'output', with the encoder context 'ctx'.
    fn new(input: &'a [u8], output: &'a mut Vec<u8>, ctx: Context) -> Self;

    /// Encode the whole input buffer and return the number of bytes that were
    /// written into the output stream.
    fn encode(&mut self) -> Result<usize>;
}

/// A trait that defines the interface for decoding layer images.
pub trait Decoder<'a> {
    /// Creates a new Decoder that reads from 'input' and fills the pixel
    /// buffer 'output'. The buffer length is the expected pixel count.
    fn new(input: &'a [u8], output: &'a mut [u8]) -> Self;

    /// Try to decode the buffer 'input', and return the number of input bytes
    /// that were consumed followed by the number of pixels written.
    fn decode(&mut self) -> Result<(usize, usize)>;
}

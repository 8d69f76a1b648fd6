//! The layer image run-length codecs.

pub mod rle1;
pub mod rle4;
pub mod rle7;

use crate::{Context, Error, Raster, Result};
use std::fmt;
use std::str::FromStr;

/// Identifies one of the layer image encodings.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    /// 1-bit toggle RLE (CBDDLP bit planes).
    Rle1,
    /// 7-bit grey RLE with variable length runs (CTB).
    Rle7,
    /// 4-bit nibble RLE (PW0).
    Rle4,
}

impl Format {
    pub const ALL: [Format; 3] = [Format::Rle1, Format::Rle7, Format::Rle4];

    /// Number of brightness bits that survive the encoding.
    pub fn bits(&self) -> u8 {
        match self {
            Format::Rle1 => 1,
            Format::Rle7 => 7,
            Format::Rle4 => 4,
        }
    }

    /// Returns the brightness that decoding an encoded 'pixel' yields, using
    /// the default context.
    pub fn quantize(&self, pixel: u8) -> u8 {
        match self {
            Format::Rle1 => rle1::quantize(pixel, Context::default().threshold()),
            Format::Rle7 => rle7::quantize(pixel),
            Format::Rle4 => rle4::quantize(pixel),
        }
    }

    pub fn encode(&self, raster: &Raster, ctx: Context) -> Result<Vec<u8>> {
        match self {
            Format::Rle1 => rle1::encode(raster, ctx),
            Format::Rle7 => rle7::encode(raster),
            Format::Rle4 => rle4::encode(raster),
        }
    }

    pub fn decode(&self, stream: &[u8], width: u32, height: u32) -> Result<Raster> {
        match self {
            Format::Rle1 => rle1::decode(stream, width, height),
            Format::Rle7 => rle7::decode(stream, width, height),
            Format::Rle4 => rle4::decode(stream, width, height),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Rle1 => "rle1",
            Format::Rle7 => "rle7",
            Format::Rle4 => "rle4",
        };
        f.write_str(name)
    }
}

impl FromStr for Format {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "rle1" | "cbddlp" => Ok(Format::Rle1),
            "rle7" | "ctb" => Ok(Format::Rle7),
            "rle4" | "pw0" => Ok(Format::Rle4),
            _ => Err(Error::InvalidParameter(format!("Invalid format: {}", s))),
        }
    }
}

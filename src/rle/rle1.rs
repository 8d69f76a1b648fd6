//! The 1-bit toggle RLE used by CBDDLP and Photon bit planes.
//!
//! Every record is a single byte. The low 7 bits hold the run length and the
//! high bit holds the pixel state (1 is on):
//!
//! ```text
//!   MSB      LSB
//!    SLLL LLLL
//! ```
//!
//! The encoder cuts runs at 125 pixels. An anti-aliased layer is stored as
//! one stream per plane; each plane thresholds the image at a different
//! brightness and the decoder counts how many planes are on.

use crate::runs::{Run, RunWriter, Runs};
use crate::{Context, Decoder, Encoder, Error, Raster, Result, ANTI_ALIASING_LEVELS};

/// The longest run a single record holds.
pub const RUN_LIMIT: usize = 0x7D;

const STATE_BIT: u8 = 0x80;
const LENGTH_MASK: u8 = 0x7F;

fn run_limit(_value: u8) -> usize {
    RUN_LIMIT
}

/// Returns the brightness that a pixel decodes to after thresholding it at
/// 'threshold'.
pub fn quantize(pixel: u8, threshold: u8) -> u8 {
    if pixel >= threshold {
        255
    } else {
        0
    }
}

fn encode_record(run: Run) -> u8 {
    debug_assert!(run.length > 0 && run.length <= RUN_LIMIT);
    let state = if run.value != 0 { STATE_BIT } else { 0 };
    run.length as u8 | state
}

pub struct ToggleEncoder<'a> {
    /// The layer pixels.
    input: &'a [u8],
    /// The output stream.
    output: &'a mut Vec<u8>,
    /// Pixels at or above this brightness are on.
    threshold: u8,
}

impl<'a> ToggleEncoder<'a> {
    fn encode_impl(&mut self) -> usize {
        let threshold = self.threshold;
        let runs = Runs::new(self.input, move |p| (p >= threshold) as u8)
            .with_limit(run_limit);
        let start = self.output.len();
        self.output.extend(runs.map(encode_record));
        self.output.len() - start
    }
}

impl<'a> Encoder<'a> for ToggleEncoder<'a> {
    fn new(input: &'a [u8], output: &'a mut Vec<u8>, ctx: Context) -> Self {
        ToggleEncoder {
            input,
            output,
            threshold: ctx.threshold(),
        }
    }

    fn encode(&mut self) -> Result<usize> {
        Ok(self.encode_impl())
    }
}

pub struct ToggleDecoder<'a> {
    /// The encoded stream.
    input: &'a [u8],
    /// The pixels of the layer.
    output: &'a mut [u8],
}

impl<'a> ToggleDecoder<'a> {
    fn decode_impl(&mut self) -> Result<(usize, usize)> {
        let mut writer = RunWriter::new(self.output);
        let mut pos = 0;

        while !writer.is_full() {
            let byte = match self.input.get(pos) {
                Some(byte) => *byte,
                None => return Err(writer.truncated()),
            };
            let length = (byte & LENGTH_MASK) as usize;
            if length == 0 {
                return Err(Error::CorruptRecord { offset: pos });
            }
            let value = if byte & STATE_BIT != 0 { 255 } else { 0 };
            writer.put(value, length, pos)?;
            pos += 1;
        }

        writer.finish_stream(pos, self.input.len())
    }
}

impl<'a> Decoder<'a> for ToggleDecoder<'a> {
    fn new(input: &'a [u8], output: &'a mut [u8]) -> Self {
        ToggleDecoder { input, output }
    }

    fn decode(&mut self) -> Result<(usize, usize)> {
        self.decode_impl()
    }
}

/// Encodes a single plane of 'raster'.
pub fn encode(raster: &Raster, ctx: Context) -> Result<Vec<u8>> {
    let mut stream = Vec::new();
    ToggleEncoder::new(raster.pixels(), &mut stream, ctx).encode()?;
    Ok(stream)
}

/// Decodes a single plane into a raster of black (0) and white (255) pixels.
pub fn decode(stream: &[u8], width: u32, height: u32) -> Result<Raster> {
    let mut raster = Raster::new(width, height)?;
    ToggleDecoder::new(stream, raster.pixels_mut()).decode()?;
    Ok(raster)
}

/// Encodes every plane of an anti-aliased layer, plane zero first.
pub fn encode_planes(raster: &Raster, anti_aliasing: u8) -> Result<Vec<Vec<u8>>> {
    Context::new(anti_aliasing, 0)?;
    (0..anti_aliasing)
        .map(|plane| encode(raster, Context::new(anti_aliasing, plane)?))
        .collect()
}

/// Decodes the planes of an anti-aliased layer. The number of planes is the
/// anti-aliasing level. A pixel that is on in 'k' planes decodes to
/// k * (256 / planes) - 1, or 0 when no plane is on.
pub fn decode_planes<S: AsRef<[u8]>>(planes: &[S], width: u32, height: u32) -> Result<Raster> {
    let anti_aliasing = u8::try_from(planes.len())
        .ok()
        .filter(|level| ANTI_ALIASING_LEVELS.contains(level))
        .ok_or_else(|| {
            Error::InvalidParameter(format!(
                "unsupported anti-aliasing level {}",
                planes.len()
            ))
        })?;

    let mut raster = Raster::new(width, height)?;
    let mut scratch = vec![0; raster.pixel_count()];
    for plane in planes {
        ToggleDecoder::new(plane.as_ref(), &mut scratch).decode()?;
        for (count, pixel) in raster.pixels_mut().iter_mut().zip(&scratch) {
            *count += (*pixel != 0) as u8;
        }
    }

    let step = 256 / anti_aliasing as u16;
    for pixel in raster.pixels_mut() {
        *pixel = (*pixel as u16 * step).saturating_sub(1) as u8;
    }
    Ok(raster)
}

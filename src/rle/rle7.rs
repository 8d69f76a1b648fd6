//! The 7-bit grey RLE used by CTB layers.
//!
//! A record starts with a colour byte holding the 7-bit grey value. When the
//! high bit of the colour byte is set, a big-endian run length follows whose
//! leading bits select its size:
//!
//! ```text
//!   0LLL LLLL                                  2 ..= 0x7F
//!   10LL LLLL LLLL LLLL                     0x80 ..= 0x3FFF
//!   110L LLLL LLLL LLLL LLLL LLLL         0x4000 ..= 0x1F_FFFF
//!   1110 LLLL LLLL LLLL LLLL LLLL LLLL  0x20_0000 ..= 0xFFF_FFFF
//! ```
//!
//! A colour byte without the high bit is a single pixel.

use crate::runs::{RunWriter, Runs};
use crate::utils::crypt::LayerCipher;
use crate::{Context, Decoder, Encoder, Error, Raster, Result};

/// The longest run the format can represent.
pub const MAX_RUN: usize = 0xFFF_FFFF;

const RUN_BIT: u8 = 0x80;
const COLOR_MASK: u8 = 0x7F;

/// Returns the brightness that a pixel decodes to.
pub fn quantize(pixel: u8) -> u8 {
    (pixel >> 1) << 1
}

/// Writes the record for 'stride' pixels of the 7-bit 'color' into 'stream'
/// and returns the number of bytes written. Nothing is written when the
/// stride is empty or too long for the format.
pub fn encode_run(color: u8, stride: usize, stream: &mut Vec<u8>) -> Result<usize> {
    debug_assert!(color <= COLOR_MASK);
    let color = color & COLOR_MASK;
    match stride {
        0 => Ok(0),
        1 => {
            stream.push(color);
            Ok(1)
        }
        2..=0x7F => {
            stream.extend([color | RUN_BIT, stride as u8]);
            Ok(2)
        }
        0x80..=0x3FFF => {
            stream.extend([color | RUN_BIT, (stride >> 8) as u8 | 0x80, stride as u8]);
            Ok(3)
        }
        0x4000..=0x1F_FFFF => {
            stream.extend([
                color | RUN_BIT,
                (stride >> 16) as u8 | 0xC0,
                (stride >> 8) as u8,
                stride as u8,
            ]);
            Ok(4)
        }
        0x20_0000..=MAX_RUN => {
            stream.extend([
                color | RUN_BIT,
                (stride >> 24) as u8 | 0xE0,
                (stride >> 16) as u8,
                (stride >> 8) as u8,
                stride as u8,
            ]);
            Ok(5)
        }
        _ => Err(Error::UnsupportedRunLength {
            run: stride,
            max: MAX_RUN,
        }),
    }
}

/// Parses the run length that starts at 'pos'. Returns the length and the
/// number of bytes it occupies, or None if the stream ends inside it.
fn decode_stride(input: &[u8], pos: usize) -> Option<Result<(usize, usize)>> {
    let lead = *input.get(pos)?;
    let (size, high) = if lead & 0x80 == 0 {
        (1, lead)
    } else if lead & 0xC0 == 0x80 {
        (2, lead & 0x3F)
    } else if lead & 0xE0 == 0xC0 {
        (3, lead & 0x1F)
    } else if lead & 0xF0 == 0xE0 {
        (4, lead & 0x0F)
    } else {
        return Some(Err(Error::CorruptRecord { offset: pos }));
    };

    let tail = input.get(pos + 1..pos + size)?;
    let stride = tail
        .iter()
        .fold(high as usize, |acc, byte| (acc << 8) | *byte as usize);
    Some(Ok((stride, size)))
}

pub struct GreyEncoder<'a> {
    /// The layer pixels.
    input: &'a [u8],
    /// The output stream.
    output: &'a mut Vec<u8>,
}

impl<'a> GreyEncoder<'a> {
    fn encode_impl(&mut self) -> Result<usize> {
        let start = self.output.len();
        for run in Runs::new(self.input, |p| p >> 1) {
            if let Err(err) = encode_run(run.value, run.length, self.output) {
                // Drop the records of the failed layer.
                self.output.truncate(start);
                return Err(err);
            }
        }
        Ok(self.output.len() - start)
    }
}

impl<'a> Encoder<'a> for GreyEncoder<'a> {
    fn new(input: &'a [u8], output: &'a mut Vec<u8>, _ctx: Context) -> Self {
        GreyEncoder { input, output }
    }

    fn encode(&mut self) -> Result<usize> {
        self.encode_impl()
    }
}

pub struct GreyDecoder<'a> {
    /// The encoded stream.
    input: &'a [u8],
    /// The pixels of the layer.
    output: &'a mut [u8],
}

impl<'a> GreyDecoder<'a> {
    fn decode_impl(&mut self) -> Result<(usize, usize)> {
        let mut writer = RunWriter::new(self.output);
        let mut pos = 0;

        while !writer.is_full() {
            let record = pos;
            let code = match self.input.get(pos) {
                Some(code) => *code,
                None => return Err(writer.truncated()),
            };
            pos += 1;

            let mut stride = 1;
            if code & RUN_BIT != 0 {
                let (length, size) = match decode_stride(self.input, pos) {
                    Some(parsed) => parsed?,
                    None => return Err(writer.truncated()),
                };
                if length == 0 {
                    return Err(Error::CorruptRecord { offset: record });
                }
                stride = length;
                pos += size;
            }

            writer.put((code & COLOR_MASK) << 1, stride, record)?;
        }

        writer.finish_stream(pos, self.input.len())
    }
}

impl<'a> Decoder<'a> for GreyDecoder<'a> {
    fn new(input: &'a [u8], output: &'a mut [u8]) -> Self {
        GreyDecoder { input, output }
    }

    fn decode(&mut self) -> Result<(usize, usize)> {
        self.decode_impl()
    }
}

pub fn encode(raster: &Raster) -> Result<Vec<u8>> {
    let mut stream = Vec::new();
    GreyEncoder::new(raster.pixels(), &mut stream, Context::default()).encode()?;
    Ok(stream)
}

pub fn decode(stream: &[u8], width: u32, height: u32) -> Result<Raster> {
    let mut raster = Raster::new(width, height)?;
    GreyDecoder::new(stream, raster.pixels_mut()).decode()?;
    Ok(raster)
}

/// Encodes the layer with index 'layer' and encrypts the stream with the
/// file key 'seed'. A zero seed leaves the stream in the clear.
pub fn encode_encrypted(raster: &Raster, seed: u32, layer: u32) -> Result<Vec<u8>> {
    let mut stream = encode(raster)?;
    LayerCipher::new(seed).apply(layer, &mut stream);
    Ok(stream)
}

/// Decrypts and decodes a stream written by 'encode_encrypted'.
pub fn decode_encrypted(
    stream: &[u8],
    seed: u32,
    layer: u32,
    width: u32,
    height: u32,
) -> Result<Raster> {
    let mut clear = stream.to_vec();
    LayerCipher::new(seed).apply(layer, &mut clear);
    decode(&clear, width, height)
}

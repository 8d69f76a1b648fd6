//! The 4-bit nibble RLE used by PW0 layers.
//!
//! The top nibble of a record is the colour. Black (0) and white (15) runs
//! dominate layer images, so they get a 12-bit length in a 2-byte record. The
//! other colours fit colour and a 4-bit length in a single byte:
//!
//! ```text
//!   CCCC LLLL LLLL LLLL    colour 0 or 15, 1 ..= 4095 pixels
//!   CCCC LLLL              colour 1 ..= 14, 1 ..= 15 pixels
//! ```

use crate::runs::{Run, RunWriter, Runs};
use crate::utils::checksum::crc16;
use crate::{Context, Decoder, Encoder, Error, Raster, Result};

/// The longest run of black or white in a single record.
pub const EXTREME_RUN_LIMIT: usize = 0xFFF;
/// The longest run of the other colours in a single record.
pub const RUN_LIMIT: usize = 0xF;

fn is_extreme(color: u8) -> bool {
    color == 0 || color == 0xF
}

fn run_limit(color: u8) -> usize {
    if is_extreme(color) {
        EXTREME_RUN_LIMIT
    } else {
        RUN_LIMIT
    }
}

/// Returns the brightness that a pixel decodes to.
pub fn quantize(pixel: u8) -> u8 {
    pixel & 0xF0
}

fn encode_record(run: Run, stream: &mut Vec<u8>) -> usize {
    debug_assert!(run.length > 0 && run.length <= run_limit(run.value));
    if is_extreme(run.value) {
        let record = run.length as u16 | (run.value as u16) << 12;
        stream.extend(record.to_be_bytes());
        2
    } else {
        stream.push(run.length as u8 | run.value << 4);
        1
    }
}

pub struct NibbleEncoder<'a> {
    /// The layer pixels.
    input: &'a [u8],
    /// The output stream.
    output: &'a mut Vec<u8>,
}

impl<'a> NibbleEncoder<'a> {
    fn encode_impl(&mut self) -> usize {
        let mut written = 0;
        for run in Runs::new(self.input, |p| p >> 4).with_limit(run_limit) {
            written += encode_record(run, self.output);
        }
        written
    }
}

impl<'a> Encoder<'a> for NibbleEncoder<'a> {
    fn new(input: &'a [u8], output: &'a mut Vec<u8>, _ctx: Context) -> Self {
        NibbleEncoder { input, output }
    }

    fn encode(&mut self) -> Result<usize> {
        Ok(self.encode_impl())
    }
}

pub struct NibbleDecoder<'a> {
    /// The encoded stream.
    input: &'a [u8],
    /// The pixels of the layer.
    output: &'a mut [u8],
}

impl<'a> NibbleDecoder<'a> {
    fn decode_impl(&mut self) -> Result<(usize, usize)> {
        let mut writer = RunWriter::new(self.output);
        let mut pos = 0;

        while !writer.is_full() {
            let code = match self.input.get(pos) {
                Some(code) => *code,
                None => return Err(writer.truncated()),
            };
            let color = code >> 4;

            let (length, size) = if is_extreme(color) {
                match self.input.get(pos + 1) {
                    Some(low) => ((((code & 0xF) as usize) << 8) | *low as usize, 2),
                    None => return Err(writer.truncated()),
                }
            } else {
                ((code & 0xF) as usize, 1)
            };
            if length == 0 {
                return Err(Error::CorruptRecord { offset: pos });
            }

            writer.put(color << 4, length, pos)?;
            pos += size;
        }

        writer.finish_stream(pos, self.input.len())
    }
}

impl<'a> Decoder<'a> for NibbleDecoder<'a> {
    fn new(input: &'a [u8], output: &'a mut [u8]) -> Self {
        NibbleDecoder { input, output }
    }

    fn decode(&mut self) -> Result<(usize, usize)> {
        self.decode_impl()
    }
}

pub fn encode(raster: &Raster) -> Result<Vec<u8>> {
    let mut stream = Vec::new();
    NibbleEncoder::new(raster.pixels(), &mut stream, Context::default()).encode()?;
    Ok(stream)
}

pub fn decode(stream: &[u8], width: u32, height: u32) -> Result<Raster> {
    let mut raster = Raster::new(width, height)?;
    NibbleDecoder::new(stream, raster.pixels_mut()).decode()?;
    Ok(raster)
}

/// Encodes the layer and appends the big-endian CRC-16 of the stream, the
/// way Photon Workshop files store layer data.
pub fn encode_with_crc(raster: &Raster) -> Result<Vec<u8>> {
    let mut stream = encode(raster)?;
    let crc = crc16(&stream);
    stream.extend(crc.to_be_bytes());
    Ok(stream)
}

/// Checks the trailing CRC-16 of a stream written by 'encode_with_crc' and
/// decodes the layer.
pub fn decode_with_crc(stream: &[u8], width: u32, height: u32) -> Result<Raster> {
    if stream.len() < 2 {
        return Err(Error::TruncatedStream {
            decoded: 0,
            expected: crate::raster::pixel_count(width, height)?,
        });
    }
    let (data, tail) = stream.split_at(stream.len() - 2);
    let stored = u16::from_be_bytes([tail[0], tail[1]]);
    let actual = crc16(data);
    if stored != actual {
        log::debug!("layer crc {:04x} does not match {:04x}", actual, stored);
        return Err(Error::ChecksumMismatch { stored, actual });
    }
    decode(data, width, height)
}

//! Run accumulation shared by the layer codecs. The encoders scan pixels with
//! 'Runs' and the decoders replay records into a pixel buffer with
//! 'RunWriter'.

use crate::{Error, Result};

/// A sequence of consecutive pixels that share the same quantized value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Run {
    pub value: u8,
    pub length: usize,
}

/// A run limit that never cuts a run.
pub fn unbounded(_value: u8) -> usize {
    usize::MAX
}

/// Iterates over the runs of quantized pixel values in 'input'. Runs are cut
/// when they reach the limit that 'limit' returns for their value, so a long
/// run comes out as several runs of the same value. Runs are never empty.
pub struct Runs<'a, Q> {
    input: &'a [u8],
    quantize: Q,
    limit: fn(u8) -> usize,
    pos: usize,
}

impl<'a, Q: Fn(u8) -> u8> Runs<'a, Q> {
    pub fn new(input: &'a [u8], quantize: Q) -> Self {
        Self {
            input,
            quantize,
            limit: unbounded,
            pos: 0,
        }
    }

    /// Sets the maximum run length for each quantized value.
    pub fn with_limit(mut self, limit: fn(u8) -> usize) -> Self {
        self.limit = limit;
        self
    }
}

impl<'a, Q: Fn(u8) -> u8> Iterator for Runs<'a, Q> {
    type Item = Run;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.pos;
        if start >= self.input.len() {
            return None;
        }

        let value = (self.quantize)(self.input[start]);
        let cap = (self.limit)(value).max(1);
        let mut end = start + 1;
        while end < self.input.len()
            && end - start < cap
            && (self.quantize)(self.input[end]) == value
        {
            end += 1;
        }

        self.pos = end;
        Some(Run {
            value,
            length: end - start,
        })
    }
}

/// Fills a pixel buffer run after run and reports overruns and truncated
/// streams.
pub struct RunWriter<'a> {
    output: &'a mut [u8],
    pos: usize,
}

impl<'a> RunWriter<'a> {
    pub fn new(output: &'a mut [u8]) -> Self {
        Self { output, pos: 0 }
    }

    /// Returns the number of pixels written so far.
    pub fn written(&self) -> usize {
        self.pos
    }

    /// Returns the total number of pixels in the buffer.
    pub fn expected(&self) -> usize {
        self.output.len()
    }

    pub fn is_full(&self) -> bool {
        self.pos == self.output.len()
    }

    /// Writes 'length' pixels of 'value'. The record that produced the run
    /// starts at byte 'offset' of the stream.
    pub fn put(&mut self, value: u8, length: usize, offset: usize) -> Result<()> {
        let end = match self.pos.checked_add(length) {
            Some(end) if end <= self.output.len() => end,
            _ => {
                log::debug!(
                    "run of {} pixels at pixel {} overruns the raster",
                    length,
                    self.pos
                );
                return Err(Error::Overrun {
                    offset,
                    expected: self.output.len(),
                });
            }
        };
        self.output[self.pos..end].fill(value);
        self.pos = end;
        Ok(())
    }

    /// Returns the error for a stream that ended before the buffer was full.
    pub fn truncated(&self) -> Error {
        log::debug!(
            "stream ended after {} of {} pixels",
            self.pos,
            self.output.len()
        );
        Error::TruncatedStream {
            decoded: self.pos,
            expected: self.output.len(),
        }
    }

    /// Checks that every pixel was written and returns the pixel count.
    pub fn finish(self) -> Result<usize> {
        if !self.is_full() {
            return Err(self.truncated());
        }
        Ok(self.pos)
    }

    /// Finishes decoding a stream of 'input_len' bytes after 'consumed' bytes
    /// were parsed. Bytes left over once the raster is full are records that
    /// would overrun it. Returns (bytes consumed, pixels written).
    pub fn finish_stream(self, consumed: usize, input_len: usize) -> Result<(usize, usize)> {
        if self.is_full() && consumed < input_len {
            log::debug!("{} trailing bytes after a full raster", input_len - consumed);
            return Err(Error::Overrun {
                offset: consumed,
                expected: self.output.len(),
            });
        }
        let written = self.finish()?;
        Ok((consumed, written))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runs_are_maximal() {
        let input = [99, 99, 99, 103, 104, 104, 79, 79, 79];
        let runs: Vec<(u8, usize)> = Runs::new(&input, |x| x)
            .map(|r| (r.value, r.length))
            .collect();
        assert_eq!(runs, vec![(99, 3), (103, 1), (104, 2), (79, 3)]);
    }

    #[test]
    fn test_runs_quantize_and_limit() {
        let input = [0, 1, 2, 3, 4, 5, 255];
        let runs: Vec<(u8, usize)> = Runs::new(&input, |x| x >> 4)
            .with_limit(|_| 4)
            .map(|r| (r.value, r.length))
            .collect();
        assert_eq!(runs, vec![(0, 4), (0, 2), (15, 1)]);
    }

    #[test]
    fn test_runs_empty() {
        assert_eq!(Runs::new(&[], |x| x).count(), 0);
    }

    #[test]
    fn test_run_writer_bounds() {
        let mut buffer = [0u8; 5];
        let mut writer = RunWriter::new(&mut buffer);
        writer.put(7, 3, 0).unwrap();
        assert!(!writer.is_full());
        assert!(matches!(
            writer.put(7, 3, 1),
            Err(Error::Overrun {
                offset: 1,
                expected: 5
            })
        ));
        writer.put(9, 2, 2).unwrap();
        assert_eq!(writer.finish().unwrap(), 5);
        assert_eq!(buffer, [7, 7, 7, 9, 9]);
    }

    #[test]
    fn test_run_writer_truncated() {
        let mut buffer = [0u8; 4];
        let mut writer = RunWriter::new(&mut buffer);
        writer.put(1, 1, 0).unwrap();
        assert!(matches!(
            writer.finish(),
            Err(Error::TruncatedStream {
                decoded: 1,
                expected: 4
            })
        ));
    }
}

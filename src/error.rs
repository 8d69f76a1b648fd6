use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Stream ended after {decoded} of {expected} pixels")]
    TruncatedStream { decoded: usize, expected: usize },

    #[error("Record at byte {offset} runs past the end of a {expected} pixel raster")]
    Overrun { offset: usize, expected: usize },

    #[error("Run of {run} pixels exceeds the format limit of {max}")]
    UnsupportedRunLength { run: usize, max: usize },

    #[error("Corrupted RLE record at byte {offset}")]
    CorruptRecord { offset: usize },

    #[error("Checksum mismatch: stored {stored:#06x}, computed {actual:#06x}")]
    ChecksumMismatch { stored: u16, actual: u16 },

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, Error>;

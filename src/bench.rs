//! Measures encoder throughput by repeatedly encoding random layer images,
//! first on a single thread and then on a thread pool. The result is reported
//! in runs per second (TDPS).

use crate::{Context, Format, Raster, Result};
use rand::Rng;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Number of encodes in the single-threaded pass.
pub const SINGLE_THREAD_TESTS: usize = 100;
/// Number of encodes in the multi-threaded pass.
pub const MULTI_THREAD_TESTS: usize = 1000;
pub const RUNS_ABBREVIATION: &str = "TDPS";

/// A flag shared with the benchmark that asks it to stop. The flag is checked
/// between encodes, never inside one.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Describes one benchmark: which encoder runs on what image size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BenchmarkTest {
    pub name: String,
    pub format: Format,
    pub width: u32,
    pub height: u32,
}

impl BenchmarkTest {
    pub fn new(name: &str, format: Format, width: u32, height: u32) -> Self {
        Self {
            name: name.to_string(),
            format,
            width,
            height,
        }
    }

    /// The 4K and 8K random image encodes for every format.
    pub fn presets() -> Vec<BenchmarkTest> {
        let mut tests = Vec::new();
        for format in Format::ALL {
            for (label, width, height) in [("4k", 3840, 2160), ("8k", 7680, 4320)] {
                let name = format!("{}-{}", label, format);
                tests.push(BenchmarkTest::new(&name, format, width, height));
            }
        }
        tests
    }

    /// Finds a preset by name, e.g. "4k-rle7".
    pub fn preset(name: &str) -> Option<BenchmarkTest> {
        Self::presets().into_iter().find(|t| t.name == name)
    }
}

/// Fills a 'width' x 'height' raster with uniformly random pixels.
pub fn random_raster<R: Rng>(rng: &mut R, width: u32, height: u32) -> Result<Raster> {
    let mut raster = Raster::new(width, height)?;
    rng.fill(raster.pixels_mut());
    Ok(raster)
}

/// The outcome of a completed benchmark pass.
#[derive(Copy, Clone, Debug)]
pub struct BenchmarkResult {
    pub runs: usize,
    pub elapsed: Duration,
}

impl BenchmarkResult {
    pub fn runs_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.runs as f64 / secs
        } else {
            0.0
        }
    }
}

pub struct Benchmark {
    test: BenchmarkTest,
    ctx: Context,
    token: CancellationToken,
}

impl Benchmark {
    pub fn new(test: BenchmarkTest, ctx: Context, token: CancellationToken) -> Self {
        Self { test, ctx, token }
    }

    pub fn test(&self) -> &BenchmarkTest {
        &self.test
    }

    /// Generates one random image and encodes it. Returns the encoded size.
    fn run_once(&self) -> Result<usize> {
        let raster = random_raster(&mut rand::thread_rng(), self.test.width, self.test.height)?;
        let stream = self.test.format.encode(&raster, self.ctx)?;
        Ok(stream.len())
    }

    /// Runs 'runs' encodes one after the other. Returns None if the token was
    /// cancelled before all of them finished.
    pub fn run_single(&self, runs: usize) -> Result<Option<BenchmarkResult>> {
        log::info!("{}: running {} single thread tests", self.test.name, runs);
        let start = Instant::now();
        for _ in 0..runs {
            if self.token.is_cancelled() {
                return Ok(None);
            }
            self.run_once()?;
        }
        Ok(Some(BenchmarkResult {
            runs,
            elapsed: start.elapsed(),
        }))
    }

    /// Runs 'runs' independent encodes on a pool of 'threads' workers.
    /// Returns None if the token was cancelled during the pass.
    pub fn run_parallel(&self, runs: usize, threads: usize) -> Result<Option<BenchmarkResult>> {
        if threads == 0 {
            return Err(crate::Error::InvalidParameter(
                "the thread count must be positive".to_string(),
            ));
        }
        log::info!(
            "{}: running {} multi thread tests on {} threads",
            self.test.name,
            runs,
            threads
        );
        let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;

        let start = Instant::now();
        pool.install(|| {
            (0..runs).into_par_iter().try_for_each(|_| {
                if self.token.is_cancelled() {
                    return Ok(());
                }
                self.run_once().map(|_| ())
            })
        })?;
        let elapsed = start.elapsed();

        if self.token.is_cancelled() {
            return Ok(None);
        }
        Ok(Some(BenchmarkResult { runs, elapsed }))
    }

    /// Keeps running parallel passes of 'runs' encodes until the token is
    /// cancelled. Returns the number of encodes in the completed passes.
    pub fn stress(&self, runs: usize, threads: usize) -> Result<usize> {
        let mut total = 0;
        while !self.token.is_cancelled() {
            match self.run_parallel(runs, threads)? {
                Some(result) => total += result.runs,
                None => break,
            }
        }
        Ok(total)
    }
}

//! This is the command line tool that benchmarks the layer encoders on random
//! images, on a single thread and on a thread pool.

extern crate clap;
extern crate env_logger;
extern crate log;

use clap::{value_parser, Arg, ArgAction, Command};
use layercodec::bench::{
    Benchmark, BenchmarkResult, BenchmarkTest, CancellationToken, MULTI_THREAD_TESTS,
    RUNS_ABBREVIATION, SINGLE_THREAD_TESTS,
};
use layercodec::{Context, Format};

use std::process;
use std::thread;
use std::time::{Duration, Instant};

/// A scoped utility struct for measuring and reporting time.
struct Timer {
    start: std::time::Instant,
}

impl Timer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let now = Instant::now();
        if let Some(duration) = now.checked_duration_since(self.start) {
            log::info!(
                "Benchmark completed in {:03} seconds",
                duration.as_secs_f32()
            );
        }
    }
}

fn report(label: &str, result: Option<BenchmarkResult>) {
    match result {
        Some(result) => log::info!(
            "{}: {:.2} {} ({} tests / {:.2}s)",
            label,
            result.runs_per_second(),
            RUNS_ABBREVIATION,
            result.runs,
            result.elapsed.as_secs_f64()
        ),
        None => log::info!("{}: cancelled", label),
    }
}

fn select_test(matches: &clap::ArgMatches) -> Result<BenchmarkTest, String> {
    let name = matches.get_one::<String>("test").cloned();
    let format = matches.get_one::<String>("format").cloned();

    match (name, format) {
        (Some(name), _) => {
            BenchmarkTest::preset(&name).ok_or_else(|| format!("Unknown test: {}", name))
        }
        (None, format) => {
            let format: Format = format
                .unwrap_or_else(|| String::from("rle1"))
                .parse()
                .map_err(|e: layercodec::Error| e.to_string())?;
            let width = *matches.get_one::<u32>("width").unwrap_or(&3840);
            let height = *matches.get_one::<u32>("height").unwrap_or(&2160);
            let name = format!("{}x{}-{}", width, height, format);
            Ok(BenchmarkTest::new(&name, format, width, height))
        }
    }
}

fn run(matches: &clap::ArgMatches) -> layercodec::Result<()> {
    let test = select_test(matches).map_err(layercodec::Error::InvalidParameter)?;
    let anti_aliasing = *matches.get_one::<u8>("anti-aliasing").unwrap_or(&1);
    let ctx = Context::new(anti_aliasing, 0)?;
    let threads = matches
        .get_one::<usize>("threads")
        .copied()
        .unwrap_or_else(|| thread::available_parallelism().map_or(1, |n| n.get()));
    let single = *matches
        .get_one::<usize>("single")
        .unwrap_or(&SINGLE_THREAD_TESTS);
    let multi = *matches
        .get_one::<usize>("multi")
        .unwrap_or(&MULTI_THREAD_TESTS);

    let token = CancellationToken::new();
    let benchmark = Benchmark::new(test, ctx, token.clone());
    let _timer = Timer::new();

    if let Some(seconds) = matches.get_one::<u64>("stress") {
        log::info!(
            "Stressing the CPU with {} for {} seconds",
            benchmark.test().name,
            seconds
        );
        let duration = Duration::from_secs(*seconds);
        let stopper = thread::spawn(move || {
            thread::sleep(duration);
            token.cancel();
        });
        let total = benchmark.stress(multi, threads)?;
        let _ = stopper.join();
        log::info!("Completed {} encodes", total);
        return Ok(());
    }

    report("Single Thread", benchmark.run_single(single)?);
    report("Multi Thread", benchmark.run_parallel(multi, threads)?);
    Ok(())
}

fn main() {
    let matches = Command::new("layerbench")
        .version("1.x")
        .about("Benchmarks the layer image encoders")
        .arg(
            Arg::new("test")
                .short('t')
                .long("test")
                .value_name("NAME")
                .help("A preset test, e.g. 4k-rle1 or 8k-rle4")
                .num_args(1)
                .conflicts_with("format"),
        )
        .arg(
            Arg::new("list")
                .long("list")
                .help("List the preset tests")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .value_name("format")
                .help("The layer encoding to benchmark.")
                .value_parser(["rle1", "rle7", "rle4"])
                .num_args(1),
        )
        .arg(
            Arg::new("width")
                .long("width")
                .help("Width of the random image")
                .value_parser(value_parser!(u32))
                .num_args(1),
        )
        .arg(
            Arg::new("height")
                .long("height")
                .help("Height of the random image")
                .value_parser(value_parser!(u32))
                .num_args(1),
        )
        .arg(
            Arg::new("anti-aliasing")
                .long("aa")
                .help("Anti-aliasing level of the 1-bit encoder")
                .value_parser(value_parser!(u8))
                .num_args(1),
        )
        .arg(
            Arg::new("single")
                .long("single")
                .help("Number of single thread runs")
                .value_parser(value_parser!(usize))
                .num_args(1),
        )
        .arg(
            Arg::new("multi")
                .long("multi")
                .help("Number of multi thread runs")
                .value_parser(value_parser!(usize))
                .num_args(1),
        )
        .arg(
            Arg::new("threads")
                .short('j')
                .long("threads")
                .help("Number of worker threads")
                .value_parser(value_parser!(usize))
                .num_args(1),
        )
        .arg(
            Arg::new("stress")
                .long("stress")
                .value_name("SECONDS")
                .help("Run parallel passes until the time runs out")
                .value_parser(value_parser!(u64))
                .num_args(1),
        )
        .get_matches();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    if matches.get_flag("list") {
        for test in BenchmarkTest::presets() {
            println!("{} ({}x{})", test.name, test.width, test.height);
        }
        return;
    }

    if let Err(err) = run(&matches) {
        log::error!("{}", err);
        process::exit(1);
    }
}

//! Command-line entry point (O1): loads a declarative filter config, wires
//! up a [`SearchDriver`] over the requested batch range, and streams
//! matches to stdout/CSV as they're found.

use anyhow::{bail, Context, Result};
use balatro_seeker::config;
use balatro_seeker::driver::batch;
use balatro_seeker::driver::{SearchConfig, SearchDriver};
use balatro_seeker::filter::{compile, AutoCutoff, Cutoff};
use balatro_seeker::seed::MAX_LEN;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

const AUTO_CUTOFF_WARMUP_SECS: u64 = 10;
const AUTO_CUTOFF_WARMUP_COUNT: usize = 10;

#[derive(Parser, Debug)]
#[command(name = "seeker", about = "High-throughput brute-force seed search engine for Balatro.")]
struct Args {
    /// path to a JSON filter config (§6).
    #[arg(long)]
    config: PathBuf,

    /// first batch index to search (inclusive). Defaults to 0.
    #[arg(long = "startBatch", default_value_t = 0)]
    start_batch: u64,

    /// last batch index to search (exclusive). Defaults to every batch.
    #[arg(long = "endBatch")]
    end_batch: Option<u64>,

    /// number of leading seed characters fixed per batch (2..=4).
    #[arg(long = "batchSize", default_value_t = 2)]
    batch_size: u32,

    /// total seed length to search. Not part of the compatibility surface;
    /// defaults to the game's fixed 8-character seed.
    #[arg(long = "seedLength", default_value_t = MAX_LEN as u32)]
    seed_length: u32,

    /// worker thread count. Defaults to the available parallelism.
    #[arg(long)]
    threads: Option<usize>,

    /// fixed score cutoff: only results at or above this score are kept.
    #[arg(long)]
    cutoff: Option<i32>,

    /// track the best score seen and raise the bar automatically after a
    /// warmup window (mutually exclusive with `--cutoff`).
    #[arg(long = "autoCutoff", default_value_t = false)]
    auto_cutoff: bool,

    /// run the cheap vector prefilter ahead of scalar verification. Without
    /// it every seed goes straight to the authoritative scalar evaluator.
    #[arg(long, default_value_t = false)]
    prefilter: bool,

    /// suppress the progress line.
    #[arg(long, default_value_t = false)]
    silent: bool,

    /// write matches to this CSV file instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    balatro_seeker::init().context("failed to initialize logging")?;

    if !(2..=4).contains(&args.batch_size) {
        bail!("--batchSize must be between 2 and 4");
    }
    let seed_length = args.seed_length as usize;
    if seed_length == 0 || seed_length > MAX_LEN {
        bail!("--seedLength must be between 1 and {MAX_LEN}");
    }
    if seed_length < args.batch_size as usize {
        bail!("--seedLength must be at least --batchSize");
    }
    if args.cutoff.is_some() && args.auto_cutoff {
        bail!("--cutoff and --autoCutoff are mutually exclusive");
    }

    let raw_text = std::fs::read_to_string(&args.config)
        .with_context(|| format!("reading config {}", args.config.display()))?;
    let raw: config::RawFilterConfig =
        serde_json::from_str(&raw_text).with_context(|| format!("parsing config {}", args.config.display()))?;
    let compiled_config = config::compile(raw).map_err(|errors| {
        let joined = errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("\n  ");
        anyhow::anyhow!("invalid filter config:\n  {joined}")
    })?;
    let filter = compile::compile(compiled_config);

    let total_batches = batch::batch_total(args.batch_size);
    let end_batch = args.end_batch.unwrap_or(total_batches).min(total_batches);
    if args.start_batch >= end_batch {
        bail!("--startBatch must be less than --endBatch");
    }

    let threads = args.threads.unwrap_or_else(num_cpus::get);
    let cutoff = if let Some(bar) = args.cutoff {
        Cutoff::Fixed(bar)
    } else if args.auto_cutoff {
        Cutoff::Auto(AutoCutoff::with_system_clock(
            Duration::from_secs(AUTO_CUTOFF_WARMUP_SECS),
            AUTO_CUTOFF_WARMUP_COUNT,
        ))
    } else {
        Cutoff::Unbounded
    };

    let search_config = SearchConfig {
        filter,
        batch_size: args.batch_size,
        seed_length,
        start_batch: args.start_batch,
        end_batch,
        threads,
        use_prefilter: args.prefilter,
    };

    log::info!(
        "searching batches {}..{} ({} threads, batch_size={}, seed_length={})",
        args.start_batch,
        end_batch,
        threads,
        args.batch_size,
        seed_length
    );

    let driver = SearchDriver::new(search_config, cutoff);
    let results = driver.run();

    if !args.silent {
        let progress = driver.progress();
        eprintln!(
            "done: {} seeds searched, {} matches, {:.1} seeds/ms",
            progress.seeds_searched, progress.matches_found, progress.seeds_per_ms
        );
    }

    let mut sink: Box<dyn Write> = match &args.out {
        Some(path) => Box::new(std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?),
        None => Box::new(std::io::stdout()),
    };
    writeln!(sink, "seed,score")?;
    for outcome in &results {
        writeln!(sink, "{},{}", outcome.seed, outcome.score)?;
    }

    Ok(())
}

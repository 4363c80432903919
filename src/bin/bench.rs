//! Ingestion throughput benchmark.
//!
//! Drives `TileStats::add_buffer` over a fixture dataset at a configurable
//! concurrency. One iteration ingests the whole dataset; iterations are
//! distributed over a fixed pool of worker threads pulling from a shared
//! counter.
//!
//! Run with:
//!     cargo run --bin tilestats-bench -- --iterations 50 --concurrency 10

use std::fs;
use std::num::{NonZeroU64, NonZeroUsize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use anyhow::{Context, Result, anyhow, ensure};
use clap::Parser;
use serde::Serialize;
use tilestats::{TileStats, TileValue};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(version, about = "Ingestion throughput benchmark for tilestats")]
struct Args {
    /// Number of benchmark iterations; one iteration ingests the whole
    /// dataset once.
    #[arg(long)]
    iterations: NonZeroU64,

    /// Number of worker threads ingesting concurrently.
    #[arg(long)]
    concurrency: NonZeroUsize,

    /// Directory of .mvt / .mvt.gz / .pbf tile fixtures.
    #[arg(long, default_value = "tests/fixtures")]
    tiles: PathBuf,
}

/// The result line printed to stdout.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BenchSummary {
    iterations: u64,
    concurrency: usize,
    tile_buffers: usize,
    buffers_ingested: u64,
    elapsed_ms: u128,
    buffers_per_second: f64,
    layer_count: usize,
}

fn main() -> Result<()> {
    setup_tracing();

    let args = Args::parse();
    let iterations = args.iterations.get();
    let concurrency = args.concurrency.get();

    let dataset = load_dataset(&args.tiles)?;
    ensure!(
        !dataset.is_empty(),
        "no tile fixtures found in {}",
        args.tiles.display()
    );

    tracing::info!(
        tiles = dataset.len(),
        iterations,
        concurrency,
        "starting benchmark"
    );

    let next_iteration = AtomicU64::new(0);
    let started = Instant::now();

    let merged = std::thread::scope(|scope| -> Result<TileStats> {
        let mut handles = Vec::with_capacity(concurrency);
        for worker in 0..concurrency {
            let builder =
                std::thread::Builder::new().name(format!("tilestats-worker-{}", worker));
            let handle = builder
                .spawn_scoped(scope, || {
                    run_worker(&next_iteration, iterations, &dataset)
                })
                .context("failed to spawn worker thread")?;
            handles.push(handle);
        }

        let mut merged = TileStats::default();
        for handle in handles {
            let local = handle.join().map_err(|_| anyhow!("worker panicked"))??;
            merged.merge(local);
        }
        Ok(merged)
    })?;

    let elapsed = started.elapsed();
    let buffers_ingested = iterations * dataset.len() as u64;
    let summary = BenchSummary {
        iterations,
        concurrency,
        tile_buffers: dataset.len(),
        buffers_ingested,
        elapsed_ms: elapsed.as_millis(),
        buffers_per_second: buffers_ingested as f64 / elapsed.as_secs_f64(),
        layer_count: merged.layer_count(),
    };

    tracing::info!(
        elapsed_ms = summary.elapsed_ms as u64,
        buffers_per_second = summary.buffers_per_second,
        "benchmark complete"
    );
    println!("{}", serde_json::to_string(&summary)?);

    Ok(())
}

/// One worker: pull iteration indices until the budget is exhausted,
/// aggregating into a thread-local accumulator.
fn run_worker(
    next_iteration: &AtomicU64,
    iterations: u64,
    dataset: &[TileValue],
) -> Result<TileStats> {
    let mut local = TileStats::default();
    loop {
        let iteration = next_iteration.fetch_add(1, Ordering::Relaxed);
        if iteration >= iterations {
            break;
        }
        for value in dataset {
            local
                .add_buffer(Some(value))
                .context("ingestion failed mid-benchmark")?;
        }
    }
    Ok(local)
}

/// Reads every tile fixture in `dir` and validates it once, so workers
/// measure ingestion throughput rather than error paths.
fn load_dataset(dir: &Path) -> Result<Vec<TileValue>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read tile directory {}", dir.display()))?;

    let mut probe = TileStats::default();
    let mut dataset = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
            continue;
        };
        if !matches!(ext, "mvt" | "pbf" | "gz") {
            continue;
        }

        let buf =
            fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
        let value = TileValue::blob(buf);
        probe
            .add_buffer(Some(&value))
            .with_context(|| format!("{} is not ingestible", path.display()))?;
        dataset.push(value);
    }

    Ok(dataset)
}

/// Log level comes from `RUST_LOG` (default `info`); output goes to stderr
/// so the stdout result line stays machine-readable.
fn setup_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

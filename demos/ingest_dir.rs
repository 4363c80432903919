//! Ingest a directory of tiles and print the stats report.
//!
//! Run with:
//!     cargo run --example ingest_dir -- <tile-directory>

use std::env;
use std::fs;

use tilestats::{TileStats, TileValue};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dir = env::args()
        .nth(1)
        .unwrap_or_else(|| "tests/fixtures".to_string());

    let mut stats = TileStats::default();
    let mut rejected = 0usize;

    for entry in fs::read_dir(&dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }

        let buf = fs::read(&path)?;
        let value = TileValue::blob(buf);
        match stats.add_buffer(Some(&value)) {
            Ok(()) => {}
            Err(err) => {
                eprintln!("{}: {}", path.display(), err);
                rejected += 1;
            }
        }
    }

    println!("{}", serde_json::to_string_pretty(&stats.report())?);
    eprintln!(
        "\ningested {} tiles, rejected {}",
        stats.tile_count(),
        rejected
    );

    Ok(())
}

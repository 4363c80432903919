#![no_main]

use libfuzzer_sys::fuzz_target;
use tilestats::{TileStats, TileValue};

fuzz_target!(|data: Vec<u8>| {
    let mut stats = TileStats::default();

    // The loosely-typed entry point classifies every input shape without
    // panicking, and non-buffer values never touch the aggregate.
    let _ = stats.add_buffer(None);
    let _ = stats.add_buffer(Some(&TileValue::Integer(15)));
    let _ = stats.add_buffer(Some(&TileValue::Null));
    assert!(stats.is_empty());

    let value = TileValue::blob(data);
    let _ = stats.add_buffer(Some(&value));

    // Report building never panics, whatever was ingested.
    let report = stats.report();
    assert_eq!(report.layer_count, report.layers.len());
});

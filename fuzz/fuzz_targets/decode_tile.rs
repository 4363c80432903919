#![no_main]

use libfuzzer_sys::fuzz_target;
use tilestats::TileStats;

fuzz_target!(|data: Vec<u8>| {
    // Arbitrary bytes must either ingest cleanly or be rejected as an
    // invalid tile; never panic.
    let mut stats = TileStats::default();
    match stats.add_tile(&data) {
        Ok(()) => {
            assert_eq!(stats.tile_count(), 1);

            // Accepted buffers must ingest deterministically.
            let mut again = TileStats::default();
            again
                .add_tile(&data)
                .expect("accepted buffer must stay accepted");
            assert_eq!(stats.report(), again.report());
        }
        Err(_) => {
            // Rejection must leave the aggregate untouched.
            assert!(stats.is_empty());
            assert_eq!(stats.layer_count(), 0);
        }
    }
});

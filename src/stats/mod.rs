//! Statistics accumulation engine.
//!
//! - [`TileStats`] - Stateful accumulator with `add_buffer()`/`merge()` API

mod accumulator;

pub use accumulator::TileStats;

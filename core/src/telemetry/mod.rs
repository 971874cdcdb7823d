//! telemetry/mod.rs
//! Counters and immutable snapshots for pools and connections.
//!
//! - Pool counters are atomic: every clone of a pool, on any thread, feeds them.
//! - Connection counters are plain integers: a connection is driven by one
//!   thread at a time, and per-connection totals are merged afterwards.

pub mod counters;
pub mod snapshot;

pub use counters::*;
pub use snapshot::*;

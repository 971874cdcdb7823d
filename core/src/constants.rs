//! constants.rs
//! Defaults and bounds shared across the crate.

/// Store-only: blocks are emitted uncompressed.
pub const MIN_COMPRESSION_LEVEL: i32 = 0;
/// Best ratio, slowest.
pub const MAX_COMPRESSION_LEVEL: i32 = 9;
/// Fast mode. High message rates favour speed over ratio.
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 1;

/// Number of compressor buckets in a pool, one per valid level.
pub const LEVEL_COUNT: usize = (MAX_COMPRESSION_LEVEL - MIN_COMPRESSION_LEVEL + 1) as usize;

/// Idle instances kept per pool bucket before extras are dropped.
pub const DEFAULT_MAX_IDLE_PER_BUCKET: usize = 64;

/// Scratch size used when shuttling bytes between the codec and the sink/source.
pub const DEFAULT_BUFFER_SIZE: usize = 4 * 1024;

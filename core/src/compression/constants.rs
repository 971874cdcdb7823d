//! compression/constants.rs
//! Wire-level constants of the per-message DEFLATE format.

/// Bytes every sync-flushed DEFLATE stream ends with (an empty stored block).
/// The wire format drops them; the reader puts them back.
pub const SYNC_FLUSH_TRAILER: [u8; 4] = [0x00, 0x00, 0xff, 0xff];

/// Suffix chained after the wire bytes before inflating: the sync-flush
/// trailer followed by a final empty stored block, so the decoder reaches a
/// clean end-of-stream instead of running out of input mid-stream.
pub const INFLATE_SUFFIX: [u8; 9] = [
    0x00, 0x00, 0xff, 0xff, // sync-flush trailer
    0x01, 0x00, 0x00, 0xff, 0xff, // BFINAL stored block, LEN=0
];

/// Largest LZ77 window DEFLATE supports (window bits = 15).
pub const MAX_WINDOW_SIZE: usize = 1 << 15;

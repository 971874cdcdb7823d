//! compression/session/mod.rs
//! Per-message compression sessions.
//!
//! A session covers one message, from acquiring a codec to closing it. The
//! four entry points below pick between the two operating modes:
//! - no context takeover: every message starts from an empty history and the
//!   codec comes from (and returns to) the pool;
//! - context takeover: the connection's [`SlidingWindow`] seeds the codec and
//!   collects the message's plaintext for the next one.

pub mod reader;
pub mod writer;

pub use reader::MessageReader;
pub use writer::MessageWriter;

use std::io::{Read, Write};

use crate::compression::pool::CodecPool;
use crate::compression::types::{CompressionError, CompressionLevel};
use crate::compression::window::{HistorySink, SlidingWindow};

pub fn compress_no_context_takeover<W: Write>(
    pool: &CodecPool,
    sink: W,
    level: CompressionLevel,
) -> MessageWriter<W> {
    MessageWriter::fresh(pool, sink, level)
}

pub fn compress_context_takeover<'d, W: Write>(
    pool: &CodecPool,
    sink: W,
    level: CompressionLevel,
    window: &'d mut SlidingWindow,
) -> Result<MessageWriter<W, &'d mut SlidingWindow>, CompressionError> {
    MessageWriter::new(pool, sink, level, window)
}

pub fn decompress_no_context_takeover<R: Read>(pool: &CodecPool, source: R) -> MessageReader<R> {
    MessageReader::fresh(pool, source)
}

pub fn decompress_context_takeover<'d, R: Read>(
    pool: &CodecPool,
    source: R,
    window: &'d mut SlidingWindow,
) -> Result<MessageReader<R, &'d mut SlidingWindow>, CompressionError> {
    MessageReader::new(pool, source, window)
}

/// Compress a whole payload into its wire form.
pub fn compress_message<H: HistorySink>(
    pool: &CodecPool,
    payload: &[u8],
    level: CompressionLevel,
    history: H,
) -> Result<Vec<u8>, CompressionError> {
    let mut writer = MessageWriter::new(pool, Vec::new(), level, history)?;
    writer.write(payload)?;
    writer.close()?;
    Ok(writer.into_inner())
}

/// Decompress a whole wire payload, refusing to produce more than `limit`
/// bytes when one is given. Reaching the end of the message releases the
/// decompressor, so there is nothing left to close.
pub fn decompress_message<H: HistorySink>(
    pool: &CodecPool,
    wire: &[u8],
    history: H,
    limit: Option<usize>,
) -> Result<Vec<u8>, CompressionError> {
    let mut reader = MessageReader::new(pool, wire, history)?.with_limit(limit);
    let mut plaintext = Vec::new();
    reader.read_to_end(&mut plaintext)?;
    debug_assert!(reader.is_finished());
    Ok(plaintext)
}

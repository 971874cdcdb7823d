//! compression/session/writer.rs
//! Write side of a message: plaintext in, trailer-stripped DEFLATE out.
use std::io::{self, Write};

use flate2::{Compress, FlushCompress};
use log::trace;

use crate::compression::pool::{CodecPool, Lease};
use crate::compression::trailer::TrailerStripWriter;
use crate::compression::types::{CompressionError, CompressionLevel};
use crate::compression::window::{HistorySink, NoHistory};
use crate::constants::DEFAULT_BUFFER_SIZE;

/// Compresses one message into `W`.
///
/// `close` must be called to emit the tail of the message; the sync-flush
/// trailer is verified and withheld. Dropping an unclosed writer releases the
/// compressor but leaves the message incomplete.
pub struct MessageWriter<W: Write, H: HistorySink = NoHistory> {
    /// `None` once closed.
    compressor: Option<Lease<Compress>>,
    sink: TrailerStripWriter<W>,
    history: H,
    scratch: Vec<u8>,
}

impl<W: Write, H: HistorySink> MessageWriter<W, H> {
    /// Open a writer. A tracking `history` selects context takeover: the
    /// compressor is seeded with its dictionary and every written chunk is
    /// recorded into it.
    pub fn new(
        pool: &CodecPool,
        sink: W,
        level: CompressionLevel,
        history: H,
    ) -> Result<Self, CompressionError> {
        let compressor = if history.is_tracking() {
            pool.acquire_seeded_compressor(level, history.dictionary())?
        } else {
            pool.acquire_compressor(level)
        };
        trace!("message writer opened (level {}, context takeover {})", level, history.is_tracking());
        Ok(Self::from_lease(compressor, sink, history))
    }

    fn from_lease(compressor: Lease<Compress>, sink: W, history: H) -> Self {
        Self {
            compressor: Some(compressor),
            sink: TrailerStripWriter::new(sink),
            history,
            scratch: vec![0; DEFAULT_BUFFER_SIZE],
        }
    }

    /// Compress `data`. Returns the number of plaintext bytes consumed, which
    /// is always all of them on success.
    pub fn write(&mut self, data: &[u8]) -> Result<usize, CompressionError> {
        self.write_chunk(data)
    }

    /// Sync-flush, release the compressor, then verify and withhold the
    /// trailer. A second call reports [`CompressionError::Closed`].
    pub fn close(&mut self) -> Result<(), CompressionError> {
        let mut lease = self.compressor.take().ok_or(CompressionError::Closed)?;
        let flushed = match lease.get_mut() {
            Some(compressor) => deflate_into(
                compressor,
                &[],
                FlushCompress::Sync,
                &mut self.scratch,
                &mut self.sink,
            ),
            None => Err(CompressionError::Closed),
        };
        drop(lease);
        let closed = self.sink.close();
        trace!("message writer closed");
        flushed.and(closed)
    }

    pub fn is_closed(&self) -> bool {
        self.compressor.is_none()
    }

    pub fn get_ref(&self) -> &W {
        self.sink.get_ref()
    }

    /// The destination. After a successful close it holds the complete wire
    /// payload of the message.
    pub fn into_inner(self) -> W {
        self.sink.into_inner()
    }

    fn write_chunk(&mut self, data: &[u8]) -> Result<usize, CompressionError> {
        let compressor = self
            .compressor
            .as_mut()
            .and_then(Lease::get_mut)
            .ok_or(CompressionError::Closed)?;
        if data.is_empty() {
            return Ok(0);
        }
        deflate_into(compressor, data, FlushCompress::None, &mut self.scratch, &mut self.sink)?;
        self.history.record(data);
        Ok(data.len())
    }
}

impl<W: Write> MessageWriter<W, NoHistory> {
    /// Writer without context takeover. Cannot fail: the compressor needs no
    /// seeding.
    pub fn fresh(pool: &CodecPool, sink: W, level: CompressionLevel) -> Self {
        trace!("message writer opened (level {}, context takeover false)", level);
        Self::from_lease(pool.acquire_compressor(level), sink, NoHistory)
    }
}

impl<W: Write, H: HistorySink> Write for MessageWriter<W, H> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_chunk(buf).map_err(io::Error::from)
    }

    /// Flushes the destination only. Compressed bytes still buffered inside
    /// the compressor are emitted by `close`.
    fn flush(&mut self) -> io::Result<()> {
        if self.is_closed() {
            return Err(CompressionError::Closed.into());
        }
        self.sink.flush()
    }
}

/// Run `input` through the compressor until it is consumed and, for a flush,
/// until the compressor has nothing left to emit.
fn deflate_into<S: Write>(
    compressor: &mut Compress,
    mut input: &[u8],
    flush: FlushCompress,
    scratch: &mut [u8],
    sink: &mut S,
) -> Result<(), CompressionError> {
    loop {
        let before_in = compressor.total_in();
        let before_out = compressor.total_out();
        compressor.compress(input, scratch, flush)?;
        let consumed = (compressor.total_in() - before_in) as usize;
        let produced = (compressor.total_out() - before_out) as usize;

        input = &input[consumed..];
        if produced > 0 {
            sink.write_all(&scratch[..produced])?;
        }
        // Spare room in the output means the compressor is drained.
        if input.is_empty() && produced < scratch.len() {
            return Ok(());
        }
        if consumed == 0 && produced == 0 {
            return Err(CompressionError::Deflate("compressor made no progress".into()));
        }
    }
}

//! compression/trailer.rs
//! Sink adapter that withholds the final four bytes of a stream.
//!
//! A sync-flushed DEFLATE stream always ends in `00 00 ff ff`. The wire format
//! leaves those bytes out, so the writer side keeps the last four bytes it has
//! seen in a small buffer and forwards only what precedes them. At close time
//! the withheld bytes must be exactly the trailer.
use std::io::{self, Write};

use crate::compression::constants::SYNC_FLUSH_TRAILER;
use crate::compression::types::CompressionError;

const HELD: usize = SYNC_FLUSH_TRAILER.len();

#[derive(Debug)]
pub struct TrailerStripWriter<W> {
    inner: W,
    held: [u8; HELD],
    held_len: usize,
    closed: bool,
}

impl<W: Write> TrailerStripWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            held: [0; HELD],
            held_len: 0,
            closed: false,
        }
    }

    /// Bytes currently withheld from the destination.
    pub fn retained(&self) -> &[u8] {
        &self.held[..self.held_len]
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Gives the destination back. The withheld bytes are not written.
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Flush the destination, then check the withheld bytes are the trailer.
    ///
    /// `W` has no close of its own: this only flushes it. The destination
    /// stays open and is closed by its owner after [`into_inner`](Self::into_inner).
    ///
    /// A destination error wins over a trailer mismatch. A mismatch means the
    /// compressor did not sync-flush and is never recoverable.
    pub fn close(&mut self) -> Result<(), CompressionError> {
        if self.closed {
            return Err(CompressionError::Closed);
        }
        self.closed = true;
        self.inner.flush()?;
        if self.retained() != SYNC_FLUSH_TRAILER {
            return Err(CompressionError::TrailerMismatch { found: self.retained().to_vec() });
        }
        Ok(())
    }
}

impl<W: Write> Write for TrailerStripWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.closed {
            return Err(CompressionError::Closed.into());
        }

        // Fill the hold buffer first.
        let mut accepted = 0;
        let mut rest = buf;
        if self.held_len < HELD {
            let n = (HELD - self.held_len).min(rest.len());
            self.held[self.held_len..self.held_len + n].copy_from_slice(&rest[..n]);
            self.held_len += n;
            accepted = n;
            rest = &rest[n..];
            if rest.is_empty() {
                return Ok(accepted);
            }
        }

        // `m` held bytes leave, the last `m` bytes of `rest` take their place.
        let m = rest.len().min(HELD);
        self.inner.write_all(&self.held[..m])?;
        self.held.copy_within(m.., 0);
        self.held[HELD - m..].copy_from_slice(&rest[rest.len() - m..]);
        self.inner.write_all(&rest[..rest.len() - m])?;

        Ok(accepted + rest.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.closed {
            return Err(CompressionError::Closed.into());
        }
        self.inner.flush()
    }
}

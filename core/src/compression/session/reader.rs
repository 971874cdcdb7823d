//! compression/session/reader.rs
//! Read side of a message: wire bytes in, plaintext out.
use std::io::{self, Chain, Read};

use flate2::{Decompress, FlushDecompress, Status};
use log::trace;

use crate::compression::constants::INFLATE_SUFFIX;
use crate::compression::pool::{CodecPool, Lease};
use crate::compression::types::CompressionError;
use crate::compression::window::{HistorySink, NoHistory};
use crate::constants::DEFAULT_BUFFER_SIZE;

enum ReadState {
    Open(Lease<Decompress>),
    /// End of stream reached by a read that returned data; the decompressor
    /// is already back in the pool and one `Ok(0)` is still owed.
    Drained,
    Closed,
}

/// Decompresses one message read from `R`.
///
/// `R` yields the wire payload exactly as received (trailer stripped). The
/// reader appends [`INFLATE_SUFFIX`] itself. Reaching the end of the message
/// releases the decompressor and closes the reader: the end is reported by a
/// single `Ok(0)`, after which reads and `close` fail with
/// [`CompressionError::Closed`].
pub struct MessageReader<R: Read, H: HistorySink = NoHistory> {
    state: ReadState,
    source: Chain<R, &'static [u8]>,
    input: Box<[u8]>,
    pos: usize,
    filled: usize,
    source_done: bool,
    history: H,
    limit: Option<usize>,
    produced: usize,
    finished: bool,
}

impl<R: Read, H: HistorySink> MessageReader<R, H> {
    /// Open a reader. A tracking `history` seeds the decompressor with its
    /// dictionary and records every chunk handed out.
    pub fn new(pool: &CodecPool, source: R, history: H) -> Result<Self, CompressionError> {
        let decompressor = pool.acquire_seeded_decompressor(history.dictionary())?;
        trace!("message reader opened (context takeover {})", history.is_tracking());
        Ok(Self::from_lease(decompressor, source, history))
    }

    fn from_lease(decompressor: Lease<Decompress>, source: R, history: H) -> Self {
        let suffix: &'static [u8] = &INFLATE_SUFFIX;
        Self {
            state: ReadState::Open(decompressor),
            source: source.chain(suffix),
            input: vec![0; DEFAULT_BUFFER_SIZE].into_boxed_slice(),
            pos: 0,
            filled: 0,
            source_done: false,
            history,
            limit: None,
            produced: 0,
            finished: false,
        }
    }

    /// Fail with [`CompressionError::MessageTooLarge`] once more than `limit`
    /// plaintext bytes come out of this message.
    #[must_use]
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Read decompressed bytes into `out`. `Ok(0)` marks the end of the
    /// message (or an empty `out`).
    pub fn read(&mut self, out: &mut [u8]) -> Result<usize, CompressionError> {
        self.read_chunk(out)
    }

    /// Release the decompressor before the end of the message. The end of
    /// the message already closes the reader, so closing after it, or
    /// closing twice, reports [`CompressionError::Closed`].
    pub fn close(&mut self) -> Result<(), CompressionError> {
        match std::mem::replace(&mut self.state, ReadState::Closed) {
            ReadState::Open(_) => {
                trace!("message reader closed");
                Ok(())
            }
            ReadState::Drained | ReadState::Closed => Err(CompressionError::Closed),
        }
    }

    /// End of stream reached and the decompressor released.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// No decompressor held: closed explicitly or by the end of the message.
    pub fn is_closed(&self) -> bool {
        !matches!(self.state, ReadState::Open(_))
    }

    /// Plaintext bytes produced so far.
    pub fn total_out(&self) -> usize {
        self.produced
    }

    pub fn get_ref(&self) -> &R {
        self.source.get_ref().0
    }

    pub fn into_inner(self) -> R {
        self.source.into_inner().0
    }

    fn read_chunk(&mut self, out: &mut [u8]) -> Result<usize, CompressionError> {
        match self.state {
            ReadState::Open(_) => {}
            ReadState::Drained => {
                self.state = ReadState::Closed;
                return Ok(0);
            }
            ReadState::Closed => return Err(CompressionError::Closed),
        }
        let ReadState::Open(lease) = &mut self.state else {
            return Err(CompressionError::Closed);
        };
        let decompressor = lease.get_mut().ok_or(CompressionError::Closed)?;
        if out.is_empty() {
            return Ok(0);
        }

        loop {
            if self.pos == self.filled && !self.source_done {
                self.filled = fill(&mut self.source, &mut self.input)?;
                self.pos = 0;
                self.source_done = self.filled == 0;
            }

            let before_in = decompressor.total_in();
            let before_out = decompressor.total_out();
            let status = decompressor.decompress(
                &self.input[self.pos..self.filled],
                out,
                FlushDecompress::None,
            )?;
            let consumed = (decompressor.total_in() - before_in) as usize;
            let produced = (decompressor.total_out() - before_out) as usize;
            self.pos += consumed;

            if produced > 0 {
                self.produced += produced;
                if let Some(limit) = self.limit {
                    if self.produced > limit {
                        return Err(CompressionError::MessageTooLarge { limit });
                    }
                }
                self.history.record(&out[..produced]);
            }

            if status == Status::StreamEnd {
                // Hand the decompressor back now rather than on close; callers
                // often hold the reader well past the last byte.
                self.finished = true;
                self.state = if produced > 0 { ReadState::Drained } else { ReadState::Closed };
                trace!("message reader reached end of stream ({} bytes)", self.produced);
                return Ok(produced);
            }
            if produced > 0 {
                return Ok(produced);
            }
            if consumed == 0 && self.source_done && self.pos == self.filled {
                return Err(CompressionError::Inflate("unexpected end of deflate stream".into()));
            }
        }
    }
}

impl<R: Read> MessageReader<R, NoHistory> {
    /// Reader without context takeover.
    pub fn fresh(pool: &CodecPool, source: R) -> Self {
        trace!("message reader opened (context takeover false)");
        Self::from_lease(pool.acquire_decompressor(), source, NoHistory)
    }
}

impl<R: Read, H: HistorySink> Read for MessageReader<R, H> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_chunk(buf).map_err(io::Error::from)
    }
}

fn fill<S: Read>(source: &mut S, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match source.read(buf) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            other => return other,
        }
    }
}

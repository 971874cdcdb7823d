//! compression/window.rs
//! Bounded history of recent plaintext used as a preset dictionary.
use crate::compression::constants::MAX_WINDOW_SIZE;
use crate::compression::types::CompressionError;

/// The last `max_len` plaintext bytes that crossed one direction of a
/// connection. Seeds the next message's codec when context takeover is on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlidingWindow {
    buf: Vec<u8>,
    max_len: usize,
}

impl SlidingWindow {
    /// Window of the largest size DEFLATE supports.
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            max_len: MAX_WINDOW_SIZE,
        }
    }

    pub fn with_max_len(max_len: usize) -> Result<Self, CompressionError> {
        if max_len == 0 || max_len > MAX_WINDOW_SIZE {
            return Err(CompressionError::InvalidWindowSize { have: max_len, max: MAX_WINDOW_SIZE });
        }
        Ok(Self {
            buf: Vec::new(),
            max_len,
        })
    }

    /// Append `bytes`, dropping the oldest history beyond `max_len`.
    pub fn record(&mut self, bytes: &[u8]) {
        if bytes.len() >= self.max_len {
            self.buf.clear();
            self.buf.extend_from_slice(&bytes[bytes.len() - self.max_len..]);
            return;
        }
        self.buf.extend_from_slice(bytes);
        if self.buf.len() > self.max_len {
            let excess = self.buf.len() - self.max_len;
            self.buf.drain(..excess);
        }
    }

    /// History to hand to a codec, `None` while nothing has been recorded.
    pub fn dictionary(&self) -> Option<&[u8]> {
        if self.buf.is_empty() {
            None
        } else {
            Some(&self.buf)
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

impl Default for SlidingWindow {
    fn default() -> Self {
        Self::new()
    }
}

/// Where a session reports the plaintext it moved.
///
/// Sessions without context takeover use [`NoHistory`]; context-takeover
/// sessions borrow the connection's [`SlidingWindow`] for one message.
pub trait HistorySink {
    fn record(&mut self, bytes: &[u8]);

    /// Dictionary to seed a fresh codec with.
    fn dictionary(&self) -> Option<&[u8]>;

    /// Whether this sink carries history across messages at all.
    fn is_tracking(&self) -> bool;
}

/// History sink for sessions that start from scratch every message.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NoHistory;

impl HistorySink for NoHistory {
    fn record(&mut self, _bytes: &[u8]) {}

    fn dictionary(&self) -> Option<&[u8]> {
        None
    }

    fn is_tracking(&self) -> bool {
        false
    }
}

impl HistorySink for &mut SlidingWindow {
    fn record(&mut self, bytes: &[u8]) {
        SlidingWindow::record(self, bytes)
    }

    fn dictionary(&self) -> Option<&[u8]> {
        SlidingWindow::dictionary(self)
    }

    fn is_tracking(&self) -> bool {
        true
    }
}

/// Lets a connection pick the mode at runtime: `None` behaves as [`NoHistory`].
impl<H: HistorySink> HistorySink for Option<H> {
    fn record(&mut self, bytes: &[u8]) {
        if let Some(history) = self {
            history.record(bytes);
        }
    }

    fn dictionary(&self) -> Option<&[u8]> {
        self.as_ref().and_then(|history| history.dictionary())
    }

    fn is_tracking(&self) -> bool {
        self.as_ref().is_some_and(|history| history.is_tracking())
    }
}

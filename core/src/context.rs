//! context.rs
//! Long-lived compression state of one connection.
use std::io::{Read, Write};

use crate::compression::pool::CodecPool;
use crate::compression::session::{self, MessageReader, MessageWriter};
use crate::compression::types::{CompressionError, CompressionLevel};
use crate::compression::window::SlidingWindow;
use crate::config::DeflateParams;
use crate::telemetry::{CompressionCounters, CompressionSnapshot};

/// Per-connection compression context.
///
/// Owns one [`SlidingWindow`] per direction that has context takeover on and
/// lends it to exactly one session at a time: `writer`/`reader` borrow the
/// context mutably for the lifetime of the session, so messages on one
/// direction are necessarily processed one after another.
///
/// A session that fails part-way leaves the history of its direction out of
/// sync with the peer; the connection should be torn down.
#[derive(Debug)]
pub struct DeflateContext {
    pool: CodecPool,
    params: DeflateParams,
    outbound: Option<SlidingWindow>,
    inbound: Option<SlidingWindow>,
    counters: CompressionCounters,
}

impl DeflateContext {
    pub fn new(pool: CodecPool, params: DeflateParams) -> Result<Self, CompressionError> {
        params.validate()?;
        let window = || SlidingWindow::with_max_len(params.max_window_size);
        let outbound = params.outbound_context_takeover.then(window).transpose()?;
        let inbound = params.inbound_context_takeover.then(window).transpose()?;
        Ok(Self {
            pool,
            params,
            outbound,
            inbound,
            counters: CompressionCounters::default(),
        })
    }

    pub fn params(&self) -> &DeflateParams {
        &self.params
    }

    pub fn pool(&self) -> &CodecPool {
        &self.pool
    }

    /// Level used by writers opened from now on.
    pub fn set_level(&mut self, level: i32) -> Result<(), CompressionError> {
        self.params.level = CompressionLevel::new(level)?;
        Ok(())
    }

    /// Open the write session for the next outbound message.
    pub fn writer<W: Write>(
        &mut self,
        sink: W,
    ) -> Result<MessageWriter<W, Option<&mut SlidingWindow>>, CompressionError> {
        MessageWriter::new(&self.pool, sink, self.params.level, self.outbound.as_mut())
    }

    /// Open the read session for the next inbound message.
    pub fn reader<R: Read>(
        &mut self,
        source: R,
    ) -> Result<MessageReader<R, Option<&mut SlidingWindow>>, CompressionError> {
        let reader = MessageReader::new(&self.pool, source, self.inbound.as_mut())?;
        Ok(reader.with_limit(self.params.max_message_size))
    }

    pub fn compress_message(&mut self, payload: &[u8]) -> Result<Vec<u8>, CompressionError> {
        let wire = session::compress_message(
            &self.pool,
            payload,
            self.params.level,
            self.outbound.as_mut(),
        )?;
        self.counters.add_compressed(payload.len(), wire.len());
        Ok(wire)
    }

    pub fn decompress_message(&mut self, wire: &[u8]) -> Result<Vec<u8>, CompressionError> {
        let plaintext = session::decompress_message(
            &self.pool,
            wire,
            self.inbound.as_mut(),
            self.params.max_message_size,
        )?;
        self.counters.add_decompressed(wire.len(), plaintext.len());
        Ok(plaintext)
    }

    /// Forget outbound history; the next message compresses from scratch.
    pub fn reset_outbound(&mut self) {
        if let Some(window) = &mut self.outbound {
            window.clear();
        }
    }

    /// Forget inbound history; must mirror a reset on the peer's outbound side.
    pub fn reset_inbound(&mut self) {
        if let Some(window) = &mut self.inbound {
            window.clear();
        }
    }

    pub fn outbound_window(&self) -> Option<&SlidingWindow> {
        self.outbound.as_ref()
    }

    pub fn inbound_window(&self) -> Option<&SlidingWindow> {
        self.inbound.as_ref()
    }

    pub fn counters(&self) -> &CompressionCounters {
        &self.counters
    }

    pub fn snapshot(&self) -> CompressionSnapshot {
        CompressionSnapshot::from(&self.counters)
    }
}

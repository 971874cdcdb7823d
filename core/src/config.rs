//! config.rs
//! Pool options and the negotiated per-connection parameters.
use serde::{Deserialize, Serialize};

use crate::compression::constants::MAX_WINDOW_SIZE;
use crate::compression::types::{CompressionError, CompressionLevel};
use crate::constants::DEFAULT_MAX_IDLE_PER_BUCKET;

/// How a [`CodecPool`](crate::compression::CodecPool) keeps idle instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Idle instances kept per bucket; extras are dropped. `0` disables pooling.
    pub max_idle_per_bucket: usize,
    /// Return dictionary-seeded compressors to their level bucket after use.
    /// Off by default: they are built per message and dropped.
    pub recycle_dictionary_compressors: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_idle_per_bucket: DEFAULT_MAX_IDLE_PER_BUCKET,
            recycle_dictionary_compressors: false,
        }
    }
}

/// Extension parameters as settled by the handshake, seen from one endpoint.
///
/// Outbound is what this endpoint compresses, inbound what it decompresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeflateParams {
    pub level: CompressionLevel,
    pub outbound_context_takeover: bool,
    pub inbound_context_takeover: bool,
    /// History retained per direction when context takeover is on.
    pub max_window_size: usize,
    /// Cap on one decompressed message, `None` for unlimited.
    pub max_message_size: Option<usize>,
}

impl Default for DeflateParams {
    fn default() -> Self {
        Self {
            level: CompressionLevel::default(),
            outbound_context_takeover: true,
            inbound_context_takeover: true,
            max_window_size: MAX_WINDOW_SIZE,
            max_message_size: None,
        }
    }
}

impl DeflateParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Both directions reset history after every message.
    pub fn no_context_takeover() -> Self {
        Self {
            outbound_context_takeover: false,
            inbound_context_takeover: false,
            ..Self::default()
        }
    }

    pub fn with_level(mut self, level: i32) -> Result<Self, CompressionError> {
        self.level = CompressionLevel::new(level)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_outbound_context_takeover(mut self, on: bool) -> Self {
        self.outbound_context_takeover = on;
        self
    }

    #[must_use]
    pub fn with_inbound_context_takeover(mut self, on: bool) -> Self {
        self.inbound_context_takeover = on;
        self
    }

    pub fn with_max_window_size(mut self, size: usize) -> Result<Self, CompressionError> {
        self.max_window_size = size;
        self.validate()?;
        Ok(self)
    }

    #[must_use]
    pub fn with_max_message_size(mut self, limit: Option<usize>) -> Self {
        self.max_message_size = limit;
        self
    }

    /// Reject values a deserializer or direct field access let through.
    pub fn validate(&self) -> Result<(), CompressionError> {
        CompressionLevel::new(self.level.get())?;
        if self.max_window_size == 0 || self.max_window_size > MAX_WINDOW_SIZE {
            return Err(CompressionError::InvalidWindowSize {
                have: self.max_window_size,
                max: MAX_WINDOW_SIZE,
            });
        }
        Ok(())
    }
}

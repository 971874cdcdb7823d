//! compression/types.rs
//! Validated compression level and the crate error type.
use std::fmt;
use std::io;

use flate2::Compression;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_COMPRESSION_LEVEL, MAX_COMPRESSION_LEVEL, MIN_COMPRESSION_LEVEL};

/// A DEFLATE compression level known to be within
/// `[MIN_COMPRESSION_LEVEL, MAX_COMPRESSION_LEVEL]`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct CompressionLevel(i32);

impl CompressionLevel {
    pub const STORE: CompressionLevel = CompressionLevel(MIN_COMPRESSION_LEVEL);
    pub const FAST: CompressionLevel = CompressionLevel(DEFAULT_COMPRESSION_LEVEL);
    pub const BEST: CompressionLevel = CompressionLevel(MAX_COMPRESSION_LEVEL);

    /// Validate a raw level. Out-of-range values are rejected, never clamped.
    pub fn new(level: i32) -> Result<Self, CompressionError> {
        if is_valid_compression_level(level) {
            Ok(Self(level))
        } else {
            Err(CompressionError::InvalidLevel {
                level,
                min: MIN_COMPRESSION_LEVEL,
                max: MAX_COMPRESSION_LEVEL,
            })
        }
    }

    pub fn get(self) -> i32 {
        self.0
    }

    /// Index of this level's compressor bucket in a pool.
    pub(crate) fn bucket(self) -> usize {
        (self.0 - MIN_COMPRESSION_LEVEL) as usize
    }

    pub(crate) fn to_flate2(self) -> Compression {
        Compression::new(self.0 as u32)
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self::FAST
    }
}

impl TryFrom<i32> for CompressionLevel {
    type Error = CompressionError;

    fn try_from(level: i32) -> Result<Self, Self::Error> {
        Self::new(level)
    }
}

impl From<CompressionLevel> for i32 {
    fn from(level: CompressionLevel) -> i32 {
        level.0
    }
}

impl fmt::Display for CompressionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub fn is_valid_compression_level(level: i32) -> bool {
    (MIN_COMPRESSION_LEVEL..=MAX_COMPRESSION_LEVEL).contains(&level)
}

#[derive(Debug)]
pub enum CompressionError {
    /// Level outside the supported range.
    InvalidLevel { level: i32, min: i32, max: i32 },
    /// Window size of zero or above what DEFLATE can address.
    InvalidWindowSize { have: usize, max: usize },
    /// Read, write or close on a session that was already closed.
    Closed,
    /// Failure of the underlying sink or source, passed through untouched.
    Io(io::Error),
    /// The compressor did not end its output with the sync-flush trailer.
    TrailerMismatch { found: Vec<u8> },
    /// The compressor rejected its input.
    Deflate(String),
    /// The compressed stream is corrupt or truncated.
    Inflate(String),
    /// Decompressed output grew past the configured per-message limit.
    MessageTooLarge { limit: usize },
}

impl CompressionError {
    pub fn is_closed(&self) -> bool {
        matches!(self, CompressionError::Closed)
    }

    fn io_kind(&self) -> io::ErrorKind {
        use CompressionError::*;
        match self {
            InvalidLevel { .. } | InvalidWindowSize { .. } => io::ErrorKind::InvalidInput,
            Closed => io::ErrorKind::BrokenPipe,
            Io(e) => e.kind(),
            Inflate(_) | MessageTooLarge { .. } => io::ErrorKind::InvalidData,
            TrailerMismatch { .. } | Deflate(_) => io::ErrorKind::Other,
        }
    }
}

impl fmt::Display for CompressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use CompressionError::*;
        match self {
            InvalidLevel { level, min, max } =>
                write!(f, "invalid compression level {} (expected {}..={})", level, min, max),
            InvalidWindowSize { have, max } =>
                write!(f, "invalid window size {} (expected 1..={})", have, max),
            Closed =>
                write!(f, "compression session is closed"),
            Io(e) =>
                write!(f, "I/O error: {}", e),
            TrailerMismatch { found } =>
                write!(f, "internal error, unexpected bytes at end of deflate stream: {:02x?}", found),
            Deflate(msg) =>
                write!(f, "deflate failed: {}", msg),
            Inflate(msg) =>
                write!(f, "inflate failed: {}", msg),
            MessageTooLarge { limit } =>
                write!(f, "decompressed message exceeds {} bytes", limit),
        }
    }
}

impl std::error::Error for CompressionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompressionError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for CompressionError {
    /// Unwraps a `CompressionError` that travelled through an `io::Error`
    /// (see the `Read`/`Write` adapters); anything else becomes `Io`.
    fn from(e: io::Error) -> Self {
        let wraps_ours = e
            .get_ref()
            .is_some_and(|inner| inner.is::<CompressionError>());
        if !wraps_ours {
            return CompressionError::Io(e);
        }
        match e.into_inner().map(|inner| inner.downcast::<CompressionError>()) {
            Some(Ok(inner)) => *inner,
            Some(Err(other)) => CompressionError::Io(io::Error::other(other)),
            None => CompressionError::Io(io::Error::other("empty wrapped error")),
        }
    }
}

impl From<CompressionError> for io::Error {
    fn from(e: CompressionError) -> Self {
        match e {
            CompressionError::Io(inner) => inner,
            other => io::Error::new(other.io_kind(), other),
        }
    }
}

impl From<flate2::CompressError> for CompressionError {
    fn from(e: flate2::CompressError) -> Self {
        CompressionError::Deflate(e.to_string())
    }
}

impl From<flate2::DecompressError> for CompressionError {
    fn from(e: flate2::DecompressError) -> Self {
        CompressionError::Inflate(e.to_string())
    }
}

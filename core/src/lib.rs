//! pmdeflate-core
//!
//! Per-message DEFLATE compression for frame-based protocols
//! (permessage-deflate style). Sits between a frame layer and the DEFLATE
//! codec: strips and restores the sync-flush trailer, pools codec instances,
//! and keeps the sliding history used for context takeover.

#![forbid(unsafe_code)]

pub mod config;
pub mod constants;
pub mod context;

pub mod compression;
pub mod telemetry;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::compression::{
        CodecPool, CompressionError, CompressionLevel, MessageReader, MessageWriter, SlidingWindow,
    };
    pub use crate::config::{DeflateParams, PoolConfig};
    pub use crate::context::DeflateContext;
}

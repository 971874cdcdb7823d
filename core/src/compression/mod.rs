//! compression/mod.rs
//! Per-message DEFLATE: trailer handling, codec pooling, sliding history and
//! the read/write sessions built from them.
//!
//! Notes:
//! - Wire payloads are raw DEFLATE with the final `00 00 ff ff` removed.
//! - Codec instances are borrowed from an explicit [`CodecPool`]; there is no
//!   process-wide pool.
//! - A [`SlidingWindow`] is borrowed mutably by at most one session at a time.

pub mod constants;
pub mod pool;
pub mod session;
pub mod trailer;
pub mod types;
pub mod window;

pub use constants::*;
pub use pool::{CodecPool, Lease, Pooled};
pub use session::*;
pub use trailer::TrailerStripWriter;
pub use types::*;
pub use window::{HistorySink, NoHistory, SlidingWindow};

//! telemetry/counters.rs
//! Mutable counters collected while sessions run.
use std::ops::AddAssign;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::telemetry::snapshot::PoolStats;

/// Lifecycle counters of a codec pool.
#[derive(Debug, Default)]
pub struct PoolCounters {
    created: AtomicU64,
    reused: AtomicU64,
    released: AtomicU64,
    discarded: AtomicU64,
}

impl PoolCounters {
    /// A new instance had to be constructed on acquire.
    pub fn add_created(&self) {
        self.created.fetch_add(1, Ordering::Relaxed);
    }

    /// An idle instance was handed out again.
    pub fn add_reused(&self) {
        self.reused.fetch_add(1, Ordering::Relaxed);
    }

    /// An instance went back into its bucket.
    pub fn add_released(&self) {
        self.released.fetch_add(1, Ordering::Relaxed);
    }

    /// An instance was dropped: its bucket was full or it was never poolable.
    pub fn add_discarded(&self) {
        self.discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PoolStats {
        PoolStats {
            created: self.created.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }
}

/// Per-connection message and byte counts.
///
/// "Outbound" is plaintext handed to a writer and the wire bytes it produced;
/// "inbound" is wire bytes fed to a reader and the plaintext recovered.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct CompressionCounters {
    pub messages_compressed: u64,
    pub messages_decompressed: u64,
    pub bytes_plaintext_out: u64,
    pub bytes_wire_out: u64,
    pub bytes_wire_in: u64,
    pub bytes_plaintext_in: u64,
}

impl CompressionCounters {
    /// Record one compressed message.
    pub fn add_compressed(&mut self, plaintext_len: usize, wire_len: usize) {
        self.messages_compressed += 1;
        self.bytes_plaintext_out += plaintext_len as u64;
        self.bytes_wire_out += wire_len as u64;
    }

    /// Record one decompressed message.
    pub fn add_decompressed(&mut self, wire_len: usize, plaintext_len: usize) {
        self.messages_decompressed += 1;
        self.bytes_wire_in += wire_len as u64;
        self.bytes_plaintext_in += plaintext_len as u64;
    }

    pub fn merge(&mut self, other: &CompressionCounters) {
        self.messages_compressed += other.messages_compressed;
        self.messages_decompressed += other.messages_decompressed;
        self.bytes_plaintext_out += other.bytes_plaintext_out;
        self.bytes_wire_out += other.bytes_wire_out;
        self.bytes_wire_in += other.bytes_wire_in;
        self.bytes_plaintext_in += other.bytes_plaintext_in;
    }
}

impl AddAssign for CompressionCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}

//! telemetry/snapshot.rs
//! Immutable, serializable views of the counters.
use serde::{Deserialize, Serialize};

use crate::telemetry::counters::CompressionCounters;

/// Point-in-time copy of a pool's counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    pub created: u64,
    pub reused: u64,
    pub released: u64,
    pub discarded: u64,
}

impl PoolStats {
    /// Share of acquires served from an idle instance.
    pub fn reuse_ratio(&self) -> f64 {
        let acquires = self.created + self.reused;
        if acquires == 0 {
            0.0
        } else {
            self.reused as f64 / acquires as f64
        }
    }
}

/// Connection counters plus derived ratios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionSnapshot {
    pub messages_compressed: u64,
    pub messages_decompressed: u64,
    pub bytes_plaintext_out: u64,
    pub bytes_wire_out: u64,
    pub bytes_wire_in: u64,
    pub bytes_plaintext_in: u64,
    /// wire / plaintext for outbound traffic, 0.0 when nothing was sent.
    pub outbound_ratio: f64,
    /// wire / plaintext for inbound traffic, 0.0 when nothing was received.
    pub inbound_ratio: f64,
}

fn ratio(wire: u64, plaintext: u64) -> f64 {
    if plaintext == 0 {
        0.0
    } else {
        wire as f64 / plaintext as f64
    }
}

impl From<&CompressionCounters> for CompressionSnapshot {
    fn from(c: &CompressionCounters) -> Self {
        Self {
            messages_compressed: c.messages_compressed,
            messages_decompressed: c.messages_decompressed,
            bytes_plaintext_out: c.bytes_plaintext_out,
            bytes_wire_out: c.bytes_wire_out,
            bytes_wire_in: c.bytes_wire_in,
            bytes_plaintext_in: c.bytes_plaintext_in,
            outbound_ratio: ratio(c.bytes_wire_out, c.bytes_plaintext_out),
            inbound_ratio: ratio(c.bytes_wire_in, c.bytes_plaintext_in),
        }
    }
}

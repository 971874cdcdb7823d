//! compression/pool.rs
//! Reusable compressor/decompressor instances.
//!
//! - One bucket per compression level for compressors, one shared bucket for
//!   decompressors (inflate does not depend on the level).
//! - Buckets are bounded lock-free queues, so any number of threads can
//!   acquire and release at once.
//! - Instances are reset when handed out, never when put back, so whatever a
//!   previous session left behind is cleared right before reuse.
use std::fmt;
use std::sync::Arc;

use crossbeam::queue::ArrayQueue;
use flate2::{Compress, Decompress};
use log::{debug, trace};

use crate::compression::types::{CompressionError, CompressionLevel};
use crate::config::PoolConfig;
use crate::constants::LEVEL_COUNT;
use crate::telemetry::{PoolCounters, PoolStats};

struct Buckets {
    compressors: Vec<ArrayQueue<Compress>>,
    decompressors: ArrayQueue<Decompress>,
}

struct PoolShared {
    config: PoolConfig,
    /// `None` when pooling is disabled.
    buckets: Option<Buckets>,
    counters: PoolCounters,
}

/// Handle to a shared codec pool. Clones refer to the same buckets.
#[derive(Clone)]
pub struct CodecPool {
    shared: Arc<PoolShared>,
}

impl CodecPool {
    pub fn new() -> Self {
        Self::with_config(PoolConfig::default())
    }

    pub fn with_config(config: PoolConfig) -> Self {
        let buckets = (config.max_idle_per_bucket > 0).then(|| Buckets {
            compressors: (0..LEVEL_COUNT)
                .map(|_| ArrayQueue::new(config.max_idle_per_bucket))
                .collect(),
            decompressors: ArrayQueue::new(config.max_idle_per_bucket),
        });
        Self {
            shared: Arc::new(PoolShared {
                config,
                buckets,
                counters: PoolCounters::default(),
            }),
        }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.shared.config
    }

    /// Borrow a raw-DEFLATE compressor for `level`, fresh or reset.
    pub fn acquire_compressor(&self, level: CompressionLevel) -> Lease<Compress> {
        Lease::pooled(self.take_compressor(level), self.clone(), level.bucket())
    }

    /// Compressor preloaded with `dictionary`.
    ///
    /// Unless `recycle_dictionary_compressors` is set it is built for this one
    /// message and dropped on release.
    pub fn acquire_seeded_compressor(
        &self,
        level: CompressionLevel,
        dictionary: Option<&[u8]>,
    ) -> Result<Lease<Compress>, CompressionError> {
        let recycle = self.shared.config.recycle_dictionary_compressors;
        let mut compressor = if recycle {
            self.take_compressor(level)
        } else {
            self.new_compressor(level)
        };
        if let Some(dictionary) = dictionary {
            if let Err(e) = compressor.set_dictionary(dictionary) {
                self.shared.counters.add_discarded();
                return Err(e.into());
            }
        }
        Ok(if recycle {
            Lease::pooled(compressor, self.clone(), level.bucket())
        } else {
            Lease::unpooled(compressor, self.clone())
        })
    }

    /// Borrow a raw-DEFLATE decompressor, fresh or reset.
    pub fn acquire_decompressor(&self) -> Lease<Decompress> {
        Lease::pooled(self.take_decompressor(), self.clone(), 0)
    }

    /// Decompressor preloaded with `dictionary`. Always pooled: the reset on
    /// the next acquire drops the dictionary along with the rest of the state.
    pub fn acquire_seeded_decompressor(
        &self,
        dictionary: Option<&[u8]>,
    ) -> Result<Lease<Decompress>, CompressionError> {
        let mut decompressor = self.take_decompressor();
        if let Some(dictionary) = dictionary {
            if let Err(e) = decompressor.set_dictionary(dictionary) {
                self.shared.counters.add_discarded();
                return Err(e.into());
            }
        }
        Ok(Lease::pooled(decompressor, self.clone(), 0))
    }

    pub fn idle_compressors(&self, level: CompressionLevel) -> usize {
        self.shared
            .buckets
            .as_ref()
            .map_or(0, |b| b.compressors[level.bucket()].len())
    }

    pub fn idle_decompressors(&self) -> usize {
        self.shared.buckets.as_ref().map_or(0, |b| b.decompressors.len())
    }

    pub fn stats(&self) -> PoolStats {
        self.shared.counters.snapshot()
    }

    fn take_compressor(&self, level: CompressionLevel) -> Compress {
        let idle = self
            .shared
            .buckets
            .as_ref()
            .and_then(|b| b.compressors[level.bucket()].pop());
        match idle {
            Some(mut compressor) => {
                compressor.reset();
                self.shared.counters.add_reused();
                compressor
            }
            None => self.new_compressor(level),
        }
    }

    fn take_decompressor(&self) -> Decompress {
        let idle = self.shared.buckets.as_ref().and_then(|b| b.decompressors.pop());
        match idle {
            Some(mut decompressor) => {
                decompressor.reset(false);
                self.shared.counters.add_reused();
                decompressor
            }
            None => {
                debug!("codec pool: constructing decompressor");
                self.shared.counters.add_created();
                Decompress::new(false)
            }
        }
    }

    fn new_compressor(&self, level: CompressionLevel) -> Compress {
        debug!("codec pool: constructing compressor (level {})", level);
        self.shared.counters.add_created();
        Compress::new(level.to_flate2(), false)
    }

    fn put_compressor(&self, bucket: usize, compressor: Compress) {
        let rejected = match &self.shared.buckets {
            Some(b) => b.compressors[bucket].push(compressor).is_err(),
            None => true,
        };
        self.count_return(rejected, "compressor");
    }

    fn put_decompressor(&self, decompressor: Decompress) {
        let rejected = match &self.shared.buckets {
            Some(b) => b.decompressors.push(decompressor).is_err(),
            None => true,
        };
        self.count_return(rejected, "decompressor");
    }

    fn count_return(&self, rejected: bool, kind: &str) {
        if rejected {
            trace!("codec pool: bucket full, dropping {}", kind);
            self.shared.counters.add_discarded();
        } else {
            self.shared.counters.add_released();
        }
    }
}

impl Default for CodecPool {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CodecPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecPool")
            .field("config", &self.shared.config)
            .field("idle_decompressors", &self.idle_decompressors())
            .field("stats", &self.stats())
            .finish()
    }
}

/// Codec types a [`Lease`] knows how to hand back.
pub trait Pooled: Send + Sized {
    #[doc(hidden)]
    fn give_back(self, pool: &CodecPool, bucket: usize);
}

impl Pooled for Compress {
    fn give_back(self, pool: &CodecPool, bucket: usize) {
        pool.put_compressor(bucket, self);
    }
}

impl Pooled for Decompress {
    fn give_back(self, pool: &CodecPool, _bucket: usize) {
        pool.put_decompressor(self);
    }
}

/// Exclusive loan of a codec instance.
///
/// Dropping the lease releases the instance: back into its bucket when it is
/// poolable, otherwise it is freed. Error paths therefore never leak a
/// poolable instance.
///
/// The instance is reached through [`get`](Lease::get) and
/// [`get_mut`](Lease::get_mut); both return `None` only once it has been
/// released or taken with [`into_inner`](Lease::into_inner).
pub struct Lease<T: Pooled> {
    /// `None` once released or taken.
    item: Option<T>,
    pool: Option<CodecPool>,
    bucket: usize,
    recycle: bool,
}

impl<T: Pooled> Lease<T> {
    fn pooled(item: T, pool: CodecPool, bucket: usize) -> Self {
        Self { item: Some(item), pool: Some(pool), bucket, recycle: true }
    }

    fn unpooled(item: T, pool: CodecPool) -> Self {
        Self { item: Some(item), pool: Some(pool), bucket: 0, recycle: false }
    }

    /// Whether releasing this lease puts the instance back into a bucket.
    pub fn is_recycled(&self) -> bool {
        self.recycle && self.pool.is_some()
    }

    pub fn get(&self) -> Option<&T> {
        self.item.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.item.as_mut()
    }

    /// Keep the instance; the pool never sees it again.
    pub fn into_inner(mut self) -> Option<T> {
        self.recycle = false;
        self.pool = None;
        self.item.take()
    }
}

impl<T: Pooled> Drop for Lease<T> {
    fn drop(&mut self) {
        let Some(item) = self.item.take() else { return };
        match self.pool.take() {
            Some(pool) if self.recycle => item.give_back(&pool, self.bucket),
            Some(pool) => {
                trace!("codec pool: dropping unpooled instance");
                pool.shared.counters.add_discarded();
            }
            None => {}
        }
    }
}

impl<T: Pooled> fmt::Debug for Lease<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lease")
            .field("bucket", &self.bucket)
            .field("recycled", &self.is_recycled())
            .finish()
    }
}

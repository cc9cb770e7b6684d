//! Kernel row cache
//!
//! The SMO solver asks for whole kernel rows `K(i, ·)`; an LRU cache keeps the
//! most recently used ones so the working-set pair rarely needs recomputing.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// A computed kernel row, shared with the caller without copying
pub type KernelRow = Arc<Vec<f64>>;

/// LRU cache of kernel rows keyed by sample index
pub struct KernelCache {
    rows: LruCache<usize, KernelRow>,
    hits: u64,
    misses: u64,
}

impl KernelCache {
    /// Cache holding at most `capacity` rows
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            rows: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Cache sized to fit rows of `row_len` values in `memory_bytes`
    ///
    /// At least two rows are kept, the pair the solver is updating.
    pub fn with_memory_limit(memory_bytes: usize, row_len: usize) -> Self {
        let row_bytes = row_len.max(1) * std::mem::size_of::<f64>();
        Self::new((memory_bytes / row_bytes).max(2))
    }

    pub fn get(&mut self, i: usize) -> Option<KernelRow> {
        match self.rows.get(&i) {
            Some(row) => {
                self.hits += 1;
                Some(Arc::clone(row))
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn put(&mut self, i: usize, row: Vec<f64>) -> KernelRow {
        let row = Arc::new(row);
        self.rows.put(i, Arc::clone(&row));
        row
    }

    /// Cached row `i`, computing and inserting it on a miss
    pub fn get_or_compute<F>(&mut self, i: usize, compute: F) -> KernelRow
    where
        F: FnOnce() -> Vec<f64>,
    {
        match self.get(i) {
            Some(row) => row,
            None => self.put(i, compute()),
        }
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            capacity: self.rows.cap().get(),
            size: self.rows.len(),
        }
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Maximum number of rows
    pub capacity: usize,
    pub size: usize,
}
